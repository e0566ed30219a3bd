fn main() {
    if let Err(err) = ducksheet::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
