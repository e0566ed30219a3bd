pub mod batch;
pub mod cell;
pub mod cli;
pub mod config;
pub mod convert;
pub mod errors;
pub mod events;
pub mod group;
pub mod ingest;
pub mod manifest;
pub mod pivot;
pub mod read;
pub mod schema;
pub mod stage;
pub mod store;
pub mod table;
pub mod workbook;
pub mod worker;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("ducksheet", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => convert::execute(&args),
        Commands::Batch(args) => batch::execute(&args),
        Commands::Group(args) => group::execute(&args),
        Commands::Read(args) => read::execute(&args),
        Commands::Pivot(args) => pivot::execute(&args),
    }
}
