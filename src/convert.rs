use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ConvertArgs,
    config::Config,
    events::ConsoleSink,
    ingest,
};

/// Single-workbook conversion: stop and report on the first error.
pub fn execute(args: &ConvertArgs) -> Result<()> {
    let config = Config {
        store_dir: args.store_dir.clone(),
        policy: args.policy.into(),
        sheet: args.sheet.clone(),
        sample_rows: args.sample_rows,
        ..Config::default()
    };

    let report = ingest::ingest_file(&config, &args.input, &ConsoleSink)
        .with_context(|| format!("Converting {:?}", args.input))?;
    info!(
        "table '{}' now holds {} row(s) x {} column(s)",
        report.table, report.rows, report.columns
    );
    Ok(())
}
