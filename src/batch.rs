use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};

use crate::{
    cli::BatchArgs,
    config::Config,
    events::WorkerEvent,
    workbook, worker,
};

/// Convert every workbook under the given files/directories, one store per
/// workbook, on a dedicated worker thread. This command is the headless
/// driver of the worker contract the interactive shell uses: it only
/// relays events and owns no ingestion state.
pub fn execute(args: &BatchArgs) -> Result<()> {
    let files =
        workbook::collect_workbook_files(&args.inputs).context("Collecting workbook files")?;
    if files.is_empty() {
        return Err(anyhow!("No workbook files found in the given inputs"));
    }
    info!("{} workbook file(s) queued", files.len());

    let config = Config {
        store_dir: args.store_dir.clone(),
        policy: args.policy.into(),
        sheet: args.sheet.clone(),
        sample_rows: args.sample_rows,
        ..Config::default()
    };

    let handle = worker::spawn(files, config);
    for event in handle.events.iter() {
        match event {
            WorkerEvent::Progress(percent) => debug!("progress {percent}%"),
            WorkerEvent::Log(level, message) => log::log!(level, "{message}"),
            WorkerEvent::Done { processed, failed } => {
                info!("batch finished: {processed} converted, {failed} failed");
            }
            WorkerEvent::Failed(reason) => warn!("worker stopped early: {reason}"),
        }
    }
    handle.join();
    Ok(())
}
