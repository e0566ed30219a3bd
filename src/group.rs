use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{error, info, warn};

use crate::{
    cli::GroupArgs,
    config::Config,
    events::ConsoleSink,
    ingest,
    manifest::GroupManifest,
};

/// Manifest-driven conversion: merge each group's workbooks into one store
/// under a fixed table name. A failing group is logged and the batch moves
/// on; the command only fails when nothing was produced at all.
pub fn execute(args: &GroupArgs) -> Result<()> {
    let manifest = GroupManifest::load(&args.manifest)
        .with_context(|| format!("Loading manifest {:?}", args.manifest))?;
    if manifest.is_empty() {
        return Err(anyhow!("Manifest {:?} contains no groups", args.manifest));
    }
    info!(
        "manifest lists {} group(s): {:?}",
        manifest.len(),
        manifest.groups.keys().collect::<Vec<_>>()
    );

    let config = Config {
        input_dir: args.input_dir.clone(),
        store_dir: args.store_dir.clone(),
        policy: args.policy.into(),
        sheet: args.sheet.clone(),
        sample_rows: args.sample_rows,
        ..Config::default()
    };

    let mut produced = Vec::new();
    for (key, names) in &manifest.groups {
        let files: Vec<PathBuf> = names.iter().map(|name| config.input_dir.join(name)).collect();
        match ingest::ingest_group(&config, key, &files, &args.table_name, &ConsoleSink) {
            Ok(Some(report)) => {
                if report.skipped_files > 0 {
                    warn!(
                        "group '{key}': {} of {} file(s) skipped",
                        report.skipped_files,
                        report.skipped_files + report.merged_files
                    );
                }
                produced.push(report);
            }
            Ok(None) => warn!("group '{key}': no data read, skipping"),
            Err(err) => error!("group '{key}' failed: {err}"),
        }
    }

    if produced.is_empty() {
        return Err(anyhow!("No group produced a store"));
    }
    info!("{} of {} group(s) converted", produced.len(), manifest.len());
    for report in &produced {
        let bytes = fs::metadata(&report.store_path).map(|m| m.len()).unwrap_or(0);
        info!(
            "  {} ({:.2} MB)",
            report.store_path.display(),
            bytes as f64 / (1024.0 * 1024.0)
        );
    }
    Ok(())
}
