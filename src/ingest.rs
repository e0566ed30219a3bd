//! Write-path orchestration: read a workbook, normalize its header, stage
//! its rows under the configured policy, and load the result into a store.
//!
//! Two entry points mirror the toolkit's units of work: [`ingest_file`]
//! (one workbook → one store, table named from the file) and
//! [`ingest_group`] (several workbooks merged under one baseline header →
//! one store with a fixed table name).

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use log::Level;

use crate::{
    cell::Cell,
    config::Config,
    errors::{IngestError, Result},
    events::EventSink,
    schema,
    stage::{self, StagedTable, StagingPolicy},
    store::Store,
    workbook,
};

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub store_path: PathBuf,
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct GroupReport {
    pub store_path: PathBuf,
    pub table: String,
    pub rows: usize,
    pub merged_files: usize,
    pub skipped_files: usize,
    pub elapsed: Duration,
}

/// Ingest one workbook into its own store. The table name is the sanitized
/// file stem; the store file shares the stem.
pub fn ingest_file(config: &Config, path: &Path, sink: &dyn EventSink) -> Result<IngestReport> {
    let started = Instant::now();
    let source = display_name(path);
    sink.log(Level::Info, &format!("reading {source}"));

    let raw = workbook::read_workbook(path, &config.sheet)?;
    let headers = schema::normalize_headers(&raw.header);
    let stem = file_stem(path);
    let table = schema::table_identifier(&stem);

    let staged = stage_with_fallback(config, &headers, &raw.rows, &source, sink)?;
    let store_path = config.store_dir.join(format!("{stem}.duckdb"));
    let store = Store::open(&store_path)?;
    let rows = store.create_or_replace(&table, &staged)?;

    let elapsed = started.elapsed();
    sink.log(
        Level::Info,
        &format!(
            "stored {rows} row(s) into table '{table}' of {} in {:.2}s",
            store_path.display(),
            elapsed.as_secs_f64()
        ),
    );
    Ok(IngestReport {
        store_path,
        table,
        rows,
        columns: staged.schema.width(),
        elapsed,
    })
}

/// Merge the group's workbooks under one baseline header and load them into
/// a single store/table. Sources whose headers disagree with the baseline
/// are skipped and reported; the group itself is not aborted. Returns
/// `None` when no source contributed any rows.
pub fn ingest_group(
    config: &Config,
    key: &str,
    files: &[PathBuf],
    table: &str,
    sink: &dyn EventSink,
) -> Result<Option<GroupReport>> {
    let started = Instant::now();
    let mut baseline: Option<Vec<String>> = None;
    let mut merged: Vec<Vec<Cell>> = Vec::new();
    let mut merged_files = 0usize;
    let mut skipped_files = 0usize;

    for path in files {
        let source = display_name(path);
        if !workbook::is_workbook_file(path) {
            sink.log(Level::Warn, &format!("{source}: not a workbook file, skipping"));
            skipped_files += 1;
            continue;
        }
        let raw = match workbook::read_workbook(path, &config.sheet) {
            Ok(raw) => raw,
            Err(err @ (IngestError::SourceNotFound { .. } | IngestError::EmptyWorkbook { .. })) => {
                sink.log(Level::Warn, &format!("{err}, skipping"));
                skipped_files += 1;
                continue;
            }
            Err(err) => return Err(err),
        };
        let headers = schema::normalize_headers(&raw.header);
        match &baseline {
            None => baseline = Some(headers),
            Some(expected) if *expected != headers => {
                let conflict = IngestError::SchemaConflict {
                    src: source.clone(),
                    detail: format!(
                        "header {:?} does not match the group baseline {:?}",
                        headers, expected
                    ),
                };
                sink.log(Level::Warn, &format!("{conflict}; rows skipped"));
                skipped_files += 1;
                continue;
            }
            Some(_) => {}
        }
        sink.log(
            Level::Info,
            &format!("{source}: {} row(s) read", raw.row_count()),
        );
        merged.extend(raw.rows);
        merged_files += 1;
    }

    let Some(headers) = baseline else {
        return Ok(None);
    };
    if merged.is_empty() {
        return Ok(None);
    }

    let staged = stage_with_fallback(config, &headers, &merged, key, sink)?;
    let store_path = config.store_dir.join(format!("{key}.duckdb"));
    let store = Store::open(&store_path)?;
    let rows = store.create_or_replace(table, &staged)?;
    // Read the count back so the log reflects what the store now holds.
    let stored = store.count_rows(table)?;

    let elapsed = started.elapsed();
    sink.log(
        Level::Info,
        &format!(
            "group '{key}': table '{table}' holds {stored} row(s) in {} ({:.2}s)",
            store_path.display(),
            elapsed.as_secs_f64()
        ),
    );
    Ok(Some(GroupReport {
        store_path,
        table: table.to_string(),
        rows,
        merged_files,
        skipped_files,
        elapsed,
    }))
}

/// Stage under the configured policy; an inferred-staging failure falls
/// back to all-text so ingestion never fails for type-shape reasons.
fn stage_with_fallback(
    config: &Config,
    headers: &[String],
    rows: &[Vec<Cell>],
    source: &str,
    sink: &dyn EventSink,
) -> Result<StagedTable> {
    match config.policy {
        StagingPolicy::AllText => stage::stage_all_text(headers, rows, source),
        StagingPolicy::Inferred => {
            match stage::stage_inferred(headers, rows, config.sample_rows, source) {
                Ok(staged) => Ok(staged),
                Err(err @ IngestError::SchemaConflict { .. }) => {
                    sink.log(
                        Level::Warn,
                        &format!("{err}; falling back to all-text staging"),
                    );
                    stage::stage_all_text(headers, rows, source)
                }
                Err(err) => Err(err),
            }
        }
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string())
}
