//! Pivot summaries over a directory of stores.
//!
//! Every `.duckdb` file under the store directory contributes one group:
//! its fixed-name table is scanned in file order, accumulating row count
//! plus two numeric sums, skipping grand-total marker rows and rows with an
//! empty key field. The result lands in a summary workbook and is echoed to
//! the console.

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use rust_xlsxwriter::Workbook;

use crate::{
    cell::Cell,
    cli::PivotArgs,
    config::Config,
    errors::IngestError,
    store::Store,
    table,
};

pub const SUMMARY_HEADERS: [&str; 4] = ["account", "total_count", "total_weight", "total_amount"];

/// Which columns to aggregate and which sentinel marks subtotal rows.
#[derive(Debug, Clone)]
pub struct PivotSpec {
    pub table: String,
    pub key_column: String,
    pub weight_column: String,
    pub amount_column: String,
    pub total_marker: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRow {
    pub group: String,
    pub count: u64,
    pub weight: f64,
    pub amount: f64,
}

pub fn execute(args: &PivotArgs) -> Result<()> {
    let spec = PivotSpec {
        table: args.table_name.clone(),
        key_column: args.key_column.clone(),
        weight_column: args.weight_column.clone(),
        amount_column: args.amount_column.clone(),
        total_marker: args.total_marker.clone(),
    };

    let config = Config {
        store_dir: args.store_dir.clone(),
        results_dir: args.results_dir.clone(),
        ..Config::default()
    };
    let store_files = collect_store_files(&config.store_dir)?;
    if store_files.is_empty() {
        return Err(anyhow!(
            "No store files found under {:?}; run convert/batch/group first",
            config.store_dir
        ));
    }

    let mut summary = Vec::new();
    for path in &store_files {
        let group = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match aggregate_store(path, &group, &spec) {
            Ok(row) => {
                info!(
                    "group '{}': count={} weight={:.2} amount={:.2}",
                    row.group, row.count, row.weight, row.amount
                );
                summary.push(row);
            }
            Err(err) => {
                warn!("skipping store {:?}: {err}", path);
            }
        }
    }

    if summary.is_empty() {
        return Err(anyhow!("No store could be aggregated"));
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.results_dir.join("pivot_summary.xlsx"));
    write_summary_workbook(&summary, &output)?;
    info!("wrote {} group row(s) to {:?}", summary.len(), output);

    let headers: Vec<String> = SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect();
    let rendered: Vec<Vec<String>> = summary
        .iter()
        .map(|row| {
            vec![
                row.group.clone(),
                row.count.to_string(),
                format!("{:.2}", row.weight),
                format!("{:.2}", row.amount),
            ]
        })
        .collect();
    table::print_table(&headers, &rendered);
    Ok(())
}

/// Aggregate one store's fixed-name table into a single summary row.
fn aggregate_store(
    path: &PathBuf,
    group: &str,
    spec: &PivotSpec,
) -> std::result::Result<AggregationRow, IngestError> {
    let started = Instant::now();
    let store = Store::open(path)?;
    let tables = store.table_names()?;
    info!("store {:?} holds table(s): {:?}", path, tables);

    let columns = store.column_names(&spec.table)?;
    if columns.is_empty() {
        return Err(IngestError::MissingColumn {
            table: spec.table.clone(),
            column: spec.key_column.clone(),
        });
    }
    let rows = store.fetch_rows(&spec.table, None)?;
    info!(
        "loaded {} row(s) from {:?} in {:.2}s",
        rows.len(),
        path,
        started.elapsed().as_secs_f64()
    );
    let (count, weight, amount) = aggregate_rows(&columns, &rows, spec)?;
    Ok(AggregationRow {
        group: group.to_string(),
        count,
        weight,
        amount,
    })
}

/// Scan rows in order, accumulating count and the two numeric sums.
///
/// A row containing the grand-total marker anywhere in its tuple is
/// skipped, as is a row whose key field is empty. A non-numeric weight or
/// amount in an included row aborts the whole aggregation.
pub fn aggregate_rows(
    columns: &[String],
    rows: &[Vec<Cell>],
    spec: &PivotSpec,
) -> std::result::Result<(u64, f64, f64), IngestError> {
    let position = |name: &str| {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| IngestError::MissingColumn {
                table: spec.table.clone(),
                column: name.to_string(),
            })
    };
    let key_idx = position(&spec.key_column)?;
    let weight_idx = position(&spec.weight_column)?;
    let amount_idx = position(&spec.amount_column)?;

    let mut count = 0u64;
    let mut weight = 0f64;
    let mut amount = 0f64;

    for (row_idx, row) in rows.iter().enumerate() {
        if row
            .iter()
            .any(|cell| matches!(cell, Cell::Text(s) if s == &spec.total_marker))
        {
            continue;
        }
        let key_is_empty = match row.get(key_idx) {
            None | Some(Cell::Null) => true,
            Some(Cell::Text(s)) => s.is_empty(),
            Some(_) => false,
        };
        if key_is_empty {
            continue;
        }

        count += 1;
        weight += numeric_field(row, weight_idx, row_idx, &spec.weight_column, spec)?;
        amount += numeric_field(row, amount_idx, row_idx, &spec.amount_column, spec)?;
    }
    Ok((count, weight, amount))
}

fn numeric_field(
    row: &[Cell],
    idx: usize,
    row_idx: usize,
    column: &str,
    spec: &PivotSpec,
) -> std::result::Result<f64, IngestError> {
    let cell = row.get(idx).unwrap_or(&Cell::Null);
    cell.as_f64().ok_or_else(|| IngestError::DataFormat {
        context: format!(
            "table '{}' row {} column '{}'",
            spec.table,
            row_idx + 1,
            column
        ),
        value: cell.as_display(),
    })
}

fn collect_store_files(dir: &PathBuf) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Reading store directory {dir:?}"))?;
    let mut files: Vec<PathBuf> = entries
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Listing store directory {dir:?}"))?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("duckdb"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn write_summary_workbook(summary: &[AggregationRow], output: &PathBuf) -> Result<()> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("Creating results dir {parent:?}"))?;
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("summary")?;

    for (col, title) in SUMMARY_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }
    for (idx, row) in summary.iter().enumerate() {
        let r = (idx + 1) as u32;
        worksheet.write_string(r, 0, &row.group)?;
        worksheet.write_number(r, 1, row.count as f64)?;
        worksheet.write_number(r, 2, row.weight)?;
        worksheet.write_number(r, 3, row.amount)?;
    }
    workbook
        .save(output)
        .with_context(|| format!("Saving summary workbook {output:?}"))?;
    Ok(())
}
