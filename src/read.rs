use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{cell::Cell, cli::ReadArgs, store::Store, table};

/// Diagnostic read-back: list a store's tables and preview their rows.
pub fn execute(args: &ReadArgs) -> Result<()> {
    if !args.store.exists() {
        return Err(anyhow!("Store file {:?} does not exist", args.store));
    }
    let store = Store::open(&args.store).with_context(|| format!("Opening {:?}", args.store))?;
    let tables = store.table_names().context("Listing tables")?;
    if tables.is_empty() {
        return Err(anyhow!("Store {:?} contains no tables", args.store));
    }
    info!("store {:?} holds table(s): {}", args.store, tables.join(", "));

    let selected: Vec<String> = match &args.table {
        Some(name) => {
            if !tables.contains(name) {
                return Err(anyhow!("Table '{name}' not found in {:?}", args.store));
            }
            vec![name.clone()]
        }
        None => tables,
    };

    for name in &selected {
        let started = Instant::now();
        let columns = store.column_names(name)?;
        let rows = store.fetch_rows(name, Some(args.limit))?;
        let total = store.count_rows(name)?;
        info!(
            "table '{name}': showing {} of {total} row(s) ({:.2}s)",
            rows.len(),
            started.elapsed().as_secs_f64()
        );
        let rendered: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(Cell::as_display).collect())
            .collect();
        table::print_table(&columns, &rendered);
    }
    Ok(())
}
