//! Pipeline configuration, threaded explicitly through every command;
//! no implicit working directories.

use std::path::PathBuf;

use crate::{stage::StagingPolicy, workbook::SheetSelector};

pub const DEFAULT_STORE_DIR: &str = "duckdb_output";
pub const DEFAULT_RESULTS_DIR: &str = "pivot_results";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory manifest file names are resolved against.
    pub input_dir: PathBuf,
    /// Directory holding the `.duckdb` store files.
    pub store_dir: PathBuf,
    /// Directory the pivot summary workbook is written to.
    pub results_dir: PathBuf,
    /// Staging policy selected up front for every ingestion.
    pub policy: StagingPolicy,
    /// Which sheet to flatten out of each workbook.
    pub sheet: SheetSelector,
    /// Rows sampled during type inference (0 = full scan).
    pub sample_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            policy: StagingPolicy::Inferred,
            sheet: SheetSelector::default(),
            sample_rows: 2000,
        }
    }
}
