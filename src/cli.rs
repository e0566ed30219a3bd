use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    config::{DEFAULT_RESULTS_DIR, DEFAULT_STORE_DIR},
    stage::StagingPolicy,
    workbook::SheetSelector,
};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Load spreadsheet workbooks into DuckDB stores and pivot the results",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a single workbook into its own DuckDB store
    Convert(ConvertArgs),
    /// Convert many workbooks (or directories of them) on a worker thread
    Batch(BatchArgs),
    /// Merge workbooks into one store per group of a JSON manifest
    Group(GroupArgs),
    /// List the tables of a store and preview their rows
    Read(ReadArgs),
    /// Aggregate every store in a directory into a summary workbook
    Pivot(PivotArgs),
}

/// CLI surface of the staging policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Infer one type per column from a sample of the rows
    Inferred,
    /// Treat every column as text (safe mode, never fails on types)
    Text,
}

impl From<PolicyArg> for StagingPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Inferred => StagingPolicy::Inferred,
            PolicyArg::Text => StagingPolicy::AllText,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Workbook file to convert (.xlsx or .xls)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Directory the .duckdb store file is written to
    #[arg(long = "store-dir", default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,
    /// Sheet to read, as a zero-based index or a sheet name
    #[arg(long, default_value = "0")]
    pub sheet: SheetSelector,
    /// Staging policy for column types
    #[arg(long, value_enum, default_value = "inferred")]
    pub policy: PolicyArg,
    /// Rows sampled when inferring types (0 means full scan)
    #[arg(long = "sample-rows", default_value_t = 2000)]
    pub sample_rows: usize,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Workbook files and/or directories to scan recursively
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Directory the .duckdb store files are written to
    #[arg(long = "store-dir", default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,
    /// Sheet to read, as a zero-based index or a sheet name
    #[arg(long, default_value = "0")]
    pub sheet: SheetSelector,
    /// Staging policy for column types
    #[arg(long, value_enum, default_value = "inferred")]
    pub policy: PolicyArg,
    /// Rows sampled when inferring types (0 means full scan)
    #[arg(long = "sample-rows", default_value_t = 2000)]
    pub sample_rows: usize,
}

#[derive(Debug, Args)]
pub struct GroupArgs {
    /// JSON manifest mapping group key to a list of workbook file names
    #[arg(short = 'm', long = "manifest")]
    pub manifest: PathBuf,
    /// Directory the manifest's file names are resolved against
    #[arg(long = "input-dir", default_value = ".")]
    pub input_dir: PathBuf,
    /// Directory the .duckdb store files are written to
    #[arg(long = "store-dir", default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,
    /// Table name used inside every group store
    #[arg(long = "table-name", default_value = "billing")]
    pub table_name: String,
    /// Sheet to read, as a zero-based index or a sheet name
    #[arg(long, default_value = "0")]
    pub sheet: SheetSelector,
    /// Staging policy for column types
    #[arg(long, value_enum, default_value = "inferred")]
    pub policy: PolicyArg,
    /// Rows sampled when inferring types (0 means full scan)
    #[arg(long = "sample-rows", default_value_t = 2000)]
    pub sample_rows: usize,
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Store file (.duckdb) to inspect
    #[arg(short = 's', long = "store")]
    pub store: PathBuf,
    /// Preview only this table (default: every table in the store)
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// Maximum rows to preview per table
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct PivotArgs {
    /// Directory holding the .duckdb store files to aggregate
    #[arg(long = "store-dir", default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,
    /// Directory the summary workbook is written to
    #[arg(long = "results-dir", default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,
    /// Table name expected inside every store
    #[arg(long = "table-name", default_value = "billing")]
    pub table_name: String,
    /// Column whose non-empty value marks a countable row
    #[arg(short = 'k', long = "key-column")]
    pub key_column: String,
    /// Numeric column summed into total_weight
    #[arg(short = 'w', long = "weight-column")]
    pub weight_column: String,
    /// Numeric column summed into total_amount
    #[arg(short = 'a', long = "amount-column")]
    pub amount_column: String,
    /// Sentinel text marking subtotal rows to skip
    #[arg(long = "total-marker", default_value = "TOTAL")]
    pub total_marker: String,
    /// Summary workbook path (default: <results-dir>/pivot_summary.xlsx)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}
