use std::path::PathBuf;

use thiserror::Error;

/// Failure kinds for the ingestion and aggregation pipeline.
///
/// Batch-style commands catch these per unit of work (one workbook, one
/// manifest group, one store file), report them, and move on; `convert`
/// stops on the first one it sees.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source file not found: {path:?}")]
    SourceNotFound { path: PathBuf },

    #[error("workbook {path:?} has no sheet data to ingest")]
    EmptyWorkbook { path: PathBuf },

    #[error("schema conflict in {src}: {detail}")]
    SchemaConflict { src: String, detail: String },

    #[error("required column '{column}' not present in table '{table}'")]
    MissingColumn { table: String, column: String },

    #[error("{context}: cannot interpret '{value}' as a number")]
    DataFormat { context: String, value: String },

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("storage error: {0}")]
    Storage(#[from] duckdb::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
