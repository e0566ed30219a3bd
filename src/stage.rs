//! Type-coercion staging: turn a normalized header plus raw rows into
//! column-typed data ready for bulk load.
//!
//! Two policies exist. `Inferred` samples the body, decides one type per
//! column, and coerces every cell to it; a cell that contradicts the sampled
//! type makes staging fail so the caller can fall back. `AllText` declares
//! every column text and never fails for data-shape reasons.

use crate::{
    cell::Cell,
    errors::{IngestError, Result},
    schema::{self, Schema},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingPolicy {
    Inferred,
    AllText,
}

impl StagingPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            StagingPolicy::Inferred => "inferred",
            StagingPolicy::AllText => "all-text",
        }
    }
}

/// Column-typed data ready for the storage sink. Row and column counts
/// match the input exactly.
#[derive(Debug, Clone)]
pub struct StagedTable {
    pub schema: Schema,
    pub rows: Vec<Vec<Cell>>,
    pub policy: StagingPolicy,
}

impl StagedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Stage with per-column inferred types. Fails when a cell cannot be
/// coerced to its column's decided type.
pub fn stage_inferred(
    headers: &[String],
    rows: &[Vec<Cell>],
    sample_rows: usize,
    source: &str,
) -> Result<StagedTable> {
    check_widths(headers, rows, source)?;
    let schema = schema::infer_schema(headers, rows, sample_rows);
    let mut staged_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut staged = Vec::with_capacity(row.len());
        for (cell, column) in row.iter().zip(schema.columns.iter()) {
            staged.push(cell.coerce(column.data_type, source)?);
        }
        staged_rows.push(staged);
    }
    Ok(StagedTable {
        schema,
        rows: staged_rows,
        policy: StagingPolicy::Inferred,
    })
}

/// Stage everything as text, folding null-literal forms back to null.
pub fn stage_all_text(headers: &[String], rows: &[Vec<Cell>], source: &str) -> Result<StagedTable> {
    check_widths(headers, rows, source)?;
    let schema = Schema::all_text(headers);
    let staged_rows = rows
        .iter()
        .map(|row| row.iter().map(Cell::to_text).collect())
        .collect();
    Ok(StagedTable {
        schema,
        rows: staged_rows,
        policy: StagingPolicy::AllText,
    })
}

fn check_widths(headers: &[String], rows: &[Vec<Cell>], source: &str) -> Result<()> {
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != headers.len() {
            return Err(IngestError::SchemaConflict {
                src: source.to_string(),
                detail: format!(
                    "row {} has {} column(s), header has {}",
                    idx + 1,
                    row.len(),
                    headers.len()
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ColumnType;

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn inferred_staging_coerces_numeric_text() {
        let headers = headers(&["qty", "weight"]);
        let rows = vec![
            vec![text("1"), text("10.5")],
            vec![Cell::Float(2.0), Cell::Float(5.5)],
        ];
        let staged = stage_inferred(&headers, &rows, 0, "test").unwrap();
        assert_eq!(staged.schema.columns[0].data_type, ColumnType::Integer);
        assert_eq!(staged.schema.columns[1].data_type, ColumnType::Float);
        assert_eq!(staged.rows[0], vec![Cell::Integer(1), Cell::Float(10.5)]);
        assert_eq!(staged.rows[1], vec![Cell::Integer(2), Cell::Float(5.5)]);
    }

    #[test]
    fn inferred_staging_fails_when_sample_lied() {
        let headers = headers(&["qty"]);
        let rows = vec![vec![Cell::Integer(1)], vec![text("n/a")]];
        // Full scan sees the text value and infers Text; a one-row sample
        // decides Integer and then trips over row two.
        assert!(stage_inferred(&headers, &rows, 0, "test").is_ok());
        let err = stage_inferred(&headers, &rows, 1, "test").unwrap_err();
        assert!(matches!(err, IngestError::SchemaConflict { .. }));
    }

    #[test]
    fn all_text_staging_never_fails_on_mixed_types() {
        let headers = headers(&["mixed"]);
        let rows = vec![
            vec![Cell::Integer(1)],
            vec![text("abc")],
            vec![Cell::Float(2.5)],
            vec![text("nan")],
        ];
        let staged = stage_all_text(&headers, &rows, "test").unwrap();
        assert_eq!(staged.schema.columns[0].data_type, ColumnType::Text);
        assert_eq!(
            staged.rows,
            vec![
                vec![text("1")],
                vec![text("abc")],
                vec![text("2.5")],
                vec![Cell::Null],
            ]
        );
    }

    #[test]
    fn width_mismatch_is_a_schema_conflict() {
        let headers = headers(&["a", "b"]);
        let rows = vec![vec![text("1")]];
        let err = stage_all_text(&headers, &rows, "short.xlsx").unwrap_err();
        match err {
            IngestError::SchemaConflict { src: source, .. } => assert_eq!(source, "short.xlsx"),
            other => panic!("expected schema conflict, got {other:?}"),
        }
    }
}
