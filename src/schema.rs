//! Header normalization, table identifier derivation, and column type
//! inference.
//!
//! The first sheet row becomes the [`Schema`] header: every cell is
//! stringified, blank headers are named positionally, and duplicates get a
//! numeric suffix. Type inference walks a sample of the data rows and
//! eliminates per-column candidates until one type survives.

use crate::cell::{Cell, ColumnType, parse_boolean, parse_naive_date, parse_naive_datetime};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub data_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub columns: Vec<ColumnMeta>,
}

impl Schema {
    /// All-text schema over the given header names.
    pub fn all_text(headers: &[String]) -> Self {
        let columns = headers
            .iter()
            .map(|name| ColumnMeta {
                name: name.clone(),
                data_type: ColumnType::Text,
            })
            .collect();
        Schema { columns }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// Convert the raw first row into unique, non-empty column names.
pub fn normalize_headers(raw: &[Cell]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, cell) in raw.iter().enumerate() {
        let base = cell.as_display().trim().to_string();
        let base = if base.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            base
        };
        let mut candidate = base.clone();
        let mut suffix = 2usize;
        while names.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

/// Derive a storage identifier from a source file stem: every character
/// outside the alphanumeric set becomes `_`, and a digit-leading result is
/// prefixed so the name is always a valid table identifier.
pub fn table_identifier(stem: &str) -> String {
    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        return "table".to_string();
    }
    match sanitized.chars().next() {
        Some(first) if first.is_numeric() => format!("t_{sanitized}"),
        _ => sanitized,
    }
}

#[derive(Debug, Clone)]
struct TypeCandidate {
    possible_boolean: bool,
    possible_integer: bool,
    possible_float: bool,
    possible_date: bool,
    possible_datetime: bool,
    observed: bool,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            possible_boolean: true,
            possible_integer: true,
            possible_float: true,
            possible_date: true,
            possible_datetime: true,
            observed: false,
        }
    }

    fn observe(&mut self, cell: &Cell) {
        if cell.is_null() {
            return;
        }
        self.observed = true;
        match cell {
            Cell::Null => {}
            Cell::Boolean(_) => {
                self.possible_integer = false;
                self.possible_float = false;
                self.possible_date = false;
                self.possible_datetime = false;
            }
            Cell::Integer(_) => {
                self.possible_boolean = false;
                self.possible_date = false;
                self.possible_datetime = false;
            }
            Cell::Float(f) => {
                self.possible_boolean = false;
                self.possible_date = false;
                self.possible_datetime = false;
                if f.fract() != 0.0 {
                    self.possible_integer = false;
                }
            }
            Cell::Date(_) => {
                self.possible_boolean = false;
                self.possible_integer = false;
                self.possible_float = false;
            }
            Cell::DateTime(_) => {
                self.possible_boolean = false;
                self.possible_integer = false;
                self.possible_float = false;
                self.possible_date = false;
            }
            Cell::Text(s) => {
                if self.possible_boolean && parse_boolean(s).is_none() {
                    self.possible_boolean = false;
                }
                if self.possible_integer && s.trim().parse::<i64>().is_err() {
                    self.possible_integer = false;
                }
                if self.possible_float && s.trim().parse::<f64>().is_err() {
                    self.possible_float = false;
                }
                if self.possible_date && parse_naive_date(s).is_none() {
                    self.possible_date = false;
                }
                if self.possible_datetime && parse_naive_datetime(s).is_none() {
                    self.possible_datetime = false;
                }
            }
        }
    }

    fn decide(&self) -> ColumnType {
        if !self.observed {
            return ColumnType::Text;
        }
        if self.possible_boolean {
            ColumnType::Boolean
        } else if self.possible_integer {
            ColumnType::Integer
        } else if self.possible_float {
            ColumnType::Float
        } else if self.possible_date {
            ColumnType::Date
        } else if self.possible_datetime {
            ColumnType::DateTime
        } else {
            ColumnType::Text
        }
    }
}

/// Infer one column type per header from the first `sample_rows` data rows
/// (0 means full scan). Blank cells do not vote.
pub fn infer_schema(headers: &[String], rows: &[Vec<Cell>], sample_rows: usize) -> Schema {
    let mut candidates = vec![TypeCandidate::new(); headers.len()];
    for (row_idx, row) in rows.iter().enumerate() {
        if sample_rows > 0 && row_idx >= sample_rows {
            break;
        }
        for (idx, cell) in row.iter().enumerate().take(candidates.len()) {
            candidates[idx].observe(cell);
        }
    }
    let columns = headers
        .iter()
        .zip(candidates.iter())
        .map(|(name, candidate)| ColumnMeta {
            name: name.clone(),
            data_type: candidate.decide(),
        })
        .collect();
    Schema { columns }
}
