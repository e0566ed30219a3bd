//! Scalar cell values and the column types they coerce into.
//!
//! Provides [`Cell`], the heterogeneous value read out of a workbook sheet or
//! a store row, and [`ColumnType`], the per-column type decided during
//! staging. Conversion from `calamine` cells happens here so the rest of the
//! pipeline never touches the parser's own value enum.

use std::fmt;

use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::errors::{IngestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Date,
    DateTime,
    Text,
}

impl ColumnType {
    /// DuckDB column type used in CREATE TABLE statements.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "TIMESTAMP",
            ColumnType::Text => "VARCHAR",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Text => "text",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

/// Textual forms a generic stringifier emits for missing values. The
/// all-text staging policy maps these back to explicit nulls.
const NULL_FORMS: &[&str] = &["", "nan", "None", "NaT"];

impl Cell {
    pub fn from_sheet(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Null,
            Data::String(s) if s.is_empty() => Cell::Null,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Integer(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Boolean(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(parsed) if is_midnight(&parsed) => Cell::Date(parsed.date()),
                Some(parsed) => Cell::DateTime(parsed),
                None => Cell::Text(dt.to_string()),
            },
            Data::DateTimeIso(s) => match parse_naive_datetime(s) {
                Some(parsed) => Cell::DateTime(parsed),
                None => parse_naive_date(s).map(Cell::Date).unwrap_or_else(|| Cell::Text(s.clone())),
            },
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) => Cell::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_display(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Boolean(b) => b.to_string(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(f) => {
                if f.fract() == 0.0 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Stringify for the all-text policy, folding null-literal forms back
    /// into an explicit null.
    pub fn to_text(&self) -> Cell {
        match self {
            Cell::Null => Cell::Null,
            Cell::Text(s) if NULL_FORMS.contains(&s.as_str()) => Cell::Null,
            other => Cell::Text(other.as_display()),
        }
    }

    /// Numeric reading used by the aggregation scan. `None` means the cell
    /// holds no number at all (null, or unparseable text).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Coerce into `target`, failing when the value contradicts the column's
    /// decided type. Nulls pass through every target unchanged.
    pub fn coerce(&self, target: ColumnType, source: &str) -> Result<Cell> {
        if self.is_null() {
            return Ok(Cell::Null);
        }
        let mismatch = || IngestError::SchemaConflict {
            src: source.to_string(),
            detail: format!("value '{}' does not fit column type {target}", self.as_display()),
        };
        let coerced = match target {
            ColumnType::Text => Cell::Text(self.as_display()),
            ColumnType::Boolean => match self {
                Cell::Boolean(b) => Cell::Boolean(*b),
                Cell::Text(s) => Cell::Boolean(parse_boolean(s).ok_or_else(mismatch)?),
                _ => return Err(mismatch()),
            },
            ColumnType::Integer => match self {
                Cell::Integer(i) => Cell::Integer(*i),
                Cell::Float(f) if f.fract() == 0.0 => Cell::Integer(*f as i64),
                Cell::Text(s) => Cell::Integer(s.trim().parse().map_err(|_| mismatch())?),
                _ => return Err(mismatch()),
            },
            ColumnType::Float => match self {
                Cell::Integer(i) => Cell::Float(*i as f64),
                Cell::Float(f) => Cell::Float(*f),
                Cell::Text(s) => Cell::Float(s.trim().parse().map_err(|_| mismatch())?),
                _ => return Err(mismatch()),
            },
            ColumnType::Date => match self {
                Cell::Date(d) => Cell::Date(*d),
                Cell::DateTime(dt) if is_midnight(dt) => Cell::Date(dt.date()),
                Cell::Text(s) => Cell::Date(parse_naive_date(s).ok_or_else(mismatch)?),
                _ => return Err(mismatch()),
            },
            ColumnType::DateTime => match self {
                Cell::DateTime(dt) => Cell::DateTime(*dt),
                Cell::Date(d) => Cell::DateTime(d.and_hms_opt(0, 0, 0).unwrap_or_default()),
                Cell::Text(s) => match parse_naive_datetime(s).or_else(|| {
                    parse_naive_date(s).and_then(|d| d.and_hms_opt(0, 0, 0))
                }) {
                    Some(parsed) => Cell::DateTime(parsed),
                    None => return Err(mismatch()),
                },
                _ => return Err(mismatch()),
            },
        };
        Ok(coerced)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

fn is_midnight(dt: &NaiveDateTime) -> bool {
    dt.time().num_seconds_from_midnight() == 0 && dt.time().nanosecond() == 0
}

pub fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
