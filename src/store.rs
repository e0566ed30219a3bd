//! DuckDB-backed store: one file per unit of work, zero or more logical
//! tables inside.
//!
//! The write path is a wholesale `CREATE OR REPLACE TABLE` followed by a
//! bulk load: the appender for column-typed data, a single transaction of
//! sequential prepared inserts for all-text data. The connection lives for
//! one unit of work and closes on drop, on every exit path.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, TimeDelta};
use duckdb::{
    Connection, appender_params_from_iter, params_from_iter,
    types::{TimeUnit, Value},
};
use itertools::Itertools;
use log::debug;

use crate::{
    cell::Cell,
    errors::Result,
    stage::{StagedTable, StagingPolicy},
};

pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Open the store file, creating it and its parent directory if absent.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or fully replace `table` from staged data. Returns the number
    /// of rows loaded.
    pub fn create_or_replace(&self, table: &str, staged: &StagedTable) -> Result<usize> {
        let columns = staged
            .schema
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.data_type.sql_type()))
            .join(", ");
        let ddl = format!("CREATE OR REPLACE TABLE {} ({});", quote_identifier(table), columns);
        debug!("{ddl}");
        self.conn.execute_batch(&ddl)?;

        match staged.policy {
            StagingPolicy::Inferred => self.append_bulk(table, staged),
            StagingPolicy::AllText => self.insert_sequential(table, staged),
        }
    }

    fn append_bulk(&self, table: &str, staged: &StagedTable) -> Result<usize> {
        let mut appender = self.conn.appender(table)?;
        for row in &staged.rows {
            let values: Vec<Value> = row.iter().map(cell_to_sql).collect();
            appender.append_row(appender_params_from_iter(values))?;
        }
        appender.flush()?;
        Ok(staged.rows.len())
    }

    fn insert_sequential(&self, table: &str, staged: &StagedTable) -> Result<usize> {
        let placeholders = staged.schema.columns.iter().map(|_| "?").join(", ");
        let sql = format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_identifier(table)
        );
        self.conn.execute_batch("BEGIN TRANSACTION;")?;
        {
            let mut stmt = self.conn.prepare(&sql)?;
            for row in &staged.rows {
                let values: Vec<Value> = row.iter().map(cell_to_sql).collect();
                stmt.execute(params_from_iter(values))?;
            }
        }
        self.conn.execute_batch("COMMIT;")?;
        Ok(staged.rows.len())
    }

    /// Names of all tables in the store, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' ORDER BY table_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, duckdb::Error>>()?;
        Ok(names)
    }

    /// Column names of `table`, in declaration order.
    pub fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info('{}')", escape_literal(table));
        let mut stmt = self.conn.prepare(&sql)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, duckdb::Error>>()?;
        Ok(names)
    }

    /// Fetch rows of `table` in file order, optionally limited.
    pub fn fetch_rows(&self, table: &str, limit: Option<usize>) -> Result<Vec<Vec<Cell>>> {
        let width = self.column_names(table)?.len();
        let sql = match limit {
            Some(n) => format!("SELECT * FROM {} LIMIT {n}", quote_identifier(table)),
            None => format!("SELECT * FROM {}", quote_identifier(table)),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(cell_from_sql(row.get::<_, Value>(idx)?));
            }
            out.push(cells);
        }
        Ok(out)
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn cell_to_sql(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Boolean(b) => Value::Boolean(*b),
        Cell::Integer(i) => Value::BigInt(*i),
        Cell::Float(f) => Value::Double(*f),
        Cell::Date(d) => Value::Date32(days_since_epoch(*d)),
        Cell::DateTime(dt) => {
            Value::Timestamp(TimeUnit::Microsecond, dt.and_utc().timestamp_micros())
        }
        Cell::Text(s) => Value::Text(s.clone()),
    }
}

fn cell_from_sql(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Boolean(b) => Cell::Boolean(b),
        Value::TinyInt(v) => Cell::Integer(v as i64),
        Value::SmallInt(v) => Cell::Integer(v as i64),
        Value::Int(v) => Cell::Integer(v as i64),
        Value::BigInt(v) => Cell::Integer(v),
        Value::HugeInt(v) => Cell::Integer(v as i64),
        Value::UTinyInt(v) => Cell::Integer(v as i64),
        Value::USmallInt(v) => Cell::Integer(v as i64),
        Value::UInt(v) => Cell::Integer(v as i64),
        Value::UBigInt(v) => Cell::Integer(v as i64),
        Value::Float(v) => Cell::Float(v as f64),
        Value::Double(v) => Cell::Float(v),
        Value::Text(s) => Cell::Text(s),
        Value::Date32(days) => Cell::Date(
            NaiveDate::default()
                .checked_add_signed(TimeDelta::days(days as i64))
                .unwrap_or_default(),
        ),
        Value::Timestamp(unit, raw) => timestamp_to_cell(unit, raw),
        other => Cell::Text(format!("{other:?}")),
    }
}

fn timestamp_to_cell(unit: TimeUnit, raw: i64) -> Cell {
    let micros = match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    };
    match chrono::DateTime::from_timestamp_micros(micros) {
        Some(dt) => Cell::DateTime(dt.naive_utc()),
        None => Cell::Null,
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}
