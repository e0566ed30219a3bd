#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tempfile::{TempDir, tempdir};

/// Cell value for generated workbook fixtures.
#[derive(Debug, Clone)]
pub enum Field {
    S(String),
    N(f64),
}

pub fn s(value: &str) -> Field {
    Field::S(value.to_string())
}

pub fn n(value: f64) -> Field {
    Field::N(value)
}

/// Scratch directory helper that cleans up automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Generates a workbook fixture under the workspace and returns its path.
    pub fn write_workbook(&self, name: &str, headers: &[&str], rows: &[Vec<Field>]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        write_workbook(&path, headers, rows);
        path
    }
}

pub fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<Field>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .expect("write header cell");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, field) in row.iter().enumerate() {
            let r = (row_idx + 1) as u32;
            let c = col_idx as u16;
            match field {
                Field::S(value) => {
                    worksheet.write_string(r, c, value).expect("write text cell");
                }
                Field::N(value) => {
                    worksheet.write_number(r, c, *value).expect("write number cell");
                }
            }
        }
    }
    workbook.save(path).expect("save workbook fixture");
}
