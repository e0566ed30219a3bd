//! Workbook reading: open a spreadsheet file, select one sheet, and flatten
//! it into a [`RawTable`] with an implicit header row.
//!
//! Reading goes through `calamine`'s auto-detecting opener so `.xlsx` and
//! `.xls` both work, either from a path or from a caller-owned
//! `Read + Seek` stream.

use std::{
    collections::HashSet,
    fs,
    io::{Read, Seek},
    path::{Path, PathBuf},
};

use calamine::{Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};

use crate::{
    cell::Cell,
    errors::{IngestError, Result},
};

/// Sheet selection: zero-based index or sheet name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl std::str::FromStr for SheetSelector {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("sheet selector must not be empty".to_string());
        }
        match trimmed.parse::<usize>() {
            Ok(index) => Ok(SheetSelector::Index(index)),
            Err(_) => Ok(SheetSelector::Name(trimmed.to_string())),
        }
    }
}

/// One sheet flattened into rows. The header row is kept raw; header
/// normalization is the schema module's job.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// Read the selected sheet of the workbook at `path`.
pub fn read_workbook(path: &Path, selector: &SheetSelector) -> Result<RawTable> {
    if !path.exists() {
        return Err(IngestError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut workbook = open_workbook_auto(path)?;
    extract(&mut workbook, selector, path)
}

/// Read the selected sheet from a pre-opened stream. `origin` labels the
/// source in errors; the stream's lifetime stays with the caller.
pub fn read_workbook_from<RS>(stream: RS, selector: &SheetSelector, origin: &Path) -> Result<RawTable>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(stream)?;
    extract(&mut workbook, selector, origin)
}

fn extract<RS>(workbook: &mut Sheets<RS>, selector: &SheetSelector, origin: &Path) -> Result<RawTable>
where
    RS: Read + Seek,
{
    let empty = || IngestError::EmptyWorkbook {
        path: origin.to_path_buf(),
    };
    if workbook.sheet_names().is_empty() {
        return Err(empty());
    }
    let range = match selector {
        SheetSelector::Index(index) => workbook.worksheet_range_at(*index).ok_or_else(empty)??,
        SheetSelector::Name(name) => workbook.worksheet_range(name)?,
    };

    let mut rows = range.rows();
    let Some(first) = rows.next() else {
        return Err(empty());
    };
    let header: Vec<Cell> = first.iter().map(Cell::from_sheet).collect();
    let body: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(Cell::from_sheet).collect())
        .collect();

    Ok(RawTable { header, rows: body })
}

/// Whether the path looks like a workbook file this tool ingests.
pub fn is_workbook_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"))
}

/// Expand files and directories into a deduplicated workbook list,
/// preserving first-seen order. Directories are walked recursively with
/// entries sorted for determinism.
pub fn collect_workbook_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            walk_dir(input, &mut seen, &mut files)?;
        } else if is_workbook_file(input) && seen.insert(input.clone()) {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn walk_dir(dir: &Path, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    for entry in entries {
        if entry.is_dir() {
            walk_dir(&entry, seen, files)?;
        } else if is_workbook_file(&entry) && seen.insert(entry.clone()) {
            files.push(entry);
        }
    }
    Ok(())
}
