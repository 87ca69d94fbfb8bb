use std::{fmt, fs, iter, path::Path, str::FromStr};

use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, WriterBuilder};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::{Error, Result};

/// A header row plus string cells. Every row is as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Pads or cuts every row to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Every cell of column `name`, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name).ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
            available: self.headers.clone(),
        })?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}

/// Which sheet of the input to read: by position or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sheet {
    Index(usize),
    Name(String),
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::Index(0)
    }
}

impl FromStr for Sheet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<usize>() {
            Ok(idx) => Sheet::Index(idx),
            Err(_) => Sheet::Name(s.to_string()),
        })
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sheet::Index(idx) => write!(f, "{idx}"),
            Sheet::Name(name) => f.write_str(name),
        }
    }
}

/// Extensions read as workbooks. Only `.xlsx` can be written.
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Delimited(u8),
    Workbook,
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Workbook by extension, tab for `.tsv`/`.tab`, comma otherwise.
fn format_for(path: &Path) -> Format {
    match extension(path).as_deref() {
        Some("tsv" | "tab") => Format::Delimited(b'\t'),
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => Format::Workbook,
        _ => Format::Delimited(b','),
    }
}

/// Reads `sheet` of a workbook, or a delimited file, with every cell kept as a string.
///
/// A delimited file holds a single sheet, reachable as index `0` or by the
/// file stem.
pub fn read_table(path: &Path, sheet: &Sheet) -> Result<Table> {
    match format_for(path) {
        Format::Workbook => read_workbook(path, sheet),
        Format::Delimited(delimiter) => read_delimited(path, sheet, delimiter),
    }
}

fn sheet_not_found(path: &Path, sheet: &Sheet) -> Error {
    Error::SheetNotFound {
        sheet: sheet.to_string(),
        path: path.display().to_string(),
    }
}

fn read_workbook(path: &Path, sheet: &Sheet) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Sheet::Index(idx) => names.get(*idx),
        Sheet::Name(name) => names.iter().find(|n| *n == name),
    }
    .cloned()
    .ok_or_else(|| sheet_not_found(path, sheet))?;

    let range = workbook.worksheet_range(&name)?;
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();
    Ok(Table::new(headers, rows.collect()))
}

/// Text cells stay verbatim so identifiers keep their leading zeros.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_delimited(path: &Path, sheet: &Sheet, delimiter: u8) -> Result<Table> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let found = match sheet {
        Sheet::Index(idx) => *idx == 0,
        Sheet::Name(name) => name == stem,
    };
    if !found {
        return Err(sheet_not_found(path, sheet));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Short rows are padded, wider ones would lose cells.
        if record.len() > headers.len() {
            return Err(Error::RaggedRow {
                line: record.position().map_or(0, |pos| pos.line()),
                found: record.len(),
                expected: headers.len(),
            });
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(headers, rows))
}

/// Writes `table` with its header row, creating parent directories as needed.
/// `.xlsx` paths get a single-sheet workbook, other workbook formats are refused.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let format = format_for(path);
    if format == Format::Workbook && extension(path).as_deref() != Some("xlsx") {
        return Err(Error::UnsupportedFormat(path.display().to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match format {
        Format::Workbook => write_workbook(table, path),
        Format::Delimited(delimiter) => write_delimited(table, path, delimiter),
    }
}

fn write_workbook(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let lines = iter::once(table.headers()).chain(table.rows().iter().map(Vec::as_slice));
    for (row_idx, cells) in lines.enumerate() {
        let row = u32::try_from(row_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col_idx, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let col = u16::try_from(col_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
            worksheet.write_string(row, col, cell.as_str())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_delimited(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
