use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// A fully loaded CSV file: one header row and string cells.
///
/// Cells are trimmed; missing trailing cells are padded with empty strings so
/// every row has exactly `headers.len()` values.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Borrowed view over a single table row.
#[derive(Debug, Clone, Copy)]
pub struct CsvRow<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> CsvRow<'a> {
    /// Value at a resolved column index; empty when the column was not found.
    pub fn get(&self, index: Option<usize>) -> &'a str {
        index
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Value under an exact header; empty when the header is absent.
    pub fn by_header(&self, header: &str) -> &'a str {
        self.get(self.headers.iter().position(|h| h == header))
    }

    pub fn headers(&self) -> &'a [String] {
        self.headers
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }

    /// Header/value pairs in column order.
    pub fn cells(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

impl CsvTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Column index, or `MissingColumn` naming the source file.
    pub fn require_column(&self, header: &str, path: &Path) -> Result<usize> {
        self.column_index(header)
            .ok_or_else(|| IngestError::MissingColumn {
                column: header.to_string(),
                path: path.to_path_buf(),
            })
    }

    pub fn rows(&self) -> impl Iterator<Item = CsvRow<'_>> {
        self.rows.iter().map(|values| CsvRow {
            headers: &self.headers,
            values,
        })
    }
}

pub(crate) fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Rejects UTF-16 exports, which survey tools produce when saved as "Unicode text".
fn validate_encoding(bytes: &[u8], path: &Path) -> Result<()> {
    if bytes.len() >= 2 {
        if bytes[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if bytes[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Reads a CSV file whose first non-blank row is the header row.
///
/// Blank rows are dropped. Header whitespace runs are collapsed to a single
/// space so that exports with wrapped question text still match lookups.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let bytes = fs::read(path).map_err(|e| IngestError::open(path, e))?;
    validate_encoding(&bytes, path)?;
    parse_csv_bytes(&bytes, path)
}

fn parse_csv_bytes(bytes: &[u8], path: &Path) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    let mut raw_rows = raw_rows.into_iter();
    let Some(header_row) = raw_rows.next() else {
        tracing::warn!(path = %path.display(), "CSV file has no rows");
        return Ok(CsvTable::default());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(String::as_str)
        .map(normalize_header)
        .collect();
    let rows = raw_rows
        .map(|mut record| {
            record.resize(headers.len(), String::new());
            record
        })
        .collect();
    Ok(CsvTable { headers, rows })
}
