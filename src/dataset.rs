//! Generic tabular row model
//!
//! Reads CSV input into rows of string cells and extracts numeric feature
//! columns and binary label columns. Which columns mean what stays the
//! caller's decision; nothing here is dataset-specific.

use std::path::Path;
use thiserror::Error;

/// Errors for dataset loading and column extraction
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("row {row} has {actual} columns, need at least {required}")]
    ShortRow {
        row: usize,
        required: usize,
        actual: usize,
    },

    #[error("row {row} column {column}: cannot parse '{value}' as a number")]
    BadNumber {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("no data rows found")]
    Empty,
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Parse CSV text into rows of trimmed string cells, skipping blank lines.
pub fn parse_csv(text: &str, has_header: bool) -> Vec<Vec<String>> {
    text.lines()
        .skip(usize::from(has_header))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

/// Read a CSV file into rows of string cells.
pub fn read_csv(path: &Path, has_header: bool) -> Result<Vec<Vec<String>>> {
    let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows = parse_csv(&text, has_header);
    if rows.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(rows)
}

/// Extract one column parsed as `f64`.
pub fn numeric_column(rows: &[Vec<String>], column: usize) -> Result<Vec<f64>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let cell = row.get(column).ok_or(DatasetError::ShortRow {
                row: i,
                required: column + 1,
                actual: row.len(),
            })?;
            cell.parse::<f64>().map_err(|_| DatasetError::BadNumber {
                row: i,
                column,
                value: cell.clone(),
            })
        })
        .collect()
}

/// Extract one column as binary labels: a cell of "1" is positive.
pub fn label_column(rows: &[Vec<String>], column: usize) -> Result<Vec<bool>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let cell = row.get(column).ok_or(DatasetError::ShortRow {
                row: i,
                required: column + 1,
                actual: row.len(),
            })?;
            Ok(cell == "1")
        })
        .collect()
}
