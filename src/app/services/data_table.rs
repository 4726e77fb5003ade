//! Tabular payload of a BCS data file
//!
//! The table starts at the header line found by the header parser and runs
//! to the end of the file. Every row is tagged with the data file's base
//! name so that tables from several files can be stacked.

use crate::app::adapters::filesystem::read_lines;
use crate::constants::{FIELD_DELIMITER, UNNAMED_COLUMN_PREFIX};
use crate::{Error, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Name of the column holding the source file's base name
pub const FILENAME_COLUMN: &str = "filename";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Base name of the data file, without extension
    pub filename: String,
    /// Rows that had more cells than the header and were cut to fit
    pub truncated_rows: usize,
}

impl DataTable {
    /// Read the table whose column names are on zero-based `header_line`
    pub fn read(path: &Path, header_line: usize) -> Result<Self> {
        let lines = read_lines(path)?;
        let filename = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_lines(&lines, header_line, filename, &path.to_string_lossy())
    }

    /// Build a table from already-read lines; `source` names the file in errors
    pub fn from_lines(
        lines: &[String],
        header_line: usize,
        filename: String,
        source: &str,
    ) -> Result<Self> {
        let Some(header) = lines.get(header_line) else {
            return Err(Error::csv_parsing(
                source,
                format!("Header line {} is past end of file", header_line),
                None,
            ));
        };
        let columns = unique_column_names(header);

        let body = lines[header_line + 1..].join("\n");
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(body.as_bytes());

        let mut rows = Vec::new();
        let mut truncated_rows = 0;
        for result in reader.records() {
            let record = result.map_err(|e| {
                Error::csv_parsing(source, format!("Failed to read data table: {}", e), Some(e))
            })?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > columns.len() {
                truncated_rows += 1;
                debug!(
                    "Data row {} of {} has {} cells for {} columns",
                    rows.len() + 1,
                    source,
                    row.len(),
                    columns.len()
                );
            }
            row.resize(columns.len(), String::new());
            rows.push(row);
        }
        if truncated_rows > 0 {
            warn!(
                "Dropped extra cells from {} data rows of {}",
                truncated_rows, source
            );
        }

        debug!(
            "Data table {}: {} columns, {} rows",
            filename,
            columns.len(),
            rows.len()
        );
        Ok(Self {
            columns,
            rows,
            filename,
            truncated_rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert to a data frame with a trailing `filename` column
    ///
    /// A column is Float64 when every non-empty cell is numeric, otherwise
    /// String. Empty cells are null.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut frame_columns = Vec::with_capacity(self.columns.len() + 1);

        for (index, name) in self.columns.iter().enumerate() {
            let cells: Vec<&str> = self
                .rows
                .iter()
                .map(|row| row.get(index).map(|c| c.trim()).unwrap_or(""))
                .collect();

            let numeric: Option<Vec<Option<f64>>> = cells
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        Some(None)
                    } else {
                        cell.parse::<f64>().ok().map(Some)
                    }
                })
                .collect();

            let column = match numeric {
                Some(values) => Column::new(name.as_str().into(), values),
                None => {
                    let values: Vec<Option<&str>> = cells
                        .iter()
                        .map(|cell| (!cell.is_empty()).then_some(*cell))
                        .collect();
                    Column::new(name.as_str().into(), values)
                }
            };
            frame_columns.push(column);
        }

        let filenames = vec![self.filename.as_str(); self.rows.len()];
        frame_columns.push(Column::new(FILENAME_COLUMN.into(), filenames));

        Ok(DataFrame::new(frame_columns)?)
    }
}

/// Split a header line, naming empty cells and suffixing repeated names
fn unique_column_names(header: &str) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    header
        .split(FIELD_DELIMITER as char)
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            let name = if name.is_empty() || name == FILENAME_COLUMN {
                format!("{}{}", UNNAMED_COLUMN_PREFIX, i)
            } else {
                name.to_string()
            };
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                name
            } else {
                format!("{}.{}", name, *count - 1)
            }
        })
        .collect()
}
