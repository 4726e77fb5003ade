//! Automation run summaries
//!
//! An automation run file lists the scans executed by one automation
//! script, one row per scan, with the data file each scan produced.

use crate::app::adapters::filesystem::read_lines;
use crate::app::services::data_table::DataTable;
use crate::constants::{HEADER_DATE_FORMATS, header_keywords};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Contents of an automation run file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationRun {
    pub date: Option<NaiveDate>,
    /// Zero-based line naming the listing columns
    pub header_line: Option<usize>,
    pub listing: Option<DataTable>,
    /// Paths found in file or path columns, with `/` separators
    pub file_paths: Vec<String>,
}

impl AutomationRun {
    pub fn read(path: &Path) -> Result<Self> {
        let lines = read_lines(path)?;
        let source = path.to_string_lossy();
        let filename = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut date = None;
        let mut header_line = None;
        for (index, line) in lines.iter().enumerate() {
            if let Some(value) = line.strip_prefix(header_keywords::DATE) {
                let value = value.trim();
                date = HEADER_DATE_FORMATS
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(value, format).ok());
                if date.is_none() {
                    return Err(Error::invalid_header_value(
                        source.as_ref(),
                        index + 1,
                        "Date",
                        value,
                    ));
                }
                continue;
            }
            if line.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                header_line = index.checked_sub(1);
                break;
            }
        }

        let listing = match header_line {
            Some(header_line) => Some(DataTable::from_lines(&lines, header_line, filename, &source)?),
            None => None,
        };
        let file_paths = listing.as_ref().map(listed_paths).unwrap_or_default();

        debug!(
            "Automation run {}: {} listed files",
            path.display(),
            file_paths.len()
        );
        Ok(Self {
            date,
            header_line,
            listing,
            file_paths,
        })
    }
}

fn is_path_column(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("file") || name.contains("path")
}

fn listed_paths(listing: &DataTable) -> Vec<String> {
    let columns: Vec<usize> = listing
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| is_path_column(name))
        .map(|(i, _)| i)
        .collect();

    listing
        .rows
        .iter()
        .flat_map(|row| columns.iter().filter_map(move |&i| row.get(i)))
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(|cell| cell.replace('\\', "/"))
        .collect()
}
