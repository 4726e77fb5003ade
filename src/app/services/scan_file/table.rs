//! Motor position tables read from scan files
//!
//! Scan files are edited by hand and by several generations of instrument
//! software, so the table reader tolerates a handful of known defects:
//! comment rows inside the table, blank rows, stray unnamed columns, and a
//! header line that lost its trailing tab (which shifts every data row one
//! field to the right of its name).

use crate::app::models::{FlyingMotorSpec, ScanFileLocation};
use crate::constants::{COMMENT_MARKER, FIELD_DELIMITER, UNNAMED_COLUMN_PREFIX};
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// Whether a column name was generated for an empty header cell
pub fn is_unnamed(name: &str) -> bool {
    name.starts_with(UNNAMED_COLUMN_PREFIX)
}

fn unnamed_column(position: usize) -> String {
    format!("{}{}", UNNAMED_COLUMN_PREFIX, position)
}

/// Detect a flying motor announced on a scan file's first line
///
/// The line reads like `Flying Beamline Energy(…)`; the motor name is the
/// text between the last `Flying ` and the following `(`.
pub fn detect_flying_motor(first_line: &str) -> Option<FlyingMotorSpec> {
    let line = first_line.trim_end().replace("flying ", "Flying ");
    let (_, tail) = line.rsplit_once("Flying ")?;
    let (name, _) = tail.rsplit_once('(')?;
    let name = name.trim();

    if name.is_empty() {
        None
    } else {
        Some(FlyingMotorSpec {
            name: name.to_string(),
        })
    }
}

/// Motor positions for one sub-scan of a scan file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanTable {
    pub columns: Vec<String>,
    /// Cells by row; every row has one cell per column
    pub rows: Vec<Vec<String>>,
    pub flying_motor: Option<FlyingMotorSpec>,
    /// Set when a missing delimiter was repaired; such files need manual review
    pub repaired: bool,
}

/// Table as read, before column normalization
#[derive(Debug)]
struct RawTable {
    columns: Vec<String>,
    /// Leading field of each row when rows are one field wider than the header
    index: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl ScanTable {
    /// Read the sub-scan at `location` from the lines of a scan file
    ///
    /// `source` names the scan file in error messages.
    pub fn from_lines(lines: &[String], location: &ScanFileLocation, source: &str) -> Result<Self> {
        let header_line = location.header_line;
        let first_line = location.first_line;
        let row_count = location.row_count();
        debug!(
            "Reading scan table from {}: header {}, skip {:?}, rows {}",
            source,
            header_line,
            location.skip_rows(),
            row_count
        );

        let raw = match read_region(lines, header_line, first_line, row_count, source) {
            Ok(raw) => raw,
            Err(error) if can_retry_without_first_row(lines, header_line, first_line, row_count) => {
                debug!(
                    "Retrying {} without leading comment row at line {}: {}",
                    source, first_line, error
                );
                read_region(lines, header_line, first_line + 1, row_count - 1, source)?
            }
            Err(error) => return Err(error),
        };

        let flying_motor = if header_line > 0 {
            lines.first().and_then(|line| detect_flying_motor(line))
        } else {
            None
        };

        let mut table = ScanTable {
            columns: raw.columns,
            rows: raw.rows,
            flying_motor,
            repaired: false,
        };

        if let Some(index) = raw.index {
            let name = match &table.flying_motor {
                Some(flying) => flying.name.clone(),
                None => unnamed_column(table.columns.len()),
            };
            table.promote_index(index, name);
            warn!(
                "Scan file '{}' is missing a header delimiter; columns were realigned and should be reviewed",
                source
            );
        }

        table.drop_extra_unnamed_columns();
        table.name_flying_column();
        Ok(table)
    }

    /// Number of steps (rows)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Put the index field back at the front of each row and append a column
    /// name for the field that lost its header
    fn promote_index(&mut self, index: Vec<String>, trailing_name: String) {
        for (row, value) in self.rows.iter_mut().zip(index) {
            row.insert(0, value);
        }
        self.columns.push(trailing_name);
        self.repaired = true;
    }

    /// At most one unnamed column (count time or flying motor) is valid
    fn drop_extra_unnamed_columns(&mut self) {
        let unnamed: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| is_unnamed(name))
            .map(|(i, _)| i)
            .collect();

        for &position in unnamed.iter().skip(1).rev() {
            self.columns.remove(position);
            for row in &mut self.rows {
                if position < row.len() {
                    row.remove(position);
                }
            }
        }
    }

    fn name_flying_column(&mut self) {
        let Some(flying) = &self.flying_motor else {
            return;
        };
        let Some(last) = self.columns.last_mut() else {
            return;
        };
        if *last == flying.name {
            return;
        }
        if !is_unnamed(last) {
            warn!(
                "Overwriting column '{}' with flying motor '{}'",
                last, flying.name
            );
        }
        *last = flying.name.clone();
    }
}

fn split_header(line: &str) -> Vec<String> {
    line.split(FIELD_DELIMITER as char)
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            if name.is_empty() {
                unnamed_column(i)
            } else {
                name.to_string()
            }
        })
        .collect()
}

/// Structural failures caused by a leading comment row can be repaired by
/// skipping that row, but only when the header has no trailing delimiter
fn can_retry_without_first_row(
    lines: &[String],
    header_line: usize,
    first_line: usize,
    row_count: usize,
) -> bool {
    let first_is_comment = lines
        .get(first_line)
        .is_some_and(|line| line.trim().starts_with(COMMENT_MARKER));
    let header_has_trailing_delimiter = lines
        .get(header_line)
        .is_some_and(|line| line.ends_with(FIELD_DELIMITER as char));

    row_count > 1 && first_is_comment && !header_has_trailing_delimiter
}

fn read_region(
    lines: &[String],
    header_line: usize,
    first_line: usize,
    row_count: usize,
    source: &str,
) -> Result<RawTable> {
    let header = lines.get(header_line).ok_or_else(|| {
        Error::scan_table_format(source, format!("Header line {} is past end of file", header_line))
    })?;
    let columns = split_header(header);

    let end = first_line.saturating_add(row_count).min(lines.len());
    let region = if first_line < end {
        lines[first_line..end].join("\n")
    } else {
        String::new()
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(region.as_bytes());

    let mut expected_width = columns.len();
    let mut has_index = false;
    let mut rows = Vec::new();

    for (record_num, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            Error::csv_parsing(source, format!("Failed to read scan table: {}", e), Some(e))
        })?;

        // Rows one field wider than the header carry an unnamed leading index
        if record_num == 0 && record.len() == columns.len() + 1 {
            expected_width = record.len();
            has_index = true;
        }

        if record.len() > expected_width {
            let line = record
                .position()
                .map(|p| first_line as u64 + p.line())
                .unwrap_or(0);
            return Err(Error::scan_table_format(
                source,
                format!(
                    "Expected {} fields in line {}, saw {}",
                    expected_width,
                    line,
                    record.len()
                ),
            ));
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(expected_width, String::new());
        rows.push(row);
    }

    rows.retain(|row| {
        let is_comment = row
            .first()
            .is_some_and(|cell| cell.trim().starts_with(COMMENT_MARKER));
        let is_blank = row.iter().all(|cell| cell.trim().is_empty());
        !is_comment && !is_blank
    });

    let index = if has_index {
        Some(rows.iter_mut().map(|row| row.remove(0)).collect())
    } else {
        None
    };

    Ok(RawTable {
        columns,
        index,
        rows,
    })
}
