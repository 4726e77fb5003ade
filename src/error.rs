//! Error handling for BCS ingestion
//!
//! Fatal failures (missing scan files, undetectable headers, unreadable
//! tables) are variants of [`Error`]. Row-level problems in a scan file are
//! described by [`ScanFileRowIssue`] and routed through [`report_row_issue`],
//! which either raises them or records them as warnings depending on the
//! caller's [`Strictness`].

use crate::constants::ROW_ISSUE_HINT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Result type alias for BCS ingestion
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for BCS ingestion operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// No numeric scan id could be extracted from a data file name
    #[error("Cannot decode scan number from data file name: '{file_name}'")]
    PathDecode { file_name: String },

    /// Scan file referenced by a data file is missing or has moved
    #[error(
        "Could not find the input scan file '{scan_file_path}' for data file '{data_file_path}'; verify that it has not been moved or deleted."
    )]
    ScanFileNotFound {
        scan_file_path: String,
        data_file_path: String,
    },

    /// No header line could be located anywhere in a scan file
    #[error("Could not find the header information within input scan file: '{scan_file_path}'.")]
    ScanFileHeaderNotFound { scan_file_path: String },

    /// Row-level problem raised in strict mode
    #[error("{0}")]
    ScanFileRow(ScanFileRowIssue),

    /// Scan file table could not be read even after the repair retry
    #[error("Malformed table in scan file '{scan_file_path}': {message}")]
    ScanTableFormat {
        scan_file_path: String,
        message: String,
    },

    /// Header value could not be converted to its field type
    #[error("Invalid value '{value}' for '{field}' on line {line} of data file '{path}'")]
    InvalidHeaderValue {
        path: String,
        line: usize,
        field: String,
        value: String,
    },

    /// Tab-delimited reading error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// JSON sidecar could not be parsed
    #[error("Invalid JSON sidecar '{path}'")]
    Sidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data frame conversion error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a path decode error
    pub fn path_decode(file_name: impl Into<String>) -> Self {
        Self::PathDecode {
            file_name: file_name.into(),
        }
    }

    /// Create a scan file not found error naming both files
    pub fn scan_file_not_found(
        scan_file_path: impl Into<String>,
        data_file_path: impl Into<String>,
    ) -> Self {
        Self::ScanFileNotFound {
            scan_file_path: scan_file_path.into(),
            data_file_path: data_file_path.into(),
        }
    }

    /// Create a scan file header not found error
    pub fn scan_file_header_not_found(scan_file_path: impl Into<String>) -> Self {
        Self::ScanFileHeaderNotFound {
            scan_file_path: scan_file_path.into(),
        }
    }

    /// Create a scan table format error
    pub fn scan_table_format(
        scan_file_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ScanTableFormat {
            scan_file_path: scan_file_path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid header value error
    pub fn invalid_header_value(
        path: impl Into<String>,
        line: usize,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidHeaderValue {
            path: path.into(),
            line,
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error means a referenced file is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ScanFileNotFound { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

// =============================================================================
// Row-Level Issues
// =============================================================================

/// Invalid value or format found on a single scan file row
///
/// The same message is used whether the issue is raised as
/// [`Error::ScanFileRow`] or recorded as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFileRowIssue {
    pub scan_file_path: String,
    /// One-based output file number, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_number: Option<u32>,
    /// One-based step (row) number within the sub-scan, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<usize>,
    pub description: String,
}

impl ScanFileRowIssue {
    pub fn new(scan_file_path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            scan_file_path: scan_file_path.into(),
            file_number: None,
            step_number: None,
            description: description.into(),
        }
    }

    pub fn with_file_number(mut self, file_number: u32) -> Self {
        self.file_number = Some(file_number);
        self
    }

    pub fn with_step_number(mut self, step_number: usize) -> Self {
        self.step_number = Some(step_number);
        self
    }

    /// Full message including the remediation hint
    pub fn message(&self) -> String {
        let mut message = format!(
            "Invalid value or format found in input scan file: '{}'",
            self.scan_file_path
        );
        if let Some(file_number) = self.file_number {
            message.push_str(&format!("; file output number: {}", file_number));
        }
        if let Some(step_number) = self.step_number {
            message.push_str(&format!("; step number {}", step_number));
        }
        message.push('.');

        let description = self.description.trim();
        if !description.is_empty() {
            message.push(' ');
            message.push_str(description);
            if !description.ends_with('.') {
                message.push('.');
            }
        }

        message.push_str(ROW_ISSUE_HINT);
        message
    }
}

impl fmt::Display for ScanFileRowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// How row-level issues are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strictness {
    /// Record the issue as a warning, skip the value, keep parsing
    #[default]
    Lenient,
    /// Abort the parse with [`Error::ScanFileRow`]
    Strict,
}

impl Strictness {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// Raise a row issue or record it as a warning
///
/// This is the single place where strictness is applied.
pub fn report_row_issue(
    issue: ScanFileRowIssue,
    strictness: Strictness,
    warnings: &mut Vec<ScanFileRowIssue>,
) -> Result<()> {
    match strictness {
        Strictness::Strict => Err(Error::ScanFileRow(issue)),
        Strictness::Lenient => {
            warn!("{}", issue);
            warnings.push(issue);
            Ok(())
        }
    }
}
