//! Per-file ingestion
//!
//! Combines file classification, name decoding, header parsing, the data
//! table, file timestamps and the optional JSON sidecar into one
//! [`IngestRecord`] per data file. Each call is independent of every other,
//! so callers may ingest many files in parallel.

pub mod sidecar;

pub use sidecar::{Sidecar, load_sidecar, sidecar_path};

use crate::app::adapters::filesystem::FileTimestamps;
use crate::app::models::{FileIdentity, FileKind, HeaderInfo};
use crate::app::services::automation_run::AutomationRun;
use crate::app::services::data_header::parse_data_header;
use crate::app::services::data_table::DataTable;
use crate::app::services::path_codec::{classify_file, decode_file_identity};
use crate::app::services::subpath_remap::SubpathRemapper;
use crate::constants::TIMESTAMP_DISPLAY_FORMAT;
use crate::error::Strictness;
use crate::{Error, Result};
use chrono_tz::Tz;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options shared by every file of an ingestion run
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub remapper: SubpathRemapper,
    pub strictness: Strictness,
    pub load_sidecar: bool,
    /// Zone used to render file timestamps
    pub timezone: Tz,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            remapper: SubpathRemapper::default(),
            strictness: Strictness::default(),
            load_sidecar: true,
            timezone: chrono_tz::America::Los_Angeles,
        }
    }
}

/// Look up an IANA time zone such as `America/Los_Angeles`
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim().parse::<Tz>().map_err(|_| {
        Error::configuration(format!("Unknown time zone '{}'", name))
    })
}

/// Metadata record for one data file
#[derive(Debug, Clone, Serialize)]
pub struct IngestRecord {
    pub file_path: PathBuf,
    pub filename: String,
    pub mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<FileIdentity>,
    pub created: String,
    pub modified: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_run: Option<AutomationRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidecar: Option<Sidecar>,
    pub data_columns: Vec<String>,
    pub data_row_count: usize,
    /// Data rows cut to the header width
    #[serde(skip_serializing_if = "is_zero")]
    pub data_truncated_rows: usize,
    #[serde(skip)]
    pub table: Option<DataTable>,
}

impl IngestRecord {
    /// Data table as a frame with a trailing `filename` column
    pub fn to_dataframe(&self) -> Result<Option<DataFrame>> {
        self.table.as_ref().map(DataTable::to_dataframe).transpose()
    }

    /// Row-level warnings recorded while parsing the header
    pub fn warning_count(&self) -> usize {
        self.header.as_ref().map_or(0, |h| h.warnings.len())
    }
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

/// Ingest one data file
///
/// Missing scan files, undetectable scan headers and (in strict mode)
/// malformed scan file rows fail the file; the error names the file.
pub fn ingest_data_file(path: &Path, options: &IngestOptions) -> Result<IngestRecord> {
    if !path.is_file() {
        return Err(Error::io(
            format!("Data file does not exist: {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        ));
    }

    let kind = classify_file(path);
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let identity = match decode_file_identity(path) {
        Ok(identity) => Some(identity),
        Err(e) => {
            debug!("{}", e);
            None
        }
    };

    let timestamps = FileTimestamps::read(path)?;
    let created =
        FileTimestamps::format(timestamps.created, &options.timezone, TIMESTAMP_DISPLAY_FORMAT);
    let modified =
        FileTimestamps::format(timestamps.modified, &options.timezone, TIMESTAMP_DISPLAY_FORMAT);

    let (header, automation_run, table) = if kind.is_some_and(|k| k.is_automation_run()) {
        let run = AutomationRun::read(path)?;
        let table = run.listing.clone();
        (None, Some(run), table)
    } else {
        let header = parse_data_header(path, &options.remapper, options.strictness)?;
        let table = match header.motor_header_linenum {
            Some(line) => Some(DataTable::read(path, line)?),
            None => None,
        };
        (Some(header), None, table)
    };

    let sidecar = if options.load_sidecar {
        load_sidecar(path)?
    } else {
        None
    };

    let record = IngestRecord {
        file_path: path.to_path_buf(),
        filename,
        mime_type: kind.map(|k: FileKind| k.mime_type()),
        identity,
        created,
        modified,
        header,
        automation_run,
        sidecar,
        data_columns: table.as_ref().map(|t| t.columns.clone()).unwrap_or_default(),
        data_row_count: table.as_ref().map_or(0, DataTable::len),
        data_truncated_rows: table.as_ref().map_or(0, |t| t.truncated_rows),
        table,
    };

    info!(
        "Ingested {} ({} rows, {} warnings)",
        record.filename,
        record.data_row_count,
        record.warning_count()
    );
    Ok(record)
}
