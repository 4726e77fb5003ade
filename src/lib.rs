//! BCS Ingest Library
//!
//! Reads ASCII exports of the Beamline Control System (BCS) and rebuilds
//! structured metadata plus a tabular payload from them.
//!
//! This library provides tools for:
//! - Decoding scan, file and repeat numbers from data file names
//! - Parsing data file headers into a [`HeaderInfo`] record
//! - Locating the motor-position sub-scan inside a referenced scan file
//! - Repairing scan file tables that lost a trailing delimiter
//! - Reading the data table and JSON sidecar of each data file
//! - Finding data files by acquisition date

pub mod config;
pub mod constants;
pub mod error;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod automation_run;
        pub mod data_header;
        pub mod data_table;
        pub mod discovery;
        pub mod ingest;
        pub mod path_codec;
        pub mod scan_file;
        pub mod subpath_remap;
    }
    pub mod adapters {
        pub mod filesystem;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{FileIdentity, FileKind, HeaderInfo, ScanType};
pub use app::services::data_header::parse_data_header;
pub use app::services::ingest::{IngestOptions, IngestRecord, ingest_data_file};
pub use app::services::path_codec::{classify_file, decode_file_identity};
pub use app::services::scan_file::ScanFile;
pub use app::services::subpath_remap::{SubpathRemapper, SubpathRule};
pub use config::Config;
pub use error::{Error, Result, ScanFileRowIssue, Strictness};
