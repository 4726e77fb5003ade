//! Command-line argument definitions for the BCS ingester
//!
//! Defines the CLI surface with the clap derive API.

use crate::app::services::subpath_remap::SubpathRule;
use crate::constants::{DEFAULT_DATA_FILE_BASE, HEADER_DATE_FORMATS};
use crate::{Error, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the BCS ingester
///
/// Extracts structured metadata and tabular data from Beamline Control
/// System scan exports.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bcs-ingest",
    version,
    about = "Extract metadata and data from Beamline Control System scan exports",
    long_about = "Reads BCS ASCII data files, classifies their scan type, resolves the scan \
                  files they reference for motor positions, and emits one metadata record per \
                  data file together with its tabular payload."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest data files and print their metadata records
    Ingest(IngestArgs),
    /// List data files acquired within a date range
    Find(FindArgs),
}

/// Arguments for the ingest command
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// Data files or directories to ingest
    ///
    /// Directories are searched recursively for files with a recognized
    /// BCS name prefix and a .txt extension.
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Rewrite scan file paths before opening them
    ///
    /// May be repeated; rules apply in order after any rules from the
    /// configuration file.
    #[arg(
        long = "remap",
        value_name = "FROM=TO",
        help = "Replace FROM with TO in scan file paths (repeatable)"
    )]
    pub remap: Vec<SubpathRule>,

    /// Fail a file on the first malformed scan file row
    ///
    /// By default row-level problems are logged and attached to the record
    /// as warnings.
    #[arg(long = "strict", help = "Treat malformed scan file rows as errors")]
    pub strict: bool,

    #[arg(long = "no-sidecar", help = "Do not read JSON sidecar files")]
    pub no_sidecar: bool,

    #[arg(
        long = "format",
        value_enum,
        default_value = "summary",
        help = "Output format for ingested records"
    )]
    pub output_format: OutputFormat,

    /// Print each file's data table below its summary line
    #[arg(long = "show-data", help = "Print data tables in the summary output")]
    pub show_data: bool,

    /// Number of files ingested concurrently
    ///
    /// Defaults to the configured value, or the number of CPUs.
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of parallel workers"
    )]
    pub workers: Option<usize>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// bcs-ingest/config.toml in the user configuration directory.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Also hides the progress bar.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the find command
#[derive(Debug, Clone, Parser)]
pub struct FindArgs {
    /// First acquisition date (inclusive); defaults to one week ago
    #[arg(long = "from", value_name = "DATE", value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last acquisition date (inclusive); defaults to today
    #[arg(long = "to", value_name = "DATE", value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    #[arg(
        long = "base",
        value_name = "PREFIX",
        default_value = DEFAULT_DATA_FILE_BASE,
        help = "File name prefix to search for"
    )]
    pub file_base: String,

    #[arg(
        long = "scan",
        value_name = "N",
        help = "Scan number to match (repeatable)"
    )]
    pub scan_numbers: Vec<u32>,

    /// Root of the per-day data directories
    ///
    /// Defaults to the configured data path.
    #[arg(long = "path", value_name = "DIR", help = "Root of the data directories")]
    pub data_path: Option<PathBuf>,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Output format for ingested records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per file plus totals
    Summary,
    /// JSON array of records
    Json,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    HEADER_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value.trim(), format).ok())
        .ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD or MM/DD/YYYY)", value))
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Option<&Commands> {
        self.command.as_ref()
    }
}

impl Commands {
    pub fn get_log_level(&self) -> &'static str {
        match self {
            Commands::Ingest(args) => args.get_log_level(),
            Commands::Find(args) => args.get_log_level(),
        }
    }

    pub fn config_file(&self) -> Option<&PathBuf> {
        match self {
            Commands::Ingest(args) => args.config_file.as_ref(),
            Commands::Find(args) => args.config_file.as_ref(),
        }
    }
}

impl IngestArgs {
    /// Validate the ingest command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }
        if let Some(config_file) = &self.config_file {
            if !config_file.is_file() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl FindArgs {
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(Error::configuration(format!(
                    "First date {} is after last date {}",
                    from, to
                )));
            }
        }
        if self.file_base.is_empty() {
            return Err(Error::configuration("File base cannot be empty"));
        }
        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }
}
