//! Application constants for BCS ingestion
//!
//! This module contains the header keywords, file naming tokens, MIME tags
//! and default values used throughout the parser and the CLI.

// =============================================================================
// Data File Header Keywords
// =============================================================================

/// Keywords recognized on data file header lines
///
/// Order matters where one keyword is a prefix of another: the parser checks
/// the longer keyword first (e.g. `Start, Stop, Increment` before `Start:`).
pub mod header_keywords {
    pub const DATE: &str = "Date:";
    pub const FLYING_SCAN: &str = "Flying Scan";
    pub const START_STOP_INCREMENT: &str = "Start, Stop, Increment";
    pub const FROM_FILE: &str = "From File";
    pub const START: &str = "Start:";
    pub const STOP: &str = "Stop:";
    pub const INCREMENT: &str = "Increment:";
    /// Repurposed by the instrument as the flying motor velocity
    pub const X_CENTER: &str = "X Center:";
    pub const DELAY_AFTER_MOVE: &str = "Delay After Move (s):";
    pub const COUNT_TIME: &str = "Count Time (s):";
    pub const SCAN_NUMBER: &str = "Scan Number:";
    pub const BI_DIRECTIONAL: &str = "Bi-directional:";
    pub const STAY_AT_END: &str = "Stay at End:";
    pub const DESCRIPTION_LENGTH: &str = "Description Length:";
}

/// Date formats found on `Date:` header lines, tried in order
pub const HEADER_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"];

/// Scan-file path placeholder written by newer firmware before the real path
pub const SCAN_FILE_PATH_PLACEHOLDER: &str = "All Magnets";

// =============================================================================
// Scan File Conventions
// =============================================================================

/// Field delimiter used by both data files and scan files
pub const FIELD_DELIMITER: u8 = b'\t';

/// Prefix given to columns whose header cell is empty
pub const UNNAMED_COLUMN_PREFIX: &str = "Unnamed: ";

/// Leading marker for comment rows in scan files
pub const COMMENT_MARKER: char = '#';

/// Case-insensitive marker that starts a new sub-scan in a scan file
pub const SUB_SCAN_MARKER: &str = "file";

/// Remediation hint appended to every scan file row message
pub const ROW_ISSUE_HINT: &str =
    " Check for missing values, spaces instead of tabs, or extra header rows.";

// =============================================================================
// File Naming and Classification
// =============================================================================

/// Token that precedes the scan number in a data file name
pub const SCAN_TOKEN: &str = "Scan";

/// Extension of BCS ASCII exports
pub const DATA_FILE_EXTENSION: &str = "txt";

/// Extension of the optional JSON sidecar written next to a data file
pub const SIDECAR_EXTENSION: &str = "json";

/// MIME tags assigned by file classification
pub mod mime_types {
    pub const TRAJ_SCAN: &str = "text/x-bcs-traj-scan";
    pub const SIG_SCAN: &str = "text/x-bcs-sig-scan";
    pub const MOT_SCAN: &str = "text/x-bcs-mot-scan";
    pub const TIME_SCAN: &str = "text/x-bcs-time-scan";
    pub const SINGLE_MOTOR_SCAN: &str = "text/x-bcs-single-motor-scan";
    pub const TRAJECTORY_SCAN: &str = "text/x-bcs-trajectory-scan";
    pub const BEAMLINE_TIME_SCAN: &str = "text/x-bcs-beamline-time-scan";
    pub const AUTOMATION_RUN: &str = "text/x-bcs-automation-run";
}

// =============================================================================
// Discovery and Processing Defaults
// =============================================================================

/// Default file base used by date-range discovery
pub const DEFAULT_DATA_FILE_BASE: &str = "TrajScan";

/// Number of days searched when no first date is given
pub const DEFAULT_SEARCH_DAYS: i64 = 7;

/// Format of timestamps rendered for output records
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S [%z]";

/// IANA zone used to render timestamps (beamline local time)
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Configuration directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "bcs-ingest";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overrides
pub mod env_vars {
    pub const STRICT: &str = "BCS_INGEST_STRICT";
    pub const WORKERS: &str = "BCS_INGEST_WORKERS";
    pub const DATA_PATH: &str = "BCS_INGEST_DATA_PATH";
    pub const TIMEZONE: &str = "BCS_INGEST_TIMEZONE";
}
