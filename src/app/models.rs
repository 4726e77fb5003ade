//! Data models for BCS ingestion
//!
//! This module contains the structures reconstructed from BCS data files and
//! the scan files they reference. Every value here is built fresh for one
//! data file and discarded once its record has been emitted.

use crate::constants::mime_types;
use crate::error::ScanFileRowIssue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// File Identity
// =============================================================================

/// Numeric identifiers encoded in a data file name
///
/// `XxxxScan0007-0003_0002.txt` decodes to scan 7, repeat 3, file 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity {
    pub scan: u32,
    pub file: Option<u32>,
    pub repeat: Option<u32>,
}

impl FileIdentity {
    /// One-based output file number used to index sub-scans
    pub fn file_number(&self) -> u32 {
        self.file.unwrap_or(1)
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scan {}", self.scan)?;
        if let Some(repeat) = self.repeat {
            write!(f, ", repeat {}", repeat)?;
        }
        if let Some(file) = self.file {
            write!(f, ", file {}", file)?;
        }
        Ok(())
    }
}

/// Kind of BCS export, determined from the file name prefix and extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    TrajScan,
    SigScan,
    MotScan,
    TimeScan,
    SingleMotorScan,
    TrajectoryScan,
    BeamlineTimeScan,
    AutomationRun,
}

impl FileKind {
    /// Filename prefixes, longest first so that `Trajectory Scan` wins over shorter tokens
    pub const PREFIXES: &'static [(&'static str, FileKind)] = &[
        ("Single Motor Scan", FileKind::SingleMotorScan),
        ("Trajectory Scan", FileKind::TrajectoryScan),
        ("Automation Run", FileKind::AutomationRun),
        ("Time Scan", FileKind::BeamlineTimeScan),
        ("TrajScan", FileKind::TrajScan),
        ("TimeScan", FileKind::TimeScan),
        ("SigScan", FileKind::SigScan),
        ("MotScan", FileKind::MotScan),
    ];

    /// MIME tag for this kind of file
    pub fn mime_type(&self) -> &'static str {
        match self {
            FileKind::TrajScan => mime_types::TRAJ_SCAN,
            FileKind::SigScan => mime_types::SIG_SCAN,
            FileKind::MotScan => mime_types::MOT_SCAN,
            FileKind::TimeScan => mime_types::TIME_SCAN,
            FileKind::SingleMotorScan => mime_types::SINGLE_MOTOR_SCAN,
            FileKind::TrajectoryScan => mime_types::TRAJECTORY_SCAN,
            FileKind::BeamlineTimeScan => mime_types::BEAMLINE_TIME_SCAN,
            FileKind::AutomationRun => mime_types::AUTOMATION_RUN,
        }
    }

    /// Automation runs list other scans and are read by a separate reader
    pub fn is_automation_run(&self) -> bool {
        matches!(self, FileKind::AutomationRun)
    }
}

// =============================================================================
// Header Information
// =============================================================================

/// Scan type of a data file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanType {
    SingleMotor,
    Trajectory,
    Time,
    #[default]
    Unknown,
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanType::SingleMotor => "Single Motor",
            ScanType::Trajectory => "Trajectory",
            ScanType::Time => "Time",
            ScanType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Value of the `Scan Number:` header line
///
/// Summary files carry labels such as `Avg` or `Sum` instead of a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepeatNumber {
    Number(i64),
    Label(String),
}

impl RepeatNumber {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        value
            .parse::<i64>()
            .map(RepeatNumber::Number)
            .unwrap_or_else(|_| RepeatNumber::Label(value.to_string()))
    }
}

/// Metadata reconstructed from a data file header
///
/// `motor_first`, `motor_last` and `motor_step` are index-aligned, and
/// `motor_velocity` is either empty or aligned with them. For single motor
/// scans they hold one entry for the scanned motor; for flying trajectory
/// scans they hold one entry per step of the flying motor. `motor_values` holds one row per entry of `motors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub scan_type: ScanType,
    pub date: Option<NaiveDate>,
    pub flying: bool,
    /// Continuously swept motor declared by the scan file, if any
    pub flying_motor: Option<String>,
    pub motors: Vec<String>,
    pub pause_motor: Option<String>,
    pub motor_first: Vec<f64>,
    pub motor_last: Vec<f64>,
    pub motor_step: Vec<f64>,
    pub motor_velocity: Vec<f64>,
    /// Motor positions, motor × step; omitted values are NaN
    pub motor_values: Vec<Vec<f64>>,
    pub delay_sec: Option<f64>,
    pub count_sec: Option<f64>,
    pub repeat_number: Option<RepeatNumber>,
    pub bidirect: bool,
    pub stay_at_end: bool,
    pub memo: Option<String>,
    /// Time scans only
    pub num_samples: Option<u64>,
    /// Scan file path as written in the data file, before remapping
    pub scan_file_path: Option<String>,
    /// Zero-based line index of the data table header row
    pub motor_header_linenum: Option<usize>,
    /// Set when the scan file table needed a missing delimiter repaired
    #[serde(default)]
    pub repaired: bool,
    /// Row-level issues recorded while parsing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScanFileRowIssue>,
}

impl HeaderInfo {
    /// Set the scan type unless one has already been determined
    ///
    /// Returns whether the value was applied.
    pub fn set_scan_type(&mut self, scan_type: ScanType) -> bool {
        if self.scan_type == ScanType::Unknown {
            self.scan_type = scan_type;
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Scan File Structures
// =============================================================================

/// Zero-based line indices of one sub-scan inside a scan file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanFileLocation {
    /// Line naming the motor columns
    pub header_line: usize,
    /// First line of motor positions (inclusive)
    pub first_line: usize,
    /// Last line of motor positions (inclusive)
    pub last_line: usize,
}

impl ScanFileLocation {
    /// Lines between the header and the first row that do not belong to this sub-scan
    pub fn skip_rows(&self) -> std::ops::Range<usize> {
        (self.header_line + 1)..self.first_line
    }

    /// Number of lines in the sub-scan
    pub fn row_count(&self) -> usize {
        self.last_line + 1 - self.first_line
    }
}

/// Flying motor announced on the first line of a scan file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyingMotorSpec {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_type_is_set_once() {
        let mut info = HeaderInfo::default();
        assert!(info.set_scan_type(ScanType::Trajectory));
        assert!(!info.set_scan_type(ScanType::SingleMotor));
        assert_eq!(info.scan_type, ScanType::Trajectory);
    }

    #[test]
    fn test_repeat_number_parse() {
        assert_eq!(RepeatNumber::parse("3"), RepeatNumber::Number(3));
        assert_eq!(RepeatNumber::parse(" Avg "), RepeatNumber::Label("Avg".to_string()));
    }

    #[test]
    fn test_repeat_number_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            RepeatNumber::Number(2),
            RepeatNumber::Label("Sum".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[2,"Sum"]"#);
    }

    #[test]
    fn test_scan_file_location_rows() {
        let location = ScanFileLocation {
            header_line: 1,
            first_line: 5,
            last_line: 8,
        };
        assert_eq!(location.skip_rows(), 2..5);
        assert_eq!(location.row_count(), 4);
    }

    #[test]
    fn test_file_identity_display_and_default_file_number() {
        let identity = FileIdentity {
            scan: 7,
            file: None,
            repeat: Some(3),
        };
        assert_eq!(identity.to_string(), "scan 7, repeat 3");
        assert_eq!(identity.file_number(), 1);
    }

    #[test]
    fn test_file_kind_mime_types() {
        assert_eq!(FileKind::TrajScan.mime_type(), "text/x-bcs-traj-scan");
        assert!(FileKind::AutomationRun.is_automation_run());
        assert!(!FileKind::TimeScan.is_automation_run());
    }
}
