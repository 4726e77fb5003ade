//! Test utilities for data header parsing

use std::path::{Path, PathBuf};
use tempfile::TempDir;

mod motor_table_tests;

/// Write a file into `dir` and return its path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Single motor scan header followed by two data rows
pub fn single_motor_data() -> String {
    [
        "Date: 05/12/2021",
        "Start, Stop, Increment",
        "Sample X",
        "Start: 0",
        "Stop: 10",
        "Increment: 1",
        "Delay After Move (s): 0.1",
        "Count Time (s): 1.5",
        "Scan Number: 2",
        "Bi-directional: No",
        "Stay at End: Yes",
        "Description Length: 0",
        "",
        "Sample X\tBeam Current\tCounter 0",
        "0\t500.1\t12",
        "1\t500.0\t15",
    ]
    .join("\n")
}

/// Trajectory scan header referencing `scan_file_path`
pub fn trajectory_data(scan_file_path: &str) -> String {
    [
        "Date: 05/12/2021",
        "From File",
        "Pause Motor",
        "",
        "All Magnets",
        scan_file_path,
        "Count Time (s): 0.5",
        "Scan Number: Avg",
        "Description Length: 12",
        "Energy sweep",
        "",
        "Time of Day\tBeamline Energy\tCounter 0",
        "0.1\t700.0\t12",
    ]
    .join("\n")
}

/// Scan file with a flying motor and two output files
pub fn flying_scan_file() -> String {
    [
        "Flying Beamline Energy(700, 720)",
        "EPU Polarization\tSample X\t",
        "File 1",
        "0\t1.5\tflying(700,710,0.5,0.2)",
        "0\t1.5\tflying(710,720,0.5,0.2)",
        "File 2",
        "90\t1.5\tflying(700,720,1)",
    ]
    .join("\n")
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}
