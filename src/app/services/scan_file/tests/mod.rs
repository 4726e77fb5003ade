//! Test utilities for scan file indexing and table reading

use std::io::Write;
use tempfile::NamedTempFile;

mod indexer_tests;

/// Split fixture text into lines the way the file reader does
pub fn lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}

/// Scan file with a flying motor and three sub-scans, the third preceded by a blank line
pub fn create_multi_file_scan() -> String {
    [
        "Flying Beamline Energy(700, 720)",
        "EPU Polarization\tSample X\t",
        "File 1",
        "0\t1.5\tflying(700,710,0.5,0.2)",
        "0\t1.5\tflying(710,720,0.5,0.2)",
        "File 2",
        "90\t1.5\tflying(700,720,1)",
        "File 3",
        "",
        "0\t2.5\tflying(700,710,0.5)",
        "90\t2.5\tflying(710,720,0.5)",
    ]
    .join("\n")
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file
}
