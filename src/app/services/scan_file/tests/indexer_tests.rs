//! Tests for scan file header detection and sub-scan location

use super::*;
use crate::app::models::ScanFileLocation;
use crate::app::services::scan_file::{ScanFile, find_header_line, locate_sub_scan};
use crate::Error;

fn location(header_line: usize, first_line: usize, last_line: usize) -> ScanFileLocation {
    ScanFileLocation {
        header_line,
        first_line,
        last_line,
    }
}

#[test]
fn test_header_is_line_before_first_row() {
    let lines = lines("Motor X\tMotor Y\n0\t1\n1\t2");
    assert_eq!(find_header_line(&lines), Some(0));
}

#[test]
fn test_header_steps_back_over_comments_and_blanks() {
    let lines = lines("Flying Energy(700, 800)\nX\tY\t\n# operator note\n\n1\t2\tflying(700,800,1)");
    assert_eq!(find_header_line(&lines), Some(1));
}

#[test]
fn test_header_detects_negative_rows_and_file_markers() {
    assert_eq!(find_header_line(&lines("X\n-1.5")), Some(0));
    assert_eq!(find_header_line(&lines("Description\nX\tY\nFILE 1\n1\t2")), Some(1));
    assert_eq!(find_header_line(&lines("Description\nX\tY\nfile 1\n1\t2")), Some(1));
}

#[test]
fn test_header_ignores_dash_without_digit() {
    let lines = lines("Title\n-- section --\nX\tY\n5\t6");
    assert_eq!(find_header_line(&lines), Some(2));
}

#[test]
fn test_header_not_found() {
    assert_eq!(find_header_line(&lines("just text\nmore text")), None);
    // A data row on the very first line has no header above it
    assert_eq!(find_header_line(&lines("1\t2\n3\t4")), None);
    assert_eq!(find_header_line(&[]), None);
}

#[test]
fn test_single_sub_scan_without_markers() {
    let lines = lines("X\tY\n1\t2\n3\t4");
    assert_eq!(locate_sub_scan(&lines, 0, 1), Some(location(0, 1, 2)));
}

#[test]
fn test_locate_each_sub_scan() {
    let lines = lines(&create_multi_file_scan());

    assert_eq!(locate_sub_scan(&lines, 1, 1), Some(location(1, 3, 4)));
    assert_eq!(locate_sub_scan(&lines, 1, 2), Some(location(1, 6, 6)));
    // Blank line at the start of sub-scan 3 moves its first line forward
    assert_eq!(locate_sub_scan(&lines, 1, 3), Some(location(1, 9, 10)));
}

#[test]
fn test_locate_is_idempotent() {
    let lines = lines(&create_multi_file_scan());
    assert_eq!(locate_sub_scan(&lines, 1, 2), locate_sub_scan(&lines, 1, 2));
}

#[test]
fn test_locate_wraps_past_last_sub_scan() {
    let lines = lines(&create_multi_file_scan());

    assert_eq!(locate_sub_scan(&lines, 1, 5), locate_sub_scan(&lines, 1, 2));
    assert_eq!(locate_sub_scan(&lines, 1, 4), locate_sub_scan(&lines, 1, 1));
    // A remainder of zero selects the last sub-scan
    assert_eq!(locate_sub_scan(&lines, 1, 6), locate_sub_scan(&lines, 1, 3));
    assert_eq!(locate_sub_scan(&lines, 1, 3), Some(location(1, 9, 10)));
}

#[test]
fn test_file_number_zero_selects_first() {
    let lines = lines(&create_multi_file_scan());
    assert_eq!(locate_sub_scan(&lines, 1, 0), locate_sub_scan(&lines, 1, 1));
}

#[test]
fn test_trailing_empty_sub_scan_is_not_counted() {
    let mut content = create_multi_file_scan();
    content.push_str("\nFile 4");
    let lines = lines(&content);

    // Only three sub-scans have rows, so 4 wraps to 1
    assert_eq!(locate_sub_scan(&lines, 1, 4), Some(location(1, 3, 4)));
}

#[test]
fn test_no_rows_is_not_found() {
    let lines = lines("X\tY\nFile 1");
    assert_eq!(find_header_line(&lines), Some(0));
    assert_eq!(locate_sub_scan(&lines, 0, 1), None);
    assert_eq!(locate_sub_scan(&lines, 0, 7), None);
}

#[test]
fn test_scan_file_open_and_locate() {
    let temp_file = create_temp_file(&create_multi_file_scan());
    let scan_file = ScanFile::open(temp_file.path()).unwrap();

    assert_eq!(scan_file.header_line().unwrap(), 1);
    assert_eq!(scan_file.locate(2).unwrap(), Some(location(1, 6, 6)));
}

#[test]
fn test_scan_file_header_not_found_names_file() {
    let temp_file = create_temp_file("no table here\nat all\n");
    let scan_file = ScanFile::open(temp_file.path()).unwrap();

    let err = scan_file.header_line().unwrap_err();
    match err {
        Error::ScanFileHeaderNotFound { scan_file_path } => {
            assert_eq!(scan_file_path, temp_file.path().to_string_lossy());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(scan_file.locate(1).is_err());
}
