//! Tests for merging scan file motor tables into header information

use super::*;
use crate::app::models::HeaderInfo;
use crate::app::services::data_header::{FlyingStep, apply_motor_table, parse_flying_descriptor};
use crate::app::services::scan_file::ScanFile;
use crate::app::services::subpath_remap::SubpathRemapper;
use crate::app::services::data_header::parse_data_header;
use crate::error::Strictness;
use crate::Error;

fn table_from(content: &str, file_number: u32) -> crate::app::services::scan_file::ScanTable {
    let lines = content.lines().map(str::to_string).collect();
    ScanFile::from_lines(std::path::Path::new("scan.txt"), lines)
        .motor_table(file_number)
        .unwrap()
        .unwrap()
}

fn scan_with_malformed_step() -> String {
    [
        "Flying Beamline Energy(700, 730)",
        "EPU Polarization\tSample X\t",
        "0\t1.5\tflying(700,710,0.5,0.2)",
        "0\t1.5\t710,720,0.5",
        "0\t1.5\tFLYING (720, 730, 0.5, 0.2)",
    ]
    .join("\n")
}

#[test]
fn test_parse_flying_descriptor() {
    assert_eq!(
        parse_flying_descriptor("flying(700,710,0.5,0.2)").unwrap(),
        FlyingStep {
            first: 700.0,
            last: 710.0,
            step: 0.5,
            velocity: Some(0.2),
        }
    );
    assert_eq!(
        parse_flying_descriptor(" Flying ( 1, 2, 0.1 ) ").unwrap().velocity,
        None
    );
}

#[test]
fn test_parse_flying_descriptor_errors() {
    assert!(parse_flying_descriptor("").unwrap_err().contains("missing"));
    assert!(parse_flying_descriptor("700,710,0.5")
        .unwrap_err()
        .contains("not of the form"));
    assert!(parse_flying_descriptor("flying(700,abc,0.5)")
        .unwrap_err()
        .contains("'abc'"));
    assert!(parse_flying_descriptor("flying(700,710)")
        .unwrap_err()
        .contains("expected 3 or 4"));
}

#[test]
fn test_malformed_flying_step_is_one_warning() {
    let table = table_from(&scan_with_malformed_step(), 1);
    let mut info = HeaderInfo::default();

    apply_motor_table(&mut info, &table, "scan.txt", 1, Strictness::Lenient).unwrap();

    assert_eq!(info.warnings.len(), 1);
    assert_eq!(info.warnings[0].step_number, Some(2));
    assert_eq!(info.warnings[0].file_number, Some(1));
    assert!(info.warnings[0].message().contains("step number 2"));

    // Remaining steps still parse, and the sequences stay aligned
    assert_eq!(info.motor_first, vec![700.0, 720.0]);
    assert_eq!(info.motor_last, vec![710.0, 730.0]);
    assert_eq!(info.motor_step, vec![0.5, 0.5]);
    assert_eq!(info.motor_velocity, vec![0.2, 0.2]);

    assert_eq!(info.motors, vec!["EPU Polarization", "Sample X"]);
    assert_eq!(info.motor_values.len(), info.motors.len());
    assert_eq!(info.motor_values[1], vec![1.5, 1.5, 1.5]);
}

#[test]
fn test_mixed_flying_descriptors_keep_velocity_aligned() {
    let table = table_from(
        "Flying Beamline Energy(700, 730)\n\
         EPU Polarization\t\n\
         0\tflying(700,710,0.5)\n\
         0\tflying(710,720,0.5,0.2)\n\
         0\tflying(720,730,0.5)",
        1,
    );
    let mut info = HeaderInfo::default();

    apply_motor_table(&mut info, &table, "scan.txt", 1, Strictness::Lenient).unwrap();

    assert_eq!(info.motor_first, vec![700.0, 710.0, 720.0]);
    assert_eq!(info.motor_velocity.len(), info.motor_first.len());
    assert!(info.motor_velocity[0].is_nan());
    assert_eq!(info.motor_velocity[1], 0.2);
    assert!(info.motor_velocity[2].is_nan());
}

#[test]
fn test_velocity_empty_without_four_value_descriptors() {
    let table = table_from(
        "Flying Beamline Energy(700, 720)\nEPU Polarization\t\n0\tflying(700,710,0.5)\n0\tflying(710,720,0.5)",
        1,
    );
    let mut info = HeaderInfo::default();

    apply_motor_table(&mut info, &table, "scan.txt", 1, Strictness::Lenient).unwrap();

    assert_eq!(info.motor_first.len(), 2);
    assert!(info.motor_velocity.is_empty());
}

#[test]
fn test_repaired_table_is_flagged_on_header() {
    let table = table_from(
        "Flying Beamline Energy(700, 720)\n\
         EPU Polarization\tSample X\n\
         0\t1.5\tflying(700,710,0.5)\n\
         90\t1.5\tflying(710,720,0.5)",
        1,
    );
    let mut info = HeaderInfo::default();

    apply_motor_table(&mut info, &table, "scan.txt", 1, Strictness::Lenient).unwrap();

    assert!(info.repaired);
    assert_eq!(info.motors, vec!["EPU Polarization", "Sample X"]);
    assert_eq!(info.motor_first, vec![700.0, 710.0]);

    let clean = table_from(&scan_with_malformed_step(), 1);
    let mut info = HeaderInfo::default();
    apply_motor_table(&mut info, &clean, "scan.txt", 1, Strictness::Lenient).unwrap();
    assert!(!info.repaired);
}

#[test]
fn test_malformed_flying_step_strict_raises() {
    let table = table_from(&scan_with_malformed_step(), 1);
    let mut info = HeaderInfo::default();

    let err = apply_motor_table(&mut info, &table, "scan.txt", 1, Strictness::Strict).unwrap_err();

    match err {
        Error::ScanFileRow(issue) => {
            assert_eq!(issue.step_number, Some(2));
            assert_eq!(issue.scan_file_path, "scan.txt");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(info.warnings.is_empty());
}

#[test]
fn test_non_numeric_motor_value_becomes_nan() {
    let table = table_from("Motor X\tMotor Y\n1\t2\nabc\t\n3\t4", 1);
    let mut info = HeaderInfo::default();

    apply_motor_table(&mut info, &table, "scan.txt", 1, Strictness::Lenient).unwrap();

    assert!(!info.flying);
    assert_eq!(info.motors, vec!["Motor X", "Motor Y"]);
    assert_eq!(info.motor_values[0][0], 1.0);
    assert!(info.motor_values[0][1].is_nan());
    assert!(info.motor_values[1][1].is_nan());
    // Only the non-numeric cell is reported; the empty one is an omitted value
    assert_eq!(info.warnings.len(), 1);
    assert_eq!(info.warnings[0].step_number, Some(2));
}

#[test]
fn test_trajectory_strictness_flows_through_parse() {
    let dir = temp_dir();
    let scan_path = write_file(dir.path(), "energy.txt", &scan_with_malformed_step());
    let data_path = write_file(
        dir.path(),
        "TrajScan0004.txt",
        &trajectory_data(&scan_path.to_string_lossy()),
    );
    let remapper = SubpathRemapper::default();

    let info = parse_data_header(&data_path, &remapper, Strictness::Lenient).unwrap();
    assert_eq!(info.warnings.len(), 1);
    assert_eq!(info.motor_first.len(), 2);

    let err = parse_data_header(&data_path, &remapper, Strictness::Strict).unwrap_err();
    assert!(matches!(err, Error::ScanFileRow(ref issue) if issue.step_number == Some(2)));
}
