//! Merging a scan file's motor table into header information

use crate::app::models::HeaderInfo;
use crate::app::services::scan_file::ScanTable;
use crate::error::{ScanFileRowIssue, Strictness, report_row_issue};
use crate::Result;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static FLYING_DESCRIPTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*flying\s*\((.*)\)\s*$").expect("flying descriptor pattern is valid")
});

/// Parameters of one step of a flying motor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyingStep {
    pub first: f64,
    pub last: f64,
    pub step: f64,
    pub velocity: Option<f64>,
}

/// Parse a `flying(first,last,step[,velocity])` cell
///
/// The error is a description suitable for a row issue.
pub fn parse_flying_descriptor(cell: &str) -> std::result::Result<FlyingStep, String> {
    if cell.trim().is_empty() {
        return Err("Flying motor descriptor is missing".to_string());
    }

    let inner = FLYING_DESCRIPTOR
        .captures(cell)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            format!(
                "Flying motor descriptor '{}' is not of the form flying(first,last,step[,velocity])",
                cell.trim()
            )
        })?;

    let mut values = Vec::with_capacity(4);
    for part in inner.split(',') {
        let part = part.trim();
        let value = part
            .parse::<f64>()
            .map_err(|_| format!("Flying motor value '{}' in '{}' is not numeric", part, cell.trim()))?;
        values.push(value);
    }

    match values.as_slice() {
        [first, last, step] => Ok(FlyingStep {
            first: *first,
            last: *last,
            step: *step,
            velocity: None,
        }),
        [first, last, step, velocity] => Ok(FlyingStep {
            first: *first,
            last: *last,
            step: *step,
            velocity: Some(*velocity),
        }),
        _ => Err(format!(
            "Flying motor descriptor '{}' has {} values; expected 3 or 4",
            cell.trim(),
            values.len()
        )),
    }
}

/// Copy motor names and positions from a scan table into `info`
///
/// A declared flying motor is moved out of `motors` and `motor_values` into
/// the per-step first/last/step/velocity sequences. Malformed cells are
/// routed through `strictness`; a malformed flying step is skipped whole.
pub fn apply_motor_table(
    info: &mut HeaderInfo,
    table: &ScanTable,
    scan_file_path: &str,
    file_number: u32,
    strictness: Strictness,
) -> Result<()> {
    let flying_column = table
        .flying_motor
        .as_ref()
        .and_then(|flying| table.column_index(&flying.name));

    info.motors.clear();
    info.motor_values.clear();
    info.repaired = table.repaired;

    for (column, name) in table.columns.iter().enumerate() {
        if Some(column) == flying_column {
            continue;
        }

        let mut values = Vec::with_capacity(table.len());
        for (row, cell) in table.column(column).enumerate() {
            let cell = cell.trim();
            if cell.is_empty() {
                values.push(f64::NAN);
                continue;
            }
            match cell.parse::<f64>() {
                Ok(value) => values.push(value),
                Err(_) => {
                    let issue = ScanFileRowIssue::new(
                        scan_file_path,
                        format!("Motor '{}' value '{}' is not numeric", name, cell),
                    )
                    .with_file_number(file_number)
                    .with_step_number(row + 1);
                    report_row_issue(issue, strictness, &mut info.warnings)?;
                    values.push(f64::NAN);
                }
            }
        }

        info.motors.push(name.clone());
        info.motor_values.push(values);
    }

    let (Some(column), Some(flying)) = (flying_column, table.flying_motor.as_ref()) else {
        return Ok(());
    };

    info.flying = true;
    info.flying_motor = Some(flying.name.clone());
    info.motor_first.clear();
    info.motor_last.clear();
    info.motor_step.clear();
    info.motor_velocity.clear();

    let mut velocities = Vec::with_capacity(table.len());
    for (row, cell) in table.column(column).enumerate() {
        match parse_flying_descriptor(cell) {
            Ok(step) => {
                info.motor_first.push(step.first);
                info.motor_last.push(step.last);
                info.motor_step.push(step.step);
                velocities.push(step.velocity);
            }
            Err(description) => {
                let issue = ScanFileRowIssue::new(scan_file_path, description)
                    .with_file_number(file_number)
                    .with_step_number(row + 1);
                report_row_issue(issue, strictness, &mut info.warnings)?;
            }
        }
    }

    // Velocity stays empty when no step gives one; otherwise it is aligned
    // with the other sequences and missing entries are NaN
    if velocities.iter().any(Option::is_some) {
        info.motor_velocity = velocities
            .into_iter()
            .map(|velocity| velocity.unwrap_or(f64::NAN))
            .collect();
    }

    debug!(
        "Flying motor '{}': {} of {} steps parsed",
        flying.name,
        info.motor_first.len(),
        table.len()
    );
    Ok(())
}
