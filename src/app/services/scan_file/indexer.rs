//! Header and sub-scan location within scan files
//!
//! A scan file names its motors on a header line and lists one row of motor
//! positions per step below it. Files driving several output files split the
//! rows into sub-scans, each introduced by a `File ...` marker line:
//!
//! ```text
//! Flying Beamline Energy(...)       <- optional description line
//! Motor X<TAB>Motor Y<TAB>          <- header line
//! File 1
//! 0<TAB>1<TAB>flying(...)
//! File 2
//! ...
//! ```

use crate::app::models::ScanFileLocation;
use crate::constants::{COMMENT_MARKER, SUB_SCAN_MARKER};
use tracing::debug;

/// Whether a line is blank or a `#` comment
pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER)
}

/// Whether a line starts a new sub-scan (`File ...`, case-insensitive)
pub fn is_sub_scan_marker(line: &str) -> bool {
    line.get(..SUB_SCAN_MARKER.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(SUB_SCAN_MARKER))
}

/// Whether a line is the first line following a scan file header
///
/// Digit-leading rows, negative numbers and sub-scan markers all qualify.
fn follows_header(line: &str) -> bool {
    let mut chars = line.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        Some(_) => is_sub_scan_marker(line),
        None => false,
    }
}

/// Locate the zero-based header line of a scan file
///
/// The header is the line before the first data row or sub-scan marker,
/// stepping back over any blank or comment lines that directly precede that
/// row. Returns `None` when no such row exists or it has nothing above it.
pub fn find_header_line(lines: &[String]) -> Option<usize> {
    let mut skipped_run = 0usize;

    for (linenum, line) in lines.iter().enumerate() {
        if is_blank_or_comment(line) {
            skipped_run += 1;
            continue;
        }
        if follows_header(line) {
            let header_line = linenum.checked_sub(1 + skipped_run);
            debug!(
                "Scan header search: first row at line {}, {} skipped lines, header {:?}",
                linenum, skipped_run, header_line
            );
            return header_line;
        }
        skipped_run = 0;
    }

    None
}

/// Result of one pass over the sub-scans of a file
struct SubScanPass {
    range: Option<(usize, usize)>,
    sub_scan_count: u32,
}

fn scan_sub_scans(lines: &[String], header_line: usize, file_number: u32) -> SubScanPass {
    let mut sub_scan = 1u32;
    let mut has_content = false;
    let mut first = header_line + 1;
    let mut range = None;

    for (linenum, line) in lines.iter().enumerate().skip(header_line + 1) {
        if is_sub_scan_marker(line) {
            // An empty sub-scan (e.g. the one before a leading "File 1") does not count
            if has_content {
                sub_scan += 1;
                has_content = false;
            }
            if sub_scan == file_number {
                first = linenum + 1;
                range = None;
            } else if sub_scan > file_number {
                return SubScanPass {
                    range,
                    sub_scan_count: sub_scan,
                };
            }
            continue;
        }

        if !has_content && line.trim().is_empty() {
            if sub_scan == file_number {
                first = linenum + 1;
            }
            continue;
        }

        has_content = true;
        if sub_scan == file_number {
            range = Some((first, linenum));
        }
    }

    let sub_scan_count = if has_content { sub_scan } else { sub_scan - 1 };
    SubScanPass {
        range,
        sub_scan_count,
    }
}

/// Locate the rows of a one-based output file number below `header_line`
///
/// File numbers past the last sub-scan wrap around modulo the sub-scan count,
/// with a remainder of zero selecting the last sub-scan. Returns `None` when
/// the requested sub-scan is empty or the file has no rows at all.
pub fn locate_sub_scan(
    lines: &[String],
    header_line: usize,
    file_number: u32,
) -> Option<ScanFileLocation> {
    let mut requested = file_number.max(1);

    // The second pass always runs with an in-range file number
    for _ in 0..2 {
        let pass = scan_sub_scans(lines, header_line, requested);

        if pass.sub_scan_count > 0 && requested > pass.sub_scan_count {
            let wrapped = requested % pass.sub_scan_count;
            let wrapped = if wrapped == 0 {
                pass.sub_scan_count
            } else {
                wrapped
            };
            debug!(
                "File number {} exceeds {} sub-scans, using {}",
                requested, pass.sub_scan_count, wrapped
            );
            requested = wrapped;
            continue;
        }

        return pass.range.map(|(first_line, last_line)| ScanFileLocation {
            header_line,
            first_line,
            last_line,
        });
    }

    None
}
