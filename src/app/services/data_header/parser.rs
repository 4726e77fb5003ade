//! Line-by-line scanner for data file headers

use super::motor_table::apply_motor_table;
use super::state::{LineOutcome, PendingCapture, TimeScanStep};
use crate::app::adapters::filesystem::open_lines;
use crate::app::models::{HeaderInfo, RepeatNumber, ScanType};
use crate::app::services::path_codec::decode_file_identity;
use crate::app::services::scan_file::ScanFile;
use crate::app::services::subpath_remap::SubpathRemapper;
use crate::constants::{HEADER_DATE_FORMATS, SCAN_FILE_PATH_PLACEHOLDER, header_keywords as kw};
use crate::error::{ScanFileRowIssue, Strictness, report_row_issue};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Parse the header of a BCS data file
///
/// For trajectory scans the referenced scan file is resolved through
/// `remapper` and its motor table is merged into the result.
pub fn parse_data_header(
    path: &Path,
    remapper: &SubpathRemapper,
    strictness: Strictness,
) -> Result<HeaderInfo> {
    let lines = open_lines(path)
        .map_err(|e| Error::io(format!("Failed to open data file {}", path.display()), e))?;

    let mut parser = DataHeaderParser::new(path, remapper, strictness);
    for (index, line) in lines.enumerate() {
        let line = line
            .map_err(|e| Error::io(format!("Failed to read data file {}", path.display()), e))?;
        if parser.feed(index, &line)? == LineOutcome::Boundary {
            break;
        }
    }

    Ok(parser.finish())
}

/// Header scanner state for one data file
///
/// Lines are fed in order with [`DataHeaderParser::feed`] until it reports
/// the data table boundary.
#[derive(Debug)]
pub struct DataHeaderParser<'a> {
    path: &'a Path,
    remapper: &'a SubpathRemapper,
    strictness: Strictness,
    info: HeaderInfo,
    pending: PendingCapture,
    time_scan: Option<TimeScanStep>,
}

impl<'a> DataHeaderParser<'a> {
    pub fn new(path: &'a Path, remapper: &'a SubpathRemapper, strictness: Strictness) -> Self {
        Self {
            path,
            remapper,
            strictness,
            info: HeaderInfo::default(),
            pending: PendingCapture::None,
            time_scan: None,
        }
    }

    /// Header information gathered so far
    pub fn info(&self) -> &HeaderInfo {
        &self.info
    }

    pub fn finish(self) -> HeaderInfo {
        self.info
    }

    /// Consume one line with its zero-based index
    pub fn feed(&mut self, index: usize, line: &str) -> Result<LineOutcome> {
        // A data row ends an unresolved scan file reference
        if self.pending == PendingCapture::ScanFilePath && starts_with_digit(line) {
            debug!("No scan file path in {}", self.path.display());
            self.pending = PendingCapture::None;
        }

        if self.pending != PendingCapture::None {
            self.capture(line)?;
            return Ok(LineOutcome::Continue);
        }

        if starts_with_digit(line) {
            return self.numeric_line(index, line);
        }

        self.keyword_line(index, line)?;
        Ok(LineOutcome::Continue)
    }

    fn capture(&mut self, line: &str) -> Result<()> {
        match self.pending {
            PendingCapture::None => {}
            PendingCapture::MotorName => {
                self.info.motors.push(line.trim().to_string());
                self.pending = PendingCapture::None;
            }
            PendingCapture::PauseMotorName => {
                self.info.pause_motor = Some(line.trim().to_string());
                self.pending = PendingCapture::ScanFilePath;
            }
            PendingCapture::ScanFilePath => {
                let raw = line.trim_end();
                if raw.trim().is_empty() || raw.trim() == SCAN_FILE_PATH_PLACEHOLDER {
                    return Ok(());
                }
                self.pending = PendingCapture::None;
                let scan_file_path = raw.replace('\\', "/");
                self.info.scan_file_path = Some(scan_file_path.clone());
                self.resolve_scan_file(&scan_file_path)?;
            }
            PendingCapture::Memo => {
                self.info.memo = Some(line.trim_end().to_string());
                self.pending = PendingCapture::None;
            }
        }
        Ok(())
    }

    fn numeric_line(&mut self, index: usize, line: &str) -> Result<LineOutcome> {
        if index == 1 && self.time_scan.is_none() {
            self.info.set_scan_type(ScanType::Time);
            self.time_scan = Some(TimeScanStep::MemoLength);
        }

        match self.time_scan {
            Some(step) if step.is_active() => {
                self.time_scan_line(step, index, line)?;
                Ok(LineOutcome::Continue)
            }
            _ => {
                self.info.motor_header_linenum = index.checked_sub(1);
                debug!(
                    "Header of {} ends before line {}",
                    self.path.display(),
                    index
                );
                Ok(LineOutcome::Boundary)
            }
        }
    }

    fn time_scan_line(&mut self, step: TimeScanStep, index: usize, line: &str) -> Result<()> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let mut next = step.next();

        match step {
            TimeScanStep::MemoLength => {
                let length = self.parse_field::<i64>(index, "Memo Length", field(&fields, 0))?;
                // Stored as the memo length minus one, so 0 is a one character memo
                if length >= 0 {
                    self.pending = PendingCapture::Memo;
                    next = TimeScanStep::Samples;
                }
            }
            TimeScanStep::Memo => {
                self.info.memo = Some(line.trim_end().to_string());
            }
            TimeScanStep::Samples => {
                self.info.num_samples =
                    Some(self.parse_field::<u64>(index, "Number of Samples", field(&fields, 0))?);
            }
            TimeScanStep::Acquire => {
                let period = self.parse_field::<f64>(index, "Period (s)", field(&fields, 1))?;
                let count = self.parse_field::<f64>(index, "Count Time (s)", field(&fields, 4))?;
                self.info.delay_sec = Some((period - count).max(0.0));
                self.info.count_sec = Some(count);
            }
            TimeScanStep::Done => {}
        }

        self.time_scan = Some(next);
        Ok(())
    }

    fn keyword_line(&mut self, index: usize, line: &str) -> Result<()> {
        if let Some(value) = line.strip_prefix(kw::DATE) {
            self.info.date = Some(self.parse_date(index, value)?);
        } else if line.starts_with(kw::FLYING_SCAN) {
            self.info.flying = true;
            self.info.set_scan_type(ScanType::SingleMotor);
            self.pending = PendingCapture::MotorName;
        } else if line.starts_with(kw::START_STOP_INCREMENT) {
            self.info.set_scan_type(ScanType::SingleMotor);
            self.pending = PendingCapture::MotorName;
        } else if line.starts_with(kw::FROM_FILE) {
            self.info.set_scan_type(ScanType::Trajectory);
            self.pending = PendingCapture::PauseMotorName;
        } else if let Some(value) = line.strip_prefix(kw::START) {
            let value = self.parse_field::<f64>(index, kw::START, value)?;
            self.info.motor_first = vec![value];
        } else if let Some(value) = line.strip_prefix(kw::STOP) {
            let value = self.parse_field::<f64>(index, kw::STOP, value)?;
            self.info.motor_last = vec![value];
        } else if let Some(value) = line.strip_prefix(kw::INCREMENT) {
            let value = self.parse_field::<f64>(index, kw::INCREMENT, value)?;
            self.info.motor_step = vec![value];
        } else if let Some(value) = line.strip_prefix(kw::X_CENTER) {
            let value = self.parse_field::<f64>(index, kw::X_CENTER, value)?;
            self.info.motor_velocity = vec![value];
        } else if let Some(value) = line.strip_prefix(kw::DELAY_AFTER_MOVE) {
            self.info.delay_sec = Some(self.parse_field::<f64>(index, kw::DELAY_AFTER_MOVE, value)?);
        } else if let Some(value) = line.strip_prefix(kw::COUNT_TIME) {
            self.info.count_sec = Some(self.parse_field::<f64>(index, kw::COUNT_TIME, value)?);
        } else if let Some(value) = line.strip_prefix(kw::SCAN_NUMBER) {
            self.info.repeat_number = Some(RepeatNumber::parse(value));
        } else if let Some(value) = line.strip_prefix(kw::BI_DIRECTIONAL) {
            self.info.bidirect = is_yes(value);
        } else if let Some(value) = line.strip_prefix(kw::STAY_AT_END) {
            self.info.stay_at_end = is_yes(value);
        } else if let Some(value) = line.strip_prefix(kw::DESCRIPTION_LENGTH) {
            let length = self.parse_field::<i64>(index, kw::DESCRIPTION_LENGTH, value)?;
            if length != 0 {
                self.pending = PendingCapture::Memo;
            }
        }

        Ok(())
    }

    fn resolve_scan_file(&mut self, scan_file_path: &str) -> Result<()> {
        let remapped = self.remapper.apply(scan_file_path);
        let resolved = PathBuf::from(&remapped);
        if !resolved.is_file() {
            return Err(Error::scan_file_not_found(
                remapped,
                self.path.to_string_lossy(),
            ));
        }

        let file_number = match decode_file_identity(self.path) {
            Ok(identity) => identity.file_number(),
            Err(e) => {
                debug!("{}; using output file 1", e);
                1
            }
        };
        info!(
            "Resolving motor table for {} from {} (output file {})",
            self.path.display(),
            remapped,
            file_number
        );

        let scan_file = ScanFile::open(&resolved)?;
        match scan_file.motor_table(file_number)? {
            Some(table) => apply_motor_table(
                &mut self.info,
                &table,
                &remapped,
                file_number,
                self.strictness,
            ),
            None => {
                let issue = ScanFileRowIssue::new(
                    &remapped,
                    format!("No motor positions found for output file {}", file_number),
                )
                .with_file_number(file_number);
                report_row_issue(issue, self.strictness, &mut self.info.warnings)
            }
        }
    }

    fn parse_field<T: std::str::FromStr>(&self, index: usize, field: &str, value: &str) -> Result<T> {
        value.trim().parse::<T>().map_err(|_| {
            Error::invalid_header_value(
                self.path.to_string_lossy(),
                index + 1,
                field.trim_end_matches(':'),
                value.trim(),
            )
        })
    }

    fn parse_date(&self, index: usize, value: &str) -> Result<NaiveDate> {
        let value = value.trim();
        HEADER_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
            .ok_or_else(|| {
                Error::invalid_header_value(self.path.to_string_lossy(), index + 1, "Date", value)
            })
    }
}

fn starts_with_digit(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn field<'s>(fields: &[&'s str], position: usize) -> &'s str {
    fields.get(position).copied().unwrap_or("")
}

fn is_yes(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}
