//! Filesystem access for BCS files
//!
//! BCS exports are written on Windows instrument PCs and may contain bytes
//! that are not valid UTF-8 (degree signs, micro signs). Lines are decoded
//! lossily and stripped of their `\r\n` / `\n` terminators.

use crate::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Iterator over the decoded lines of an open file
///
/// The file handle is released when the iterator is dropped, including when
/// a caller stops early or returns an error mid-scan.
pub struct LossyLines {
    reader: BufReader<File>,
    buffer: Vec<u8>,
}

impl Iterator for LossyLines {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                if self.buffer.ends_with(b"\n") {
                    self.buffer.pop();
                }
                if self.buffer.ends_with(b"\r") {
                    self.buffer.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buffer).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Open a file for line-by-line scanning
pub fn open_lines(path: &Path) -> std::io::Result<LossyLines> {
    let file = File::open(path)?;
    Ok(LossyLines {
        reader: BufReader::new(file),
        buffer: Vec::new(),
    })
}

/// Read every line of a file
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let lines = open_lines(path)
        .and_then(|lines| lines.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Creation and modification times of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTimestamps {
    /// Birth time where the platform records one, otherwise the modification time
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl FileTimestamps {
    pub fn read(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| Error::io(format!("Failed to stat {}", path.display()), e))?;
        let modified = metadata
            .modified()
            .map_err(|e| Error::io(format!("No modification time for {}", path.display()), e))?;
        let created = metadata.created().unwrap_or(modified);

        Ok(Self {
            created: DateTime::<Utc>::from(created),
            modified: DateTime::<Utc>::from(modified),
        })
    }

    /// Render a timestamp in `zone`
    pub fn format<Z>(timestamp: DateTime<Utc>, zone: &Z, format: &str) -> String
    where
        Z: TimeZone,
        Z::Offset: std::fmt::Display,
    {
        timestamp.with_timezone(zone).format(format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_lines_strips_terminators() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"Date: 05/12/2021\r\nStart: 0\n\nlast").unwrap();

        let lines = read_lines(temp_file.path()).unwrap();

        assert_eq!(lines, vec!["Date: 05/12/2021", "Start: 0", "", "last"]);
    }

    #[test]
    fn test_read_lines_decodes_invalid_utf8() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"Temp (\xb0C)\t1\n").unwrap();

        let lines = read_lines(temp_file.path()).unwrap();

        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Temp ("));
        assert!(lines[0].ends_with("C)\t1"));
    }

    #[test]
    fn test_read_lines_missing_file() {
        let err = read_lines(Path::new("/nonexistent/scan.txt")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_timestamps_and_format() {
        let temp_file = NamedTempFile::new().unwrap();
        let timestamps = FileTimestamps::read(temp_file.path()).unwrap();
        assert!(timestamps.modified.timestamp() > 0);
        assert!(timestamps.created.timestamp() > 0);

        let instant = Utc.with_ymd_and_hms(2021, 1, 12, 20, 30, 0).unwrap();
        let offset = FixedOffset::west_opt(8 * 3600).unwrap();
        assert_eq!(
            FileTimestamps::format(instant, &offset, "%Y-%m-%d %H:%M:%S [%z]"),
            "2021-01-12 12:30:00 [-0800]"
        );
    }

    #[test]
    fn test_format_follows_daylight_saving() {
        let zone = chrono_tz::America::Los_Angeles;
        let summer = Utc.with_ymd_and_hms(2021, 5, 12, 20, 30, 0).unwrap();
        let winter = Utc.with_ymd_and_hms(2021, 12, 12, 20, 30, 0).unwrap();

        assert_eq!(
            FileTimestamps::format(summer, &zone, "%Y-%m-%d %H:%M:%S [%z]"),
            "2021-05-12 13:30:00 [-0700]"
        );
        assert_eq!(
            FileTimestamps::format(winter, &zone, "%Y-%m-%d %H:%M:%S [%z]"),
            "2021-12-12 12:30:00 [-0800]"
        );
    }
}
