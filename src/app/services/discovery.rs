//! Data file discovery
//!
//! Data files are stored by acquisition date:
//!
//! ```text
//! <base>/
//!   2021/
//!     210512/
//!       TrajScan0007-0001_0001.txt
//! ```
//!
//! Older archives omit the year directory (`<base>/210512/...`).

use crate::app::services::path_codec::classify_file;
use crate::constants::{DEFAULT_DATA_FILE_BASE, DEFAULT_SEARCH_DAYS};
use crate::{Error, Result};
use chrono::{Duration, Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Date-range search criteria
#[derive(Debug, Clone)]
pub struct DateRangeQuery {
    /// Scan numbers to match; empty matches every scan
    pub scan_numbers: Vec<u32>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// File name prefix, e.g. `TrajScan` or `SigScan`
    pub data_file_base: String,
    pub data_path_base: PathBuf,
}

impl Default for DateRangeQuery {
    fn default() -> Self {
        Self {
            scan_numbers: Vec::new(),
            first_date: None,
            last_date: None,
            data_file_base: DEFAULT_DATA_FILE_BASE.to_string(),
            data_path_base: PathBuf::new(),
        }
    }
}

impl DateRangeQuery {
    /// Inclusive date bounds; defaults to the past week ending today
    pub fn date_bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let last = self.last_date.unwrap_or(today);
        let first = self
            .first_date
            .unwrap_or(today - Duration::days(DEFAULT_SEARCH_DAYS));
        (first, last)
    }

    fn search_strings(&self) -> Vec<String> {
        if self.scan_numbers.is_empty() {
            vec![self.data_file_base.clone()]
        } else {
            self.scan_numbers
                .iter()
                .map(|scan| format!("{}{:04}", self.data_file_base, scan))
                .collect()
        }
    }
}

/// Find data files in per-day directories between the query's dates
pub fn find_data_files_in_date_range(query: &DateRangeQuery) -> Result<Vec<PathBuf>> {
    let (first_date, last_date) = query.date_bounds(Local::now().date_naive());
    let search_strings = query.search_strings();
    let mut matches = Vec::new();

    for date in first_date.iter_days().take_while(|d| *d <= last_date) {
        let year_dir = query.data_path_base.join(date.format("%Y").to_string());
        let day_parent = if year_dir.is_dir() {
            year_dir
        } else {
            query.data_path_base.clone()
        };
        let day_dir = day_parent.join(date.format("%y%m%d").to_string());

        for search in &search_strings {
            let pattern = format!(
                "{}/{}*",
                glob::Pattern::escape(&day_dir.to_string_lossy()),
                glob::Pattern::escape(search)
            );
            debug!("Search: {}", pattern);

            let paths = glob::glob(&pattern).map_err(|e| {
                Error::configuration(format!("Invalid search pattern '{}': {}", pattern, e))
            })?;
            for entry in paths {
                match entry {
                    Ok(path) => matches.push(path),
                    Err(e) => warn!("Skipping unreadable path during search: {}", e),
                }
            }
        }
    }

    info!(
        "Found {} data files between {} and {}",
        matches.len(),
        first_date,
        last_date
    );
    Ok(matches)
}

/// Expand files and directories into a sorted list of data files
///
/// Files are kept as given. Directories are walked recursively for `.txt`
/// files with a recognized BCS prefix.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            return Err(Error::io(
                format!("Input does not exist: {}", input.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            ));
        }

        for entry in WalkDir::new(input)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_data_file(path) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    debug!("Expanded {} inputs into {} files", inputs.len(), files.len());
    Ok(files)
}

fn is_data_file(path: &Path) -> bool {
    classify_file(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, "Date: 05/12/2021\n").unwrap();
        path
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_bounds_default_to_past_week() {
        let query = DateRangeQuery::default();
        let today = date(2021, 5, 12);
        assert_eq!(query.date_bounds(today), (date(2021, 5, 5), today));
    }

    #[test]
    fn test_search_strings_pad_scan_numbers() {
        let query = DateRangeQuery {
            scan_numbers: vec![7, 1234],
            ..Default::default()
        };
        assert_eq!(query.search_strings(), vec!["TrajScan0007", "TrajScan1234"]);
    }

    #[test]
    fn test_find_with_year_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        let day = base.join("2021").join("210512");
        let wanted = touch(&day, "TrajScan0007-0001_0001.txt");
        touch(&day, "TrajScan0008-0001_0001.txt");
        touch(&day, "SigScan0007.txt");
        touch(&base.join("2021").join("210601"), "TrajScan0007.txt");

        let query = DateRangeQuery {
            scan_numbers: vec![7],
            first_date: Some(date(2021, 5, 11)),
            last_date: Some(date(2021, 5, 13)),
            data_path_base: base.to_path_buf(),
            ..Default::default()
        };

        assert_eq!(find_data_files_in_date_range(&query).unwrap(), vec![wanted]);
    }

    #[test]
    fn test_find_without_year_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        let first = touch(&base.join("210512"), "SigScan0001.txt");
        let second = touch(&base.join("210513"), "SigScan0002.txt");

        let query = DateRangeQuery {
            first_date: Some(date(2021, 5, 12)),
            last_date: Some(date(2021, 5, 13)),
            data_file_base: "SigScan".to_string(),
            data_path_base: base.to_path_buf(),
            ..Default::default()
        };

        assert_eq!(
            find_data_files_in_date_range(&query).unwrap(),
            vec![first, second]
        );
    }

    #[test]
    fn test_expand_inputs_walks_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        let nested = touch(&base.join("210512"), "TrajScan0001.txt");
        touch(&base.join("210512"), "notes.txt");
        touch(&base.join("210512"), "TrajScan0001.json");
        let explicit = touch(base, "other.txt");

        let files = expand_inputs(&[base.join("210512"), explicit.clone()]).unwrap();

        let mut expected = vec![nested, explicit];
        expected.sort();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_expand_inputs_missing_path() {
        let err = expand_inputs(&[PathBuf::from("/nonexistent/bcs")]).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
