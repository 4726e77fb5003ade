//! Scan file reader for trajectory scans
//!
//! Trajectory data files do not contain their motor positions; they name the
//! scan file that drove the instrument. This module finds the positions for
//! one output file inside that scan file.
//!
//! ## Architecture
//!
//! - [`indexer`] - header detection and sub-scan line ranges
//! - [`table`] - tab-delimited table reading and column repair
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bcs_ingest::app::services::scan_file::ScanFile;
//!
//! # fn example() -> bcs_ingest::Result<()> {
//! let scan_file = ScanFile::open(std::path::Path::new("/scans/energy.txt"))?;
//! if let Some(table) = scan_file.motor_table(2)? {
//!     println!("{} steps of {:?}", table.len(), table.columns);
//! }
//! # Ok(())
//! # }
//! ```

pub mod indexer;
pub mod table;

#[cfg(test)]
pub mod tests;

pub use indexer::{find_header_line, locate_sub_scan};
pub use table::{ScanTable, detect_flying_motor, is_unnamed};

use crate::app::adapters::filesystem::read_lines;
use crate::app::models::ScanFileLocation;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Contents of one scan file, read once
#[derive(Debug, Clone)]
pub struct ScanFile {
    path: PathBuf,
    lines: Vec<String>,
}

impl ScanFile {
    /// Read a scan file
    ///
    /// A missing file is reported as an I/O error; callers that know which
    /// data file referenced it convert that into [`Error::ScanFileNotFound`].
    pub fn open(path: &Path) -> Result<Self> {
        let lines = read_lines(path)?;
        Ok(Self::from_lines(path, lines))
    }

    pub fn from_lines(path: &Path, lines: Vec<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn display_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Zero-based line naming the motor columns
    pub fn header_line(&self) -> Result<usize> {
        find_header_line(&self.lines)
            .ok_or_else(|| Error::scan_file_header_not_found(self.display_path()))
    }

    /// Line range of a one-based output file number, or `None` if it has no rows
    pub fn locate(&self, file_number: u32) -> Result<Option<ScanFileLocation>> {
        let header_line = self.header_line()?;
        let location = locate_sub_scan(&self.lines, header_line, file_number);
        debug!(
            "Scan file {} output file {}: {:?}",
            self.path.display(),
            file_number,
            location
        );
        Ok(location)
    }

    /// Motor table for a one-based output file number
    pub fn motor_table(&self, file_number: u32) -> Result<Option<ScanTable>> {
        match self.locate(file_number)? {
            Some(location) => self.read_table(&location).map(Some),
            None => Ok(None),
        }
    }

    /// Read the table at a known location
    pub fn read_table(&self, location: &ScanFileLocation) -> Result<ScanTable> {
        ScanTable::from_lines(&self.lines, location, &self.display_path())
    }
}
