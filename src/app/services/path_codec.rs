//! Data file name decoding and classification
//!
//! BCS data files encode their scan, repeat and output file numbers in the
//! file name: `<Prefix>Scan<NNNN>[-RRRR][_FFFF].<ext>`. Newer "Beamline"
//! exports use a space-separated file number instead: `Trajectory Scan12 3.txt`.

use crate::app::models::{FileIdentity, FileKind};
use crate::constants::{DATA_FILE_EXTENSION, SCAN_TOKEN};
use crate::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Decode `(scan, file, repeat)` from a data file path
///
/// Suffixes are peeled right to left: extension, `_FILE`, `-REPEAT`, then the
/// text after the last `Scan` token. A non-numeric suffix such as `-Avg` is
/// peeled as a missing value as long as a `Scan` token remains in front of it.
/// Fails only when no numeric scan id can be found.
pub fn decode_file_identity(path: &Path) -> Result<FileIdentity> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (rest, mut file) = peel_suffix(&stem, '_');
    let (rest, repeat) = peel_suffix(rest, '-');

    let (_, scan_part) = rest
        .rsplit_once(SCAN_TOKEN)
        .ok_or_else(|| Error::path_decode(&file_name))?;
    let scan_part = scan_part.trim();

    let scan = match scan_part.parse::<u32>() {
        Ok(scan) => scan,
        Err(_) => {
            // Beamline convention: "<scan> <file>"
            let (scan_str, file_str) = match scan_part.rsplit_once(' ') {
                Some((scan_str, file_str)) => (scan_str.trim(), Some(file_str.trim())),
                None => (scan_part, None),
            };
            let scan = scan_str
                .parse::<u32>()
                .map_err(|_| Error::path_decode(&file_name))?;
            if let Some(embedded) = file_str.and_then(|s| s.parse::<u32>().ok()) {
                file = Some(embedded);
            }
            scan
        }
    };

    let identity = FileIdentity { scan, file, repeat };
    debug!("Decoded {} -> {}", file_name, identity);
    Ok(identity)
}

/// Split `text` on the last `separator`
///
/// The suffix is kept as its integer value, or dropped as `None` when it is
/// not numeric but the head still carries the `Scan` token. Otherwise the
/// separator belongs to the name and `text` is returned whole.
fn peel_suffix(text: &str, separator: char) -> (&str, Option<u32>) {
    let Some((head, tail)) = text.rsplit_once(separator) else {
        return (text, None);
    };
    match tail.trim().parse::<u32>() {
        Ok(value) => (head, Some(value)),
        Err(_) if head.contains(SCAN_TOKEN) => (head, None),
        Err(_) => (text, None),
    }
}

/// Classify a data file by name prefix and extension
///
/// Returns `None` for files that are not BCS text exports.
pub fn classify_file(path: &Path) -> Option<FileKind> {
    let has_text_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DATA_FILE_EXTENSION));
    if !has_text_extension {
        return None;
    }

    let file_name = path.file_name()?.to_string_lossy();
    FileKind::PREFIXES
        .iter()
        .find(|(prefix, _)| file_name.starts_with(prefix))
        .map(|(_, kind)| *kind)
}
