//! JSON sidecar files
//!
//! The acquisition software may write `<data file stem>.json` next to a data
//! file with experiment and scan setup details.

use crate::constants::SIDECAR_EXTENSION;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sidecar {
    #[serde(rename = "Experiment", default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<Value>,
    #[serde(rename = "Scan Setup", default, skip_serializing_if = "Option::is_none")]
    pub scan_setup: Option<Value>,
}

pub fn sidecar_path(data_file_path: &Path) -> PathBuf {
    data_file_path.with_extension(SIDECAR_EXTENSION)
}

/// Load the sidecar of a data file, or `None` if there is none
pub fn load_sidecar(data_file_path: &Path) -> Result<Option<Sidecar>> {
    let path = sidecar_path(data_file_path);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No sidecar for {}", data_file_path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(Error::io(
                format!("Failed to read sidecar {}", path.display()),
                e,
            ));
        }
    };

    let sidecar = serde_json::from_str(&content).map_err(|source| Error::Sidecar {
        path: path.clone(),
        source,
    })?;
    debug!("Loaded sidecar {}", path.display());
    Ok(Some(sidecar))
}
