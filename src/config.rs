//! Configuration management and validation
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `BCS_INGEST_*` environment variables, then command-line overrides (applied
//! by the CLI). Environment lookups go through a caller-supplied closure so
//! the layering can be exercised without touching process state.
//!
//! ```toml
//! strict = false
//! workers = 8
//! load_sidecar = true
//! timezone = "America/Los_Angeles"
//! data_path_base = "/data/bcs"
//!
//! [[subpath_remap]]
//! from = "C:/Users/Public/BCS"
//! to = "/data/bcs/scans"
//! ```

use crate::app::services::ingest::{IngestOptions, parse_timezone};
use crate::app::services::subpath_remap::{SubpathRemapper, SubpathRule};
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_TIMEZONE, env_vars,
};
use crate::error::Strictness;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan file path replacements, applied in order
    pub subpath_remap: Vec<SubpathRule>,
    /// Raise scan file row issues instead of recording warnings
    pub strict: bool,
    /// Number of files ingested concurrently
    pub workers: usize,
    pub load_sidecar: bool,
    /// IANA zone for rendered timestamps
    pub timezone: String,
    /// Root of the per-day data directories searched by `find`
    pub data_path_base: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subpath_remap: Vec::new(),
            strict: false,
            workers: num_cpus::get(),
            load_sidecar: true,
            timezone: DEFAULT_TIMEZONE.to_string(),
            data_path_base: None,
        }
    }
}

impl Config {
    /// `<user config dir>/bcs-ingest/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            Error::configuration("Could not determine the user configuration directory")
        })?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse a TOML configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Configuration { message } => Error::configuration(format!(
                "{} ({})",
                message,
                path.display()
            )),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Invalid configuration file: {}", e)))
    }

    /// Defaults, then `config_file`, then the process environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        Self::load_layered_with(config_file, |key| std::env::var(key).ok())
    }

    /// Defaults, then `config_file`, then variables returned by `lookup`
    pub fn load_layered_with<F>(config_file: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Override settings from `BCS_INGEST_*` variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(env_vars::STRICT) {
            self.strict = parse_bool(env_vars::STRICT, &value)?;
            debug!("{} overrides strict = {}", env_vars::STRICT, self.strict);
        }
        if let Some(value) = lookup(env_vars::WORKERS) {
            self.workers = value.trim().parse().map_err(|_| {
                Error::configuration(format!(
                    "{} must be a positive integer, got '{}'",
                    env_vars::WORKERS,
                    value
                ))
            })?;
            debug!("{} overrides workers = {}", env_vars::WORKERS, self.workers);
        }
        if let Some(value) = lookup(env_vars::DATA_PATH) {
            if !value.trim().is_empty() {
                self.data_path_base = Some(PathBuf::from(value.trim()));
            }
        }
        if let Some(value) = lookup(env_vars::TIMEZONE) {
            if !value.trim().is_empty() {
                self.timezone = value.trim().to_string();
                debug!("{} overrides timezone = {}", env_vars::TIMEZONE, self.timezone);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }
        if let Some(index) = self.subpath_remap.iter().position(|r| r.from.is_empty()) {
            return Err(Error::configuration(format!(
                "Subpath remap rule {} has an empty 'from' pattern",
                index + 1
            )));
        }
        parse_timezone(&self.timezone)?;
        Ok(())
    }

    pub fn remapper(&self) -> SubpathRemapper {
        self.subpath_remap.iter().cloned().collect()
    }

    pub fn strictness(&self) -> Strictness {
        Strictness::from_strict_flag(self.strict)
    }

    /// Options for [`crate::ingest_data_file`]
    pub fn ingest_options(&self) -> Result<IngestOptions> {
        Ok(IngestOptions {
            remapper: self.remapper(),
            strictness: self.strictness(),
            load_sidecar: self.load_sidecar,
            timezone: parse_timezone(&self.timezone)?,
        })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::configuration(format!(
            "{} must be a boolean, got '{}'",
            name, value
        ))),
    }
}
