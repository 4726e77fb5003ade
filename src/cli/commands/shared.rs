//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading, progress bars and the
//! statistics each command reports back to `main`.

use crate::cli::args::IngestArgs;
use crate::config::Config;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Statistics reported by every command
#[derive(Debug, Clone, Default)]
pub struct CommandStats {
    /// Data files found by expansion or search
    pub files_found: usize,
    pub files_ingested: usize,
    pub files_failed: usize,
    /// Row-level warnings across all ingested files
    pub warnings: usize,
    pub processing_time: Duration,
}

impl CommandStats {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the level derived from `-v`/`-q`.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bcs_ingest={}", log_level)));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using the layered approach (file -> env)
///
/// Without an explicit file the default location is used when it exists.
pub fn load_configuration(config_file: Option<&Path>) -> Result<Config> {
    let default_config_path = if config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = config_file.or_else(|| {
        default_config_path
            .as_deref()
            .filter(|path| path.exists())
    });

    if let Some(config_path) = config_file {
        info!("Using config file: {}", config_path.display());
    } else {
        info!("No config file found, using defaults and environment variables");
    }

    Config::load_layered(config_file)
}

/// Apply ingest command arguments on top of the loaded configuration
pub fn apply_cli_overrides(config: &mut Config, args: &IngestArgs) {
    config.subpath_remap.extend(args.remap.iter().cloned());
    if args.strict {
        config.strict = true;
    }
    if args.no_sidecar {
        config.load_sidecar = false;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::subpath_remap::SubpathRule;
    use crate::cli::args::OutputFormat;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn ingest_args() -> IngestArgs {
        IngestArgs {
            paths: vec![PathBuf::from("data")],
            remap: vec![SubpathRule::new("D:", "/mnt/d")],
            strict: true,
            no_sidecar: true,
            output_format: OutputFormat::Summary,
            show_data: false,
            workers: Some(2),
            config_file: None,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn test_command_stats_default() {
        let stats = CommandStats::default();
        assert_eq!(stats.files_found, 0);
        assert!(!stats.has_failures());
    }

    #[test]
    fn test_apply_cli_overrides_appends_remap_rules() {
        let mut config = Config {
            subpath_remap: vec![SubpathRule::new("C:", "/mnt/c")],
            ..Default::default()
        };

        apply_cli_overrides(&mut config, &ingest_args());

        assert_eq!(
            config.subpath_remap,
            vec![SubpathRule::new("C:", "/mnt/c"), SubpathRule::new("D:", "/mnt/d")]
        );
        assert!(config.strict);
        assert!(!config.load_sidecar);
        assert_eq!(config.workers, 2);
    }

    #[test]
    fn test_apply_cli_overrides_keeps_config_when_flags_absent() {
        let mut config = Config {
            strict: true,
            workers: 5,
            ..Default::default()
        };
        let args = IngestArgs {
            remap: Vec::new(),
            strict: false,
            no_sidecar: false,
            workers: None,
            ..ingest_args()
        };

        apply_cli_overrides(&mut config, &args);

        assert!(config.strict);
        assert!(config.load_sidecar);
        assert_eq!(config.workers, 5);
    }

    #[test]
    fn test_load_configuration_from_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "workers = 3\nload_sidecar = false\n").unwrap();

        let config = load_configuration(Some(&path)).unwrap();

        assert!(!config.load_sidecar);
    }

    #[test]
    fn test_create_progress_bar() {
        let pb = create_progress_bar(10, "Ingesting");
        assert_eq!(pb.length(), Some(10));
    }
}
