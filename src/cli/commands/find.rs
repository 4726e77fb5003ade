//! Find command implementation
//!
//! Lists data files acquired between two dates, one path per line.

use super::shared::{CommandStats, load_configuration, setup_logging};
use crate::Error;
use crate::app::services::discovery::{DateRangeQuery, find_data_files_in_date_range};
use crate::cli::args::FindArgs;
use anyhow::Context;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info};

pub async fn run_find(args: FindArgs) -> anyhow::Result<CommandStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;
    debug!("Command line arguments: {:?}", args);
    args.validate()?;

    let config = load_configuration(args.config_file.as_deref())
        .context("Failed to load configuration")?;
    config.validate()?;

    let data_path_base = args
        .data_path
        .clone()
        .or(config.data_path_base)
        .ok_or_else(|| {
            Error::configuration("No data path given; use --path or set data_path_base")
        })?;

    let query = DateRangeQuery {
        scan_numbers: args.scan_numbers.clone(),
        first_date: args.from,
        last_date: args.to,
        data_file_base: args.file_base.clone(),
        data_path_base,
    };
    info!("Searching {}", query.data_path_base.display());

    let files = task::spawn_blocking(move || find_data_files_in_date_range(&query))
        .await
        .context("File search task failed")??;

    for file in &files {
        println!("{}", file.display());
    }

    Ok(CommandStats {
        files_found: files.len(),
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}
