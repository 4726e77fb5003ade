//! Ingest command implementation
//!
//! Expands the input paths, ingests every data file on a blocking worker
//! pool and prints either a JSON document or a colored summary. A failing
//! file is reported alongside the others and never stops the run.

use super::shared::{
    CommandStats, apply_cli_overrides, create_progress_bar, load_configuration, setup_logging,
};
use crate::app::services::discovery::expand_inputs;
use crate::app::services::ingest::{IngestOptions, IngestRecord, ingest_data_file};
use crate::cli::args::{IngestArgs, OutputFormat};
use crate::{Error, Result};
use anyhow::Context;
use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{HumanDuration, ProgressBar};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Result of ingesting one file
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<IngestRecord>,
}

/// Ingest command runner
pub async fn run_ingest(
    args: IngestArgs,
    cancellation_token: CancellationToken,
) -> anyhow::Result<CommandStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let mut config = load_configuration(args.config_file.as_deref())
        .context("Failed to load configuration")?;
    apply_cli_overrides(&mut config, &args);
    config.validate()?;
    debug!("Loaded configuration: {:?}", config);

    let options = Arc::new(config.ingest_options()?);
    let files = expand_inputs(&args.paths).context("Failed to collect input files")?;
    if files.is_empty() {
        warn!("No BCS data files found in the given paths");
    }
    info!(
        "Ingesting {} files with {} workers",
        files.len(),
        config.workers
    );

    let progress = (args.show_progress() && !files.is_empty())
        .then(|| create_progress_bar(files.len() as u64, "Ingesting"));
    let files_found = files.len();

    let outcomes = ingest_files(
        files,
        options,
        config.workers,
        progress.as_ref(),
        &cancellation_token,
    )
    .await?;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let mut stats = CommandStats {
        files_found,
        ..Default::default()
    };
    for outcome in &outcomes {
        match &outcome.result {
            Ok(record) => {
                stats.files_ingested += 1;
                stats.warnings += record.warning_count();
            }
            Err(e) => {
                error!("Failed to ingest {}: {}", outcome.path.display(), e);
                if e.is_not_found() && config.subpath_remap.is_empty() {
                    warn!("Scan files may have moved; relocate them with --remap FROM=TO");
                }
                stats.files_failed += 1;
            }
        }
    }
    stats.processing_time = start_time.elapsed();

    match args.output_format {
        OutputFormat::Json => print_json_report(&outcomes)?,
        OutputFormat::Summary => print_summary_report(&outcomes, &stats, args.show_data),
    }

    Ok(stats)
}

/// Ingest `files` with at most `workers` files in flight
///
/// Outcomes are returned sorted by path. Cancellation stops the run and
/// discards results not yet collected.
pub async fn ingest_files(
    files: Vec<PathBuf>,
    options: Arc<IngestOptions>,
    workers: usize,
    progress: Option<&ProgressBar>,
    cancellation_token: &CancellationToken,
) -> Result<Vec<FileOutcome>> {
    let mut pending = stream::iter(files.into_iter().map(|path| {
        let options = Arc::clone(&options);
        async move {
            let task_path = path.clone();
            let result = task::spawn_blocking(move || ingest_data_file(&task_path, &options))
                .await
                .unwrap_or_else(|e| {
                    Err(Error::processing_interrupted(format!(
                        "Ingestion task failed: {}",
                        e
                    )))
                });
            FileOutcome { path, result }
        }
    }))
    .buffer_unordered(workers.max(1));

    let mut outcomes = Vec::new();
    loop {
        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                if let Some(pb) = progress {
                    pb.abandon_with_message("Cancelled");
                }
                return Err(Error::processing_interrupted(format!(
                    "Ingestion cancelled after {} files",
                    outcomes.len()
                )));
            }
            next = pending.next() => match next {
                Some(outcome) => {
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                    outcomes.push(outcome);
                }
                None => break,
            }
        }
    }

    outcomes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(outcomes)
}

/// Print records and failures as one JSON document on stdout
fn print_json_report(outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let records: Vec<&IngestRecord> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .collect();
    let failures: Vec<serde_json::Value> = outcomes
        .iter()
        .filter_map(|o| {
            o.result.as_ref().err().map(|e| {
                serde_json::json!({
                    "file_path": o.path,
                    "error": e.to_string(),
                })
            })
        })
        .collect();

    let report = serde_json::json!({
        "records": records,
        "failures": failures,
    });
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize records")?;
    println!("{}", json);
    Ok(())
}

fn print_summary_report(outcomes: &[FileOutcome], stats: &CommandStats, show_data: bool) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(record) => {
                let kind = record
                    .header
                    .as_ref()
                    .map(|h| format!("{:?}", h.scan_type))
                    .unwrap_or_else(|| "AutomationRun".to_string());
                let mut line = format!(
                    "{} {} [{}] {} rows",
                    "✓".green(),
                    record.filename.bold(),
                    kind,
                    record.data_row_count
                );
                let warnings = record.warning_count();
                if warnings > 0 {
                    line.push_str(&format!(", {}", format!("{} warnings", warnings).yellow()));
                }
                if record.header.as_ref().is_some_and(|h| h.repaired) {
                    line.push_str(&format!(", {}", "scan file repaired".yellow()));
                }
                println!("{}", line);
                if show_data {
                    print_data_table(record);
                }
            }
            Err(e) => {
                println!(
                    "{} {}: {}",
                    "✗".red(),
                    outcome.path.display().to_string().bold(),
                    e.to_string().red()
                );
            }
        }
    }

    println!();
    println!("{}", "BCS Ingestion Summary".bright_green().bold());
    println!("   • Files found: {}", stats.files_found);
    println!("   • Files ingested: {}", stats.files_ingested);
    if stats.warnings > 0 {
        println!(
            "   • Row warnings: {}",
            stats.warnings.to_string().yellow()
        );
    }
    if stats.files_failed > 0 {
        println!(
            "   • Files failed: {}",
            stats.files_failed.to_string().red().bold()
        );
    }
    println!(
        "   • Processing time: {}",
        HumanDuration(stats.processing_time)
    );
}

fn print_data_table(record: &IngestRecord) {
    match record.to_dataframe() {
        Ok(Some(frame)) => println!("{}", frame),
        Ok(None) => {}
        Err(e) => warn!("Cannot show data table of {}: {}", record.filename, e),
    }
}
