//! Command implementations for the BCS ingester CLI
//!
//! Each command lives in its own module:
//! - `ingest`: parallel ingestion with JSON or summary output
//! - `find`: date-range discovery of data files

pub mod find;
pub mod ingest;
pub mod shared;

pub use shared::CommandStats;

use crate::cli::args::{Args, Commands};
use tokio_util::sync::CancellationToken;

/// Dispatch to the selected subcommand
///
/// Callers check for a missing subcommand first; without one this returns
/// empty statistics.
pub async fn run(
    args: Args,
    cancellation_token: CancellationToken,
) -> anyhow::Result<CommandStats> {
    match args.command {
        Some(Commands::Ingest(ingest_args)) => {
            ingest::run_ingest(ingest_args, cancellation_token).await
        }
        Some(Commands::Find(find_args)) => find::run_find(find_args).await,
        None => Ok(CommandStats::default()),
    }
}
