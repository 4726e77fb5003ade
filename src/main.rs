use bcs_ingest::cli::{args::Args, commands};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
            cancellation_token.cancel();
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(bcs_ingest::Error::processing_interrupted("Ingestion interrupted by user").into())
            }
        }
    });

    match result {
        Ok(stats) if stats.has_failures() => process::exit(2),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("BCS Ingest - Beamline Control System scan export reader");
    println!("=======================================================");
    println!();
    println!("Extract metadata and tabular data from BCS ASCII data files, resolving");
    println!("the scan files they reference for motor positions.");
    println!();
    println!("USAGE:");
    println!("    bcs-ingest <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    ingest      Ingest data files and print their metadata records");
    println!("    find        List data files acquired within a date range");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Summarize every data file under a day directory:");
    println!("    bcs-ingest ingest /data/bcs/2021/210512");
    println!();
    println!("    # Relocate Windows scan file paths and emit JSON:");
    println!("    bcs-ingest ingest TrajScan0007-0001_0001.txt \\");
    println!("        --remap 'C:/BCS/Scans=/data/bcs/scans' --format json");
    println!();
    println!("    # Find scan 7 acquired last week:");
    println!("    bcs-ingest find --path /data/bcs --scan 7");
    println!();
    println!("For detailed help on any command, use:");
    println!("    bcs-ingest <COMMAND> --help");
}
