//! Main entry point for the tap-flexopus CLI

use clap::Parser;
use tap_flexopus::cli::error::{EXIT_PARTIAL, EXIT_SUCCESS};
use tap_flexopus::cli::{Cli, Commands};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing with optional JSON formatting.
///
/// Diagnostics must go to stderr: stdout carries the Singer messages.
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tap_flexopus=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Discover(ref args) => match args.execute() {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                error!("discover failed: {e}");
                e.exit_code()
            }
        },
        Commands::Sync(ref args) => match args.execute().await {
            Ok(report) if report.is_partial() => {
                warn!(
                    failed_requests = report.failed_requests,
                    skipped_streams = report.skipped_streams.len(),
                    "sync completed with errors"
                );
                EXIT_PARTIAL
            }
            Ok(report) => {
                info!(
                    streams = report.streams_synced,
                    records = report.records_emitted,
                    "sync completed"
                );
                EXIT_SUCCESS
            }
            Err(e) => {
                error!("sync failed: {e}");
                e.exit_code()
            }
        },
    };

    std::process::exit(exit_code);
}
