//! Sync command: run the incremental extraction

use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::catalog::Catalog;
use crate::cli::CliError;
use crate::config::TapConfig;
use crate::fetcher::{ApiClient, HttpTransport, RetryPolicy, RATE_LIMIT_DELAY};
use crate::sink::JsonLinesSink;
use crate::state::TapState;
use crate::sync::{SyncOrchestrator, SyncReport};
use crate::window;

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Path to the config file (base_url, api_key, start_date)
    #[arg(long)]
    pub config: PathBuf,

    /// Path to a catalog file; defaults to the discovered catalog with all
    /// streams selected
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Path to a state file from a previous run
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Delay in seconds between rate-limited attempts
    #[arg(long, default_value_t = RATE_LIMIT_DELAY.as_secs())]
    pub rate_limit_delay: u64,

    /// Maximum number of rate-limited attempts per request; unbounded when
    /// omitted
    #[arg(long)]
    pub max_rate_limit_retries: Option<u32>,
}

impl SyncArgs {
    /// Load configuration, build the per-run session and drive the sync.
    pub async fn execute(&self) -> Result<SyncReport, CliError> {
        // Config problems, including a malformed start_date, abort here,
        // before any network activity.
        let config = TapConfig::load(&self.config)?;
        let number_of_weeks = window::number_of_weeks(&config.start_date, Utc::now().date_naive())?;

        let catalog = match &self.catalog {
            Some(path) => Catalog::load(path)?,
            None => Catalog::discover()?,
        };
        let state = match &self.state {
            Some(path) => TapState::load(path)?,
            None => TapState::default(),
        };

        info!(
            streams = catalog.streams.len(),
            weeks = number_of_weeks,
            "starting sync run"
        );

        // The session lives exactly as long as this run.
        let client = ApiClient::new(
            HttpTransport::new()?,
            config.base_url.clone(),
            config.api_key.clone(),
        )
        .with_retry_policy(RetryPolicy {
            delay: Duration::from_secs(self.rate_limit_delay),
            max_attempts: self.max_rate_limit_retries,
        });

        let orchestrator = SyncOrchestrator::new(&client, number_of_weeks);
        let mut sink = JsonLinesSink::stdout();
        let report = orchestrator.run(&catalog, &state, &mut sink).await?;
        Ok(report)
    }
}
