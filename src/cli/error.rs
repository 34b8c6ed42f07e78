//! CLI error types and exit codes

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::fetcher::FetcherError;
use crate::sink::SinkError;
use crate::state::StateError;
use crate::sync::SyncError;
use crate::window::WindowError;

/// Exit code for a successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for a run that completed with losses (failed requests,
/// skipped streams) or failed mid-sync
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code for a configuration failure detected before any network
/// activity
pub const EXIT_CONFIG: i32 = 2;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid start date
    #[error("configuration error: {0}")]
    Window(#[from] WindowError),

    /// Catalog error
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// State file error
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    Fetcher(#[from] FetcherError),

    /// Sync error
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Sink error
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

impl CliError {
    /// Process exit code distinguishing configuration failures from
    /// failures during the sync itself.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_)
            | CliError::Window(_)
            | CliError::Catalog(_)
            | CliError::State(_) => EXIT_CONFIG,
            CliError::Fetcher(_) | CliError::Sync(_) | CliError::Sink(_) => EXIT_PARTIAL,
        }
    }
}
