//! Stream processing and sync orchestration
//!
//! This is the engine of the tap:
//!
//! 1. **Plan**: the catalog is resolved into a root-first [`SyncPlan`]
//! 2. **Root phase**: one unparameterized fetch of the root stream; its rows
//!    are emitted and their nested location identifiers collected
//! 3. **Dependent phase**: every dependent stream is fetched once per
//!    (location, week) pair, rows enriched and emitted, bookmarks advanced
//! 4. **Terminal**: the run ends; each stream has already flushed whatever
//!    state it owed
//!
//! Failures are contained: a failed request yields zero rows and marks the
//! run partial, a failed schema emission skips that stream, and only sink
//! write failures abort the run.
//!
//! [`SyncPlan`]: crate::catalog::SyncPlan

pub mod orchestrator;
pub mod processor;

pub use orchestrator::{SyncOrchestrator, SyncReport};
pub use processor::{process_page, BookmarkTracker, PageOutcome};

use crate::catalog::CatalogError;
use crate::sink::SinkError;

/// Sync errors
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The catalog could not be resolved into a plan
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A message could not be delivered to the sink
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}
