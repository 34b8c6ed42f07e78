//! Persisted bookmark state
//!
//! A pipeline runner can pass the last emitted STATE payload back on the
//! next run via `--state`. The engine loads it for progress reporting but
//! does not use it to narrow requests: every run re-queries the full window
//! range. See DESIGN.md for why that limitation is kept for now.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// State file errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// State file could not be read
    #[error("failed to read state file: {0}")]
    Io(#[from] std::io::Error),

    /// State file is not valid JSON
    #[error("failed to parse state file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The persisted mapping from stream name to last bookmark value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TapState {
    /// Bookmarks keyed by stream name
    #[serde(flatten)]
    pub bookmarks: BTreeMap<String, Value>,
}

impl TapState {
    /// Load state from a JSON file.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let raw = std::fs::read_to_string(path)?;
        let state: TapState = serde_json::from_str(&raw)?;
        info!(streams = state.bookmarks.len(), "loaded persisted state");
        Ok(state)
    }

    /// Last persisted bookmark for a stream, if any.
    pub fn bookmark(&self, stream: &str) -> Option<&Value> {
        self.bookmarks.get(stream)
    }
}
