//! Tap configuration
//!
//! The tap reads a JSON config file with three required keys: `base_url`
//! (API root), `api_key` (bearer credential) and `start_date` (`YYYY-MM-DD`,
//! used only to compute the number of weekly windows, not as a hard filter).

use serde::Deserialize;
use std::path::Path;

use crate::window::{self, WindowError};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON or misses a required key
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required value is present but unusable
    #[error("invalid config value: {0}")]
    Invalid(String),

    /// Malformed start date
    #[error(transparent)]
    StartDate(#[from] WindowError),
}

/// Tap configuration loaded from `--config`
#[derive(Debug, Clone, Deserialize)]
pub struct TapConfig {
    /// API root, e.g. `https://example.flexopus.com/api/v2`
    pub base_url: String,
    /// Bearer credential attached to every request
    pub api_key: String,
    /// Calendar date string `YYYY-MM-DD`
    pub start_date: String,
}

impl TapConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: TapConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field contents. Runs before any network activity so a
    /// malformed start date aborts the run up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key must not be empty".into()));
        }
        window::weeks_since(&self.start_date, chrono::Utc::now().date_naive())?;
        Ok(())
    }
}
