//! Weekly time-window arithmetic
//!
//! The Flexopus API limits time-scoped queries to short ranges, so dependent
//! streams are paged through the configured date range one week at a time.
//! Windows are addressed by an integer offset counting backward from now:
//! offset 0 starts at the present moment, offset 1 one week earlier, and so
//! on. Enumerating offsets `0..number_of_weeks` covers `[start_date, now]`
//! with at most one week of overrepresentation at the trailing boundary.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Window arithmetic errors
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// Malformed start date in the configuration
    #[error("invalid start_date {input:?} (expected YYYY-MM-DD): {source}")]
    InvalidStartDate {
        /// The offending input string
        input: String,
        /// Underlying parse failure
        source: chrono::ParseError,
    },
}

/// A half-open time interval `[from, to)` of exactly one week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Inclusive lower bound
    pub from: DateTime<Utc>,
    /// Exclusive upper bound, always `from + 1 week`
    pub to: DateTime<Utc>,
}

impl Window {
    /// Render the window as `from`/`to` query parameters.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("from", format_timestamp(self.from)),
            ("to", format_timestamp(self.to)),
        ]
    }
}

/// Format a timestamp the way the API expects: `YYYY-MM-DDTHH:MM:SSZ`.
///
/// This is intentionally not strict RFC3339 (no fractional seconds, literal
/// `Z` suffix); the API was built against this exact shape.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Number of whole weeks between `start_date` and `today`.
///
/// Fails on a malformed date string; the caller treats that as fatal for the
/// run, before any network activity.
pub fn weeks_since(start_date: &str, today: NaiveDate) -> Result<u32, WindowError> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").map_err(|source| {
        WindowError::InvalidStartDate {
            input: start_date.to_string(),
            source,
        }
    })?;
    let days = (today - start).num_days().unsigned_abs();
    Ok((days / 7) as u32)
}

/// Number of weekly windows needed to cover `[start_date, today]`, inclusive
/// of the trailing partial week.
pub fn number_of_weeks(start_date: &str, today: NaiveDate) -> Result<u32, WindowError> {
    Ok(weeks_since(start_date, today)? + 1)
}

/// Bounds of the `offset`-th window counting backward from `now`.
///
/// No bounds checking on `offset`; callers supply values in
/// `[0, number_of_weeks)`.
pub fn window_bounds(offset: u32, now: DateTime<Utc>) -> Window {
    let from = now - Duration::weeks(i64::from(offset));
    Window {
        from,
        to: from + Duration::weeks(1),
    }
}
