//! Per-page stream processing
//!
//! [`process_page`] takes one page of raw API rows and drives the sink:
//! root rows have their nested location identifiers collected, rows of
//! location-scoped dependent streams are tagged with their owning location,
//! every row is emitted in input order, and the stream's bookmark advances
//! according to its sort declaration.

use serde_json::Value;
use tracing::warn;

use crate::catalog::{CatalogEntry, StreamKind};
use crate::sink::{Sink, SinkError};

/// Tracks one stream's bookmark across all pages of a run.
///
/// Sorted streams write state after every row (latest-value semantics).
/// Unsorted streams keep the running maximum in memory and write it once
/// per page, so an intermediate non-maximal watermark is never recorded.
#[derive(Debug)]
pub struct BookmarkTracker {
    replication_key: Option<String>,
    is_sorted: bool,
    max_seen: Option<Value>,
}

impl BookmarkTracker {
    /// Fresh tracker for a stream; the bookmark starts unknown.
    pub fn new(entry: &CatalogEntry) -> Self {
        BookmarkTracker {
            replication_key: entry.replication_key.clone(),
            is_sorted: entry.is_sorted,
            max_seen: None,
        }
    }

    /// The maximum replication-key value observed so far.
    pub fn max_seen(&self) -> Option<&Value> {
        self.max_seen.as_ref()
    }

    /// Advance the bookmark for one emitted row. Rows missing the
    /// replication key leave it untouched.
    fn observe(&mut self, stream: &str, row: &Value, sink: &mut dyn Sink) -> Result<(), SinkError> {
        let Some(key) = &self.replication_key else {
            return Ok(());
        };
        let Some(value) = row.get(key) else {
            return Ok(());
        };

        if self.is_sorted {
            sink.write_state(stream, value)?;
            self.max_seen = Some(value.clone());
        } else if self
            .max_seen
            .as_ref()
            .map_or(true, |current| bookmark_gt(value, current))
        {
            self.max_seen = Some(value.clone());
        }
        Ok(())
    }

    /// Page boundary: unsorted streams write their running maximum here.
    fn flush_page(&self, stream: &str, sink: &mut dyn Sink) -> Result<(), SinkError> {
        if self.replication_key.is_some() && !self.is_sorted {
            if let Some(value) = &self.max_seen {
                sink.write_state(stream, value)?;
            }
        }
        Ok(())
    }
}

/// Ordering for bookmark values. ISO-8601 timestamps compare correctly as
/// strings; numbers compare numerically; anything else falls back to its
/// JSON text.
fn bookmark_gt(candidate: &Value, current: &Value) -> bool {
    match (candidate, current) {
        (Value::String(a), Value::String(b)) => a > b,
        (Value::Number(a), Value::Number(b)) => {
            a.as_f64().unwrap_or(f64::NEG_INFINITY) > b.as_f64().unwrap_or(f64::NEG_INFINITY)
        }
        _ => candidate.to_string() > current.to_string(),
    }
}

/// What processing one page produced.
#[derive(Debug, Default)]
pub struct PageOutcome {
    /// Location identifiers extracted from root rows
    pub location_ids: Vec<String>,
    /// Number of records emitted
    pub records: u64,
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Process one page of raw rows for a stream.
///
/// Emission order equals input row order; no reordering, dedup or filtering.
pub fn process_page(
    entry: &CatalogEntry,
    kind: &StreamKind,
    rows: Vec<Value>,
    location_id: Option<&str>,
    sink: &mut dyn Sink,
    tracker: &mut BookmarkTracker,
) -> Result<PageOutcome, SinkError> {
    let mut outcome = PageOutcome::default();

    for mut row in rows {
        match kind {
            StreamKind::Root { .. } => match row.get("locations").and_then(Value::as_array) {
                Some(locations) if !locations.is_empty() => {
                    for location in locations {
                        if let Some(id) = location.get("id") {
                            outcome.location_ids.push(id_string(id));
                        }
                    }
                }
                _ => {
                    warn!(
                        stream = %entry.tap_stream_id,
                        row_id = %row.get("id").unwrap_or(&serde_json::Value::Null),
                        "row has no nested locations"
                    );
                }
            },
            StreamKind::Dependent {
                location_scoped, ..
            } => {
                if *location_scoped {
                    if let (Some(object), Some(location)) = (row.as_object_mut(), location_id) {
                        object.insert(
                            "location_id".to_string(),
                            Value::String(location.to_string()),
                        );
                    }
                }
            }
        }

        sink.write_record(&entry.tap_stream_id, &row)?;
        outcome.records += 1;
        tracker.observe(&entry.tap_stream_id, &row, sink)?;
    }

    tracker.flush_page(&entry.tap_stream_id, sink)?;
    Ok(outcome)
}
