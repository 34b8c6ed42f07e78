//! Top-level sync driver

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{error, info, info_span, warn};

use crate::catalog::{render_endpoint, Catalog, CatalogEntry, StreamKind};
use crate::fetcher::{ApiClient, Transport};
use crate::sink::Sink;
use crate::state::TapState;
use crate::sync::processor::{process_page, BookmarkTracker};
use crate::sync::SyncError;
use crate::window::window_bounds;

/// Pause between streams, a small courtesy toward the API.
const STREAM_PACING: Duration = Duration::from_millis(200);

/// What a sync run did, for exit-code and logging purposes.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Streams fully processed
    pub streams_synced: u32,
    /// Records emitted across all streams
    pub records_emitted: u64,
    /// Requests that failed and were degraded to zero rows
    pub failed_requests: u64,
    /// Streams skipped because their schema could not be emitted
    pub skipped_streams: Vec<String>,
}

impl SyncReport {
    /// Whether the run completed with losses a downstream consumer should
    /// know about.
    pub fn is_partial(&self) -> bool {
        self.failed_requests > 0 || !self.skipped_streams.is_empty()
    }
}

/// Drives one sync run: root stream first, then every dependent stream once
/// per (location, week) pair. Entirely sequential; the per-request rate-limit
/// wait blocks the whole sync.
pub struct SyncOrchestrator<'a, T: Transport> {
    client: &'a ApiClient<T>,
    number_of_weeks: u32,
    now: DateTime<Utc>,
    pacing: Duration,
}

impl<'a, T: Transport> SyncOrchestrator<'a, T> {
    /// New orchestrator borrowing the run's API client. `number_of_weeks`
    /// is computed once from the configured start date.
    pub fn new(client: &'a ApiClient<T>, number_of_weeks: u32) -> Self {
        SyncOrchestrator {
            client,
            number_of_weeks,
            now: Utc::now(),
            pacing: STREAM_PACING,
        }
    }

    /// Pin the reference time windows are computed from. Tests use this for
    /// deterministic window bounds.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Override the inter-stream pause.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run the sync against `catalog`, emitting into `sink`.
    ///
    /// `state` is the persisted bookmark mapping from the previous run; it
    /// is reported for context but does not narrow any request.
    pub async fn run(
        &self,
        catalog: &Catalog,
        state: &TapState,
        sink: &mut dyn Sink,
    ) -> Result<SyncReport, SyncError> {
        let plan = catalog.sync_plan()?;
        let mut report = SyncReport::default();
        let mut location_ids: Vec<String> = Vec::new();

        // Root phase: location identifiers are a hard prerequisite for
        // everything that follows.
        if let Some((entry, def)) = plan.root {
            location_ids = self
                .sync_root(entry, &def.kind, state, sink, &mut report)
                .await;
        } else {
            warn!("root stream not selected; dependent streams will see zero locations");
        }

        for (entry, def) in &plan.dependents {
            tokio::time::sleep(self.pacing).await;
            self.sync_dependent(entry, &def.kind, &location_ids, state, sink, &mut report)
                .await?;
        }

        info!(
            streams = report.streams_synced,
            records = report.records_emitted,
            failed_requests = report.failed_requests,
            "sync run finished"
        );
        Ok(report)
    }

    fn log_previous_bookmark(&self, entry: &CatalogEntry, state: &TapState) {
        if let Some(bookmark) = state.bookmark(&entry.tap_stream_id) {
            // Reported for context only; the full window range is re-queried
            info!(bookmark = %bookmark, "previous bookmark on record");
        }
    }

    /// Emit the stream's schema. A failure here would break the sink's
    /// ordering contract for every subsequent record, so the stream is
    /// skipped instead.
    fn emit_schema(
        &self,
        entry: &CatalogEntry,
        sink: &mut dyn Sink,
        report: &mut SyncReport,
    ) -> bool {
        match sink.write_schema(&entry.tap_stream_id, &entry.schema, &entry.key_properties) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to emit schema; skipping stream");
                report.skipped_streams.push(entry.tap_stream_id.clone());
                false
            }
        }
    }

    async fn sync_root(
        &self,
        entry: &CatalogEntry,
        kind: &StreamKind,
        state: &TapState,
        sink: &mut dyn Sink,
        report: &mut SyncReport,
    ) -> Vec<String> {
        let span = info_span!("sync_stream", stream = %entry.tap_stream_id);
        let _enter = span.enter();
        info!("syncing root stream");
        self.log_previous_bookmark(entry, state);

        if !self.emit_schema(entry, sink, report) {
            return Vec::new();
        }

        let StreamKind::Root { endpoint } = kind else {
            return Vec::new();
        };

        let mut tracker = BookmarkTracker::new(entry);
        match self.client.fetch_rows(endpoint, None).await {
            Ok(rows) => match process_page(entry, kind, rows, None, sink, &mut tracker) {
                Ok(outcome) => {
                    report.streams_synced += 1;
                    report.records_emitted += outcome.records;
                    info!(
                        records = outcome.records,
                        locations = outcome.location_ids.len(),
                        "root stream synced"
                    );
                    outcome.location_ids
                }
                Err(e) => {
                    // Sink failures during the root phase still leave a
                    // coherent run: zero locations, zero dependent requests.
                    error!(error = %e, "sink failure while processing root stream");
                    report.skipped_streams.push(entry.tap_stream_id.clone());
                    Vec::new()
                }
            },
            Err(_) => {
                // Already logged by the client. Degrade to zero locations:
                // dependent streams will iterate zero times.
                report.failed_requests += 1;
                warn!("root fetch failed; continuing with zero location identifiers");
                Vec::new()
            }
        }
    }

    async fn sync_dependent(
        &self,
        entry: &CatalogEntry,
        kind: &StreamKind,
        location_ids: &[String],
        state: &TapState,
        sink: &mut dyn Sink,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let span = info_span!("sync_stream", stream = %entry.tap_stream_id);
        let _enter = span.enter();
        info!(
            locations = location_ids.len(),
            weeks = self.number_of_weeks,
            "syncing dependent stream"
        );
        self.log_previous_bookmark(entry, state);

        if !self.emit_schema(entry, sink, report) {
            return Ok(());
        }

        let StreamKind::Dependent {
            endpoint_template, ..
        } = kind
        else {
            return Ok(());
        };

        let mut tracker = BookmarkTracker::new(entry);
        for location_id in location_ids {
            let endpoint = render_endpoint(endpoint_template, location_id);
            for offset in 0..self.number_of_weeks {
                let window = window_bounds(offset, self.now);
                match self.client.fetch_rows(&endpoint, Some(&window)).await {
                    Ok(rows) => {
                        let outcome = process_page(
                            entry,
                            kind,
                            rows,
                            Some(location_id),
                            sink,
                            &mut tracker,
                        )?;
                        report.records_emitted += outcome.records;
                    }
                    Err(_) => {
                        // Logged by the client; this (location, week) unit
                        // yields zero rows and the sync moves on.
                        report.failed_requests += 1;
                    }
                }
            }
        }

        report.streams_synced += 1;
        Ok(())
    }
}
