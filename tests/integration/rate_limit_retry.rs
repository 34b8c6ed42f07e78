//! Rate-limit handling through the full sync path

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::time::Duration;

use tap_flexopus::catalog::Catalog;
use tap_flexopus::fetcher::{ApiClient, FetchResponse, RetryPolicy};
use tap_flexopus::state::TapState;
use tap_flexopus::sync::SyncOrchestrator;

use crate::support::{RecordingSink, ScriptedTransport};

fn buildings_only_catalog() -> Catalog {
    let mut catalog = Catalog::discover().unwrap();
    for entry in &mut catalog.streams {
        entry.selected = entry.tap_stream_id == "buildings";
    }
    catalog
}

#[tokio::test]
async fn test_throttled_request_is_retried_until_it_succeeds() {
    let transport = ScriptedTransport::new(vec![
        Ok(FetchResponse::RateLimited),
        Ok(FetchResponse::RateLimited),
        Ok(FetchResponse::RateLimited),
        Ok(FetchResponse::Rows(vec![json!({"id": 1, "locations": []})])),
    ]);
    let client = ApiClient::new(transport, "https://api".to_string(), "key".to_string())
        .with_retry_policy(RetryPolicy {
            delay: Duration::from_millis(1),
            max_attempts: None,
        });
    let mut sink = RecordingSink::default();

    let report = SyncOrchestrator::new(&client, 1)
        .with_reference_time(Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap())
        .with_pacing(Duration::ZERO)
        .run(&buildings_only_catalog(), &TapState::default(), &mut sink)
        .await
        .unwrap();

    // Three throttled attempts, then the page arrives. The record is
    // emitted exactly once and the run is not partial.
    assert_eq!(client.transport().request_count(), 4);
    assert_eq!(sink.records_for("buildings").len(), 1);
    assert_eq!(report.failed_requests, 0);
    assert!(!report.is_partial());
}

#[tokio::test]
async fn test_bounded_retry_policy_degrades_to_failed_request() {
    let transport = ScriptedTransport::new(vec![
        Ok(FetchResponse::RateLimited),
        Ok(FetchResponse::RateLimited),
        Ok(FetchResponse::RateLimited),
    ]);
    let client = ApiClient::new(transport, "https://api".to_string(), "key".to_string())
        .with_retry_policy(RetryPolicy {
            delay: Duration::from_millis(1),
            max_attempts: Some(2),
        });
    let mut sink = RecordingSink::default();

    let report = SyncOrchestrator::new(&client, 1)
        .with_reference_time(Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap())
        .with_pacing(Duration::ZERO)
        .run(&buildings_only_catalog(), &TapState::default(), &mut sink)
        .await
        .unwrap();

    // Two retries were allowed after the first attempt, then the client
    // gave up and the orchestrator degraded the request to zero rows.
    assert_eq!(report.failed_requests, 1);
    assert!(report.is_partial());
    assert!(sink.records_for("buildings").is_empty());
}
