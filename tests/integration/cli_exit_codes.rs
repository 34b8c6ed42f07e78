//! Binary-level tests: discover output and the exit-code contract

use assert_cmd::Command;
use std::io::Write;

fn tap() -> Command {
    Command::cargo_bin("tap-flexopus").unwrap()
}

#[test]
fn test_discover_prints_a_parseable_catalog() {
    let output = tap().arg("discover").assert().success().get_output().clone();

    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let streams = catalog["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 3);
    assert_eq!(streams[0]["tap_stream_id"], "buildings");
    assert_eq!(streams[2]["replication_key"], "updated_at");
}

#[test]
fn test_sync_with_missing_config_file_exits_with_config_code() {
    tap()
        .args(["sync", "--config", "/nonexistent/config.json"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_sync_with_malformed_start_date_exits_with_config_code() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config
        .write_all(
            br#"{
                "base_url": "https://example.flexopus.com/api/v1",
                "api_key": "secret",
                "start_date": "2023.02.01"
            }"#,
        )
        .unwrap();

    tap()
        .args(["sync", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_sync_with_empty_api_key_exits_with_config_code() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config
        .write_all(
            br#"{
                "base_url": "https://example.flexopus.com/api/v1",
                "api_key": "",
                "start_date": "2023-02-01"
            }"#,
        )
        .unwrap();

    tap()
        .args(["sync", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .code(2);
}
