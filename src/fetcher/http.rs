//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{FetchResponse, FetcherError, FetcherResult, Transport};

/// Time to establish the TCP connection. The overall request timeout is left
/// to the transport's defaults.
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Production transport: one reqwest [`Client`] whose connection pool is
/// reused for every request of the run.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the transport. Fails if the TLS backend cannot be initialized.
    pub fn new() -> FetcherResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetcherError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        query: &[(&'static str, String)],
    ) -> FetcherResult<FetchResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        debug!(url = %url, params = query.len(), "issuing GET request");

        let response = request
            .send()
            .await
            .map_err(|e| FetcherError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(FetchResponse::RateLimited);
        }
        if !status.is_success() {
            return Err(FetcherError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetcherError::Parse(e.to_string()))?;

        let rows = body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                FetcherError::Parse("response body is missing the \"data\" array".to_string())
            })?;

        Ok(FetchResponse::Rows(rows))
    }
}
