//! HTTP access to the Flexopus API
//!
//! [`ApiClient`] issues one authenticated GET per unit of work and owns the
//! rate-limit retry loop: a 429 response is not an error but a retry trigger,
//! by default retried after 60 seconds, indefinitely. Everything else that
//! goes wrong at the transport level is logged at error severity and surfaced
//! as an error the orchestrator degrades to "no rows for this request".
//!
//! The [`Transport`] trait is the seam between the retry loop and the actual
//! HTTP stack; [`HttpTransport`] backs it with reqwest, and tests script it
//! with canned response sequences.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::window::Window;

mod http;

pub use http::HttpTransport;

/// Fixed delay between rate-limited attempts. The API publishes a
/// per-minute quota, so one minute is always enough for it to reset.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(60);

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Request-level failure (connect, timeout, TLS, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success, non-429 HTTP status
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Request URL
        url: String,
    },

    /// Response body did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Bounded retry policy gave up on a persistently rate-limited request
    #[error("rate limit retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// Number of rate-limited attempts made
        attempts: u32,
    },
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// What a single request produced, as seen by the retry loop.
#[derive(Debug, Clone)]
pub enum FetchResponse {
    /// Successful response: the rows under the body's `data` key
    Rows(Vec<Value>),
    /// HTTP 429; the identical request should be retried after a delay
    RateLimited,
}

/// One GET request against the API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single GET. Rate limiting is reported as
    /// [`FetchResponse::RateLimited`], not as an error.
    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        query: &[(&'static str, String)],
    ) -> FetcherResult<FetchResponse>;
}

/// Backoff behavior for rate-limited requests.
///
/// The default (60 seconds, unbounded) matches the API contract the tap was
/// built against: the API is assumed eventually available, and waiting out a
/// throttle is preferred over failing a multi-hour sync. `max_attempts`
/// bounds the loop for callers that want a deadline, and tests shrink
/// `delay` to keep the loop observable without real sleeping.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay between rate-limited attempts
    pub delay: Duration,
    /// Maximum number of rate-limited attempts before giving up;
    /// `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            delay: RATE_LIMIT_DELAY,
            max_attempts: None,
        }
    }
}

/// Authenticated access to one Flexopus deployment.
///
/// Holds the per-run session: one transport (and its connection pool) is
/// created when the run starts, shared by reference across every request,
/// and dropped when the run ends.
pub struct ApiClient<T: Transport> {
    transport: T,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl<T: Transport> ApiClient<T> {
    /// Create a client with the default retry policy.
    pub fn new(transport: T, base_url: String, api_key: String) -> Self {
        ApiClient {
            transport,
            base_url,
            api_key,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the rate-limit retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("authorization", format!("Bearer {}", self.api_key)),
            ("accept", "application/json".to_string()),
        ]
    }

    /// Fetch one page of rows from `endpoint`, retrying the identical
    /// request for as long as the policy allows while the API rate-limits.
    ///
    /// Transport failures are logged here and returned; the caller treats
    /// them as "no rows for this request" rather than aborting the sync.
    pub async fn fetch_rows(
        &self,
        endpoint: &str,
        window: Option<&Window>,
    ) -> FetcherResult<Vec<Value>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = self.headers();
        let query = window.map(|w| w.query_params()).unwrap_or_default();

        let mut attempts: u32 = 0;
        loop {
            match self.transport.get(&url, &headers, &query).await {
                Ok(FetchResponse::Rows(rows)) => {
                    debug!(url = %url, rows = rows.len(), attempts, "request succeeded");
                    return Ok(rows);
                }
                Ok(FetchResponse::RateLimited) => {
                    attempts += 1;
                    if let Some(max) = self.retry.max_attempts {
                        if attempts > max {
                            return Err(FetcherError::RetriesExhausted { attempts });
                        }
                    }
                    warn!(
                        url = %url,
                        attempts,
                        delay_ms = self.retry.delay.as_millis() as u64,
                        "rate limited, retrying identical request after delay"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(e) => {
                    error!(url = %url, error = %e, "request failed");
                    return Err(e);
                }
            }
        }
    }
}
