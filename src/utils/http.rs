//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::sources::SourceError;

/// Descriptive User-Agent sent with every request
pub const USER_AGENT: &str = concat!(
    "ResearchGapFinder/",
    env!("CARGO_PKG_VERSION"),
    " (Academic Research Tool)"
);

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a client with the default user agent and timeout
    pub fn new() -> Result<Self, SourceError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with the default user agent and a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, SourceError> {
        Self::build(USER_AGENT, timeout)
    }

    /// Create a client with a custom user agent
    pub fn build(user_agent: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Wrap an existing reqwest Client
    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Parse a Retry-After header given in whole seconds
pub(crate) fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Map a non-success status to the matching SourceError
pub(crate) fn status_error(response: &reqwest::Response) -> SourceError {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        SourceError::RateLimited {
            retry_after: retry_after(response.headers()),
        }
    } else if status.is_server_error() {
        SourceError::Server {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("server error").to_string(),
        }
    } else {
        SourceError::Api(format!("HTTP {}", status))
    }
}
