//! Academic search sources.
//!
//! A [`Source`] performs a single search request against one external
//! database and normalizes the response into [`Paper`]s. It does not retry,
//! rate limit, cache or validate; [`SourceClient`] composes those concerns
//! around any `Source`:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use research_gap_finder::sources::{SemanticScholarSource, SourceClient};
//! use research_gap_finder::utils::{RateLimiter, RetryPolicy, ResultCache};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), research_gap_finder::sources::SourceError> {
//! let client = SourceClient::new(Arc::new(SemanticScholarSource::new()?))
//!     .with_rate_limiter(Arc::new(RateLimiter::default()))
//!     .with_retry(RetryPolicy::default())
//!     .with_cache(ResultCache::default());
//!
//! // Never fails: exhausted retries and permanent errors yield an empty list
//! let papers = client.search("graph neural networks", 20).await;
//! # Ok(())
//! # }
//! ```
//!
//! Two sources ship with the crate:
//!
//! | Source | Quota | Endpoint |
//! |--------|-------|----------|
//! | [`SemanticScholarSource`] | ~1 request/second | `/graph/v1/paper/search` |
//! | [`CrossRefSource`] | none enforced | `/works` |

use async_trait::async_trait;
use std::time::Duration;

use crate::models::Paper;

mod client;
mod crossref;
pub mod mock;
mod semantic;

pub use client::SourceClient;
pub use crossref::{CrossRefSource, CROSSREF_API_BASE, DEFAULT_MAILTO};
pub use semantic::{SemanticScholarSource, SEMANTIC_API_BASE};

/// Upper bound on authors kept per paper
pub const MAX_AUTHORS_PER_PAPER: usize = 10;

/// A single external academic database.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "semantic", "crossref")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Issue one search request and normalize the returned records.
    ///
    /// Malformed records are dropped individually; the call fails only when
    /// the request itself fails or the response body cannot be read.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Paper>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Connection or other transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// HTTP 429
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    /// HTTP 5xx
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Any other non-success response
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
