//! Utility modules supporting the search pipeline.
//!
//! - [`RateLimiter`]: minimum spacing between requests to a quota-constrained API
//! - [`RetryPolicy`]: exponential backoff for transient failures
//! - [`ResultCache`]: time-stamped `(query, limit)` result cache
//! - [`HttpClient`]: reqwest client with a descriptive User-Agent and timeout
//! - [`deduplicate_papers`]: title-based deduplication
//! - [`PaperValidator`]: plausibility filter for paper records
//! - [`StatusReporter`]: observational progress callback
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use research_gap_finder::utils::{RetryPolicy, RetryResult};
//! use research_gap_finder::sources::SourceError;
//!
//! # async fn fetch() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() {
//! match RetryPolicy::default().execute(|| fetch()).await {
//!     RetryResult::Success(data) => println!("{}", data),
//!     RetryResult::TransientFailure { attempts, .. } => eprintln!("gave up after {}", attempts),
//!     RetryResult::PermanentFailure(e) => eprintln!("{}", e),
//! }
//! # }
//! ```

mod cache;
mod dedup;
mod http;
mod rate_limit;
mod retry;
mod status;
mod validate;

pub use cache::{CacheResult, ResultCache, DEFAULT_CACHE_DURATION};
pub use dedup::{deduplicate_papers, normalize_title, titles_match};
pub(crate) use http::status_error;
pub use http::{HttpClient, DEFAULT_REQUEST_TIMEOUT, USER_AGENT};
pub use rate_limit::{RateLimiter, DEFAULT_RATE_LIMIT_INTERVAL};
pub use retry::{RetryPolicy, RetryResult, TransientError};
pub use status::StatusReporter;
pub use validate::{current_year, PaperValidator, ValidationError, MIN_YEAR};
