//! Minimum-spacing rate limiter for quota-constrained APIs.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use super::StatusReporter;

/// Default spacing for Semantic Scholar's one-request-per-second quota
pub const DEFAULT_RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(1100);

/// Guarantees that no two permitted operations start less than `interval`
/// apart, across concurrent callers.
///
/// The lock is held across the wait, so callers are admitted one at a time
/// in lock-acquisition order. The first caller is never delayed.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_permitted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_permitted: Mutex::new(None),
        }
    }

    /// Build from a fractional number of seconds; negative or non-finite
    /// values disable spacing
    pub fn from_secs_f64(seconds: f64) -> Self {
        let interval = if seconds.is_finite() && seconds > 0.0 {
            Duration::from_secs_f64(seconds)
        } else {
            Duration::ZERO
        };
        Self::new(interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until it is safe to proceed, then record now as the last
    /// permitted time. Returns how long the caller waited.
    pub async fn acquire(&self) -> Duration {
        self.acquire_with(&StatusReporter::quiet()).await
    }

    /// Same as [`acquire`](Self::acquire), reporting the wait before sleeping
    pub async fn acquire_with(&self, status: &StatusReporter) -> Duration {
        let mut last = self.last_permitted.lock().await;

        let mut waited = Duration::ZERO;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                waited = self.interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", waited);
                status.report(&format!(
                    "Waiting {:.1}s for rate limit...",
                    waited.as_secs_f64()
                ));
                sleep(waited).await;
            }
        }

        *last = Some(Instant::now());
        waited
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT_INTERVAL)
    }
}
