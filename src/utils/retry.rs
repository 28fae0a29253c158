//! Retry utilities with exponential backoff for resilient API calls.

use std::time::Duration;
use tokio::time::sleep;

use super::StatusReporter;
use crate::sources::SourceError;

/// Upper bound on any single backoff sleep
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Exponential-backoff retry policy.
///
/// The wait after a failed attempt `n` (zero-based) is `unit * base^n`, so
/// the defaults wait 1s, 2s, 4s, ... between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Exponential base
    pub base: f64,
    /// Length of one backoff unit
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base: 2.0,
            unit: Duration::from_secs(1),
        }
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq)]
pub enum TransientError {
    /// Connection failure or other transport error
    Network,
    /// Request timed out
    Timeout,
    /// HTTP 429, with the server's Retry-After if it sent one
    RateLimited(Option<Duration>),
    /// HTTP 5xx
    ServerError(u16),
}

impl TransientError {
    /// Classify a SourceError; `None` means the failure is permanent
    pub fn from_source_error(err: &SourceError) -> Option<Self> {
        match err {
            SourceError::Network(_) => Some(TransientError::Network),
            SourceError::Timeout(_) => Some(TransientError::Timeout),
            SourceError::RateLimited { retry_after } => {
                Some(TransientError::RateLimited(*retry_after))
            }
            SourceError::Server { status, .. } => Some(TransientError::ServerError(*status)),
            _ => None,
        }
    }

    /// Minimum wait the error itself asks for
    pub fn recommended_delay(&self) -> Duration {
        match self {
            TransientError::RateLimited(Some(after)) => (*after).min(MAX_DELAY),
            _ => Duration::ZERO,
        }
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T> {
    /// Operation succeeded
    Success(T),
    /// Operation failed with a transient error on every attempt
    TransientFailure { error: SourceError, attempts: u32 },
    /// Operation failed with a permanent error
    PermanentFailure(SourceError),
}

impl<T> RetryResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }

    /// Convert into a plain Result, dropping the failure classification
    pub fn into_result(self) -> Result<T, SourceError> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::TransientFailure { error, .. } => Err(error),
            RetryResult::PermanentFailure(error) => Err(error),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base: f64) -> Self {
        Self {
            max_attempts,
            base,
            ..Self::default()
        }
    }

    /// Use a different backoff unit (tests shrink it to milliseconds)
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Backoff wait after failed attempt `attempt` (zero-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.unit.as_secs_f64() * self.base.powi(exponent);
        if !secs.is_finite() || secs > MAX_DELAY.as_secs_f64() {
            MAX_DELAY
        } else if secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Run `operation` until it succeeds, fails permanently or runs out of
    /// attempts
    pub async fn execute<T, F, Fut>(&self, operation: F) -> RetryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, SourceError>>,
    {
        self.execute_with(&StatusReporter::quiet(), operation).await
    }

    /// Same as [`execute`](Self::execute), reporting each scheduled retry
    pub async fn execute_with<T, F, Fut>(
        &self,
        status: &StatusReporter,
        mut operation: F,
    ) -> RetryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, SourceError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            "Operation succeeded on attempt {} after {} transient failures",
                            attempt + 1,
                            attempt
                        );
                    }
                    return RetryResult::Success(value);
                }
                Err(error) => {
                    let Some(transient) = TransientError::from_source_error(&error) else {
                        tracing::debug!("Permanent error on attempt {}: {}", attempt + 1, error);
                        return RetryResult::PermanentFailure(error);
                    };

                    if attempt + 1 >= max_attempts {
                        tracing::warn!(
                            "Operation failed after {} attempts: {}",
                            attempt + 1,
                            error
                        );
                        return RetryResult::TransientFailure {
                            error,
                            attempts: attempt + 1,
                        };
                    }

                    let delay = self.delay(attempt).max(transient.recommended_delay());
                    tracing::warn!(
                        "Transient error on attempt {}: {}, retrying in {:?}",
                        attempt + 1,
                        error,
                        delay
                    );
                    status.report(&format!(
                        "Retrying in {:.1}s (attempt {}/{})...",
                        delay.as_secs_f64(),
                        attempt + 2,
                        max_attempts
                    ));

                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
