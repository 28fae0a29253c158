//! Resilient wrapper composing rate limiting, retry, caching and validation
//! around a [`Source`].

use std::sync::Arc;

use super::Source;
use crate::models::Paper;
use crate::utils::{
    current_year, CacheResult, PaperValidator, RateLimiter, ResultCache, RetryPolicy,
    RetryResult, StatusReporter,
};

/// A source plus everything needed to query it politely.
///
/// `search` never fails: exhausted retries and permanent errors are logged
/// and produce an empty list, which callers must treat as "no results".
#[derive(Debug)]
pub struct SourceClient {
    source: Arc<dyn Source>,
    rate_limiter: Option<Arc<RateLimiter>>,
    retry: RetryPolicy,
    cache: ResultCache,
    current_year: Option<i32>,
}

impl SourceClient {
    /// Wrap `source` with the default retry policy and cache and no rate limit
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self {
            source,
            rate_limiter: None,
            retry: RetryPolicy::default(),
            cache: ResultCache::default(),
            current_year: None,
        }
    }

    /// Acquire `limiter` before every network attempt, retries included
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = cache;
        self
    }

    /// Validate against a fixed year instead of the calendar year
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn id(&self) -> &str {
        self.source.id()
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Whether requests go through a rate limiter
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limiter.is_some()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Search without progress reporting
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Paper> {
        self.search_reported(query, limit, &StatusReporter::quiet())
            .await
    }

    /// Search, reporting progress through `status`
    pub async fn search_reported(
        &self,
        query: &str,
        limit: usize,
        status: &StatusReporter,
    ) -> Vec<Paper> {
        match self.cache.get(query, limit) {
            CacheResult::Hit(papers) => {
                tracing::debug!("Returning cached {} results for: {}", self.name(), query);
                return papers;
            }
            CacheResult::Expired => {
                tracing::debug!("Cached {} results expired for: {}", self.name(), query);
            }
            CacheResult::Miss => {}
        }

        let source = &self.source;
        let limiter = self.rate_limiter.as_deref();
        let result = self
            .retry
            .execute_with(status, || async move {
                if let Some(limiter) = limiter {
                    limiter.acquire_with(status).await;
                }
                status.report(&format!("Searching {}...", source.name()));
                source.search(query, limit).await
            })
            .await;

        match result {
            RetryResult::Success(raw) => {
                let year = self.current_year.unwrap_or_else(current_year);
                let received = raw.len();
                let papers: Vec<Paper> = raw
                    .into_iter()
                    .filter(|paper| PaperValidator::validate_at(paper, year))
                    .collect();

                tracing::info!(
                    "Found {} valid papers ({} received) from {} for: {}",
                    papers.len(),
                    received,
                    self.name(),
                    query
                );
                self.cache.put(query, limit, papers.clone());
                papers
            }
            RetryResult::TransientFailure { error, attempts } => {
                tracing::warn!(
                    "{} search for \"{}\" failed after {} attempts: {}",
                    self.name(),
                    query,
                    attempts,
                    error
                );
                Vec::new()
            }
            RetryResult::PermanentFailure(error) => {
                tracing::warn!("{} search for \"{}\" failed: {}", self.name(), query, error);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceType;
    use crate::sources::mock::{make_paper, MockSource};
    use crate::sources::SourceError;
    use std::time::Duration;
    use tokio::time::Instant;

    const YEAR: i32 = 2024;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::default().with_unit(Duration::from_millis(1))
    }

    fn valid(title: &str) -> Paper {
        make_paper(title, 2020, 5, SourceType::SemanticScholar)
    }

    #[tokio::test]
    async fn test_invalid_papers_are_dropped() {
        let mock = Arc::new(MockSource::new("mock").with_papers(vec![
            valid("A Perfectly Valid Paper"),
            make_paper("Paper From The Future", 2099, 0, SourceType::SemanticScholar),
            make_paper("Short", 2020, 0, SourceType::SemanticScholar),
        ]));
        let client = SourceClient::new(mock).with_current_year(YEAR);

        let papers = client.search("q", 10).await;
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "A Perfectly Valid Paper");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_source() {
        let mock = Arc::new(MockSource::new("mock").with_papers(vec![valid("A Cached Valid Paper")]));
        let client = SourceClient::new(mock.clone()).with_current_year(YEAR);

        let first = client.search("q", 10).await;
        let second = client.search("q", 10).await;
        assert_eq!(first, second);
        assert_eq!(mock.call_count(), 1);

        client.search("q", 11).await;
        assert_eq!(mock.call_count(), 2);
        assert_eq!(client.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_calls_source() {
        let mock = Arc::new(MockSource::new("mock"));
        let client = SourceClient::new(mock.clone()).with_cache(ResultCache::disabled());

        client.search("q", 10).await;
        client.search("q", 10).await;
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_transient_errors_retried_then_succeed() {
        let mock = Arc::new(MockSource::new("mock").with_papers(vec![valid("Eventually Found Paper")]));
        mock.push_response(Err(SourceError::RateLimited { retry_after: None }));
        mock.push_response(Err(SourceError::Timeout("slow".into())));

        let client = SourceClient::new(mock.clone())
            .with_retry(fast_retry())
            .with_current_year(YEAR);

        let papers = client.search("q", 10).await;
        assert_eq!(papers.len(), 1);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_yield_empty_and_are_not_cached() {
        let mock = Arc::new(
            MockSource::new("mock").failing(|| SourceError::RateLimited { retry_after: None }),
        );
        let client = SourceClient::new(mock.clone()).with_retry(fast_retry());

        assert!(client.search("q", 10).await.is_empty());
        assert_eq!(mock.call_count(), 3);
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let mock = Arc::new(MockSource::new("mock").failing(|| SourceError::Api("HTTP 400".into())));
        let client = SourceClient::new(mock.clone()).with_retry(fast_retry());

        assert!(client.search("q", 10).await.is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_spaces_every_attempt() {
        let mock = Arc::new(MockSource::new("mock").failing(|| SourceError::Network("down".into())));
        let client = SourceClient::new(mock.clone())
            .with_rate_limiter(Arc::new(RateLimiter::new(Duration::from_secs(5))))
            .with_retry(RetryPolicy::default().with_unit(Duration::from_millis(100)));

        let start = Instant::now();
        client.search("q", 10).await;

        // Attempts at 0s, 5s and 10s: the limiter dominates the short backoff
        assert_eq!(mock.call_count(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_status_messages_reported() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let status = StatusReporter::new(move |msg| sink.lock().unwrap().push(msg.to_string()));

        let client = SourceClient::new(Arc::new(MockSource::new("mock")));
        client.search_reported("q", 10, &status).await;

        assert_eq!(*seen.lock().unwrap(), vec!["Searching mock..."]);
    }
}
