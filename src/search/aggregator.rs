//! Multi-query, multi-source search orchestration.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::queries::{generate_query_variants, generate_query_variants_with};
use super::ranking::{rank_by_relevance, rank_recent};
use crate::config::{Config, SearchSettings};
use crate::llm::TextGenerator;
use crate::models::Paper;
use crate::sources::{CrossRefSource, SemanticScholarSource, SourceClient, SourceError};
use crate::utils::{
    current_year, deduplicate_papers, HttpClient, RateLimiter, ResultCache, RetryPolicy,
    StatusReporter,
};

/// Tunables for [`SearchAggregator`]
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorSettings {
    /// Papers returned after ranking
    pub max_results: usize,
    /// Limit passed to each source per query
    pub per_source_limit: usize,
    /// Query variants actually searched per topic
    pub max_query_variants: usize,
    /// Pause between consecutive query variants
    pub query_delay: Duration,
    /// Window used by [`SearchAggregator::find_recent_papers`]
    pub recent_years: i32,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            max_results: 20,
            per_source_limit: 20,
            max_query_variants: 3,
            query_delay: Duration::from_millis(1500),
            recent_years: 5,
        }
    }
}

impl From<&SearchSettings> for AggregatorSettings {
    fn from(settings: &SearchSettings) -> Self {
        let query_delay = if settings.query_delay_seconds.is_finite()
            && settings.query_delay_seconds > 0.0
        {
            Duration::from_secs_f64(settings.query_delay_seconds)
        } else {
            Duration::ZERO
        };

        Self {
            max_results: settings.max_results,
            per_source_limit: settings.per_source_limit,
            max_query_variants: settings.max_query_variants,
            query_delay,
            recent_years: settings.recent_years,
        }
    }
}

/// Fans topic searches out to every client, then deduplicates and ranks.
///
/// Clients are queried one after another in the order given, so a
/// quota-constrained client placed first is never raced by the others.
/// A client that fails contributes nothing; if every client fails the
/// result is an empty list.
pub struct SearchAggregator {
    clients: Vec<SourceClient>,
    settings: AggregatorSettings,
    generator: Option<Arc<dyn TextGenerator>>,
    status: StatusReporter,
    current_year: Option<i32>,
}

impl std::fmt::Debug for SearchAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAggregator")
            .field("clients", &self.clients)
            .field("settings", &self.settings)
            .field("generator", &self.generator.is_some())
            .finish()
    }
}

impl SearchAggregator {
    /// Aggregate over a quota-constrained and an unconstrained client
    pub fn new(constrained: SourceClient, unconstrained: SourceClient) -> Self {
        Self::from_clients(vec![constrained, unconstrained])
    }

    /// Aggregate over `clients`, queried in order
    pub fn from_clients(clients: Vec<SourceClient>) -> Self {
        Self {
            clients,
            settings: AggregatorSettings::default(),
            generator: None,
            status: StatusReporter::quiet(),
            current_year: None,
        }
    }

    /// Build Semantic Scholar (rate limited) and CrossRef clients from config
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let search = &config.search;
        let http = HttpClient::with_timeout(Duration::from_secs(search.request_timeout_seconds))?;
        let retry = RetryPolicy::new(search.max_retries, search.retry_backoff_base);
        let cache = || {
            if search.cache_enabled {
                ResultCache::new(Duration::from_secs(search.cache_duration_seconds))
            } else {
                ResultCache::disabled()
            }
        };

        let semantic = SemanticScholarSource::with_client(http.clone())
            .with_base_url(&config.endpoints.semantic_scholar)
            .with_api_key(config.api_keys.semantic_scholar.clone());
        let crossref = CrossRefSource::with_client(http)
            .with_base_url(&config.endpoints.crossref)
            .with_mailto(&config.endpoints.mailto)
            .with_api_key(config.api_keys.crossref.clone());

        let constrained = SourceClient::new(Arc::new(semantic))
            .with_rate_limiter(Arc::new(RateLimiter::from_secs_f64(search.rate_limit_seconds)))
            .with_retry(retry)
            .with_cache(cache());
        let unconstrained = SourceClient::new(Arc::new(crossref))
            .with_retry(retry)
            .with_cache(cache());

        Ok(Self::new(constrained, unconstrained).with_settings(AggregatorSettings::from(search)))
    }

    pub fn with_settings(mut self, settings: AggregatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use `generator` to propose extra query variants
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_status(mut self, status: StatusReporter) -> Self {
        self.status = status;
        self
    }

    /// Rank against a fixed year instead of the calendar year
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    pub fn clients(&self) -> &[SourceClient] {
        &self.clients
    }

    fn year(&self) -> i32 {
        self.current_year.unwrap_or_else(current_year)
    }

    /// Query variants for `topic`, including generator proposals if available
    pub async fn query_variants(&self, topic: &str) -> Vec<String> {
        match &self.generator {
            Some(generator) => generate_query_variants_with(topic, generator.as_ref()).await,
            None => generate_query_variants(topic),
        }
    }

    /// One query across every client, deduplicated and ranked
    pub async fn search_query(&self, query: &str) -> Vec<Paper> {
        let papers = self.fetch_all(query).await;
        let unique = deduplicate_papers(papers);
        rank_by_relevance(unique, self.year(), self.settings.max_results)
    }

    /// Search every query variant of `topic`, deduplicated and ranked by
    /// relevance
    pub async fn search_topic(&self, topic: &str) -> Vec<Paper> {
        let unique = self.collect_topic(topic).await;
        let ranked = rank_by_relevance(unique, self.year(), self.settings.max_results);
        tracing::info!("Returning {} unique papers for topic: {}", ranked.len(), topic);
        ranked
    }

    /// Like [`search_topic`](Self::search_topic), restricted to the recent
    /// window and ordered by (year, citations) descending
    pub async fn find_recent_papers(&self, topic: &str) -> Vec<Paper> {
        let unique = self.collect_topic(topic).await;
        let year = self.year();
        let scored = rank_by_relevance(unique, year, usize::MAX);
        let recent = rank_recent(
            scored,
            year,
            self.settings.recent_years,
            self.settings.max_results,
        );
        tracing::info!("Found {} recent papers for topic: {}", recent.len(), topic);
        recent
    }

    /// Run the variant loop and return the deduplicated accumulation
    async fn collect_topic(&self, topic: &str) -> Vec<Paper> {
        let variants = self.query_variants(topic).await;
        let used: Vec<&String> = variants
            .iter()
            .take(self.settings.max_query_variants)
            .collect();

        self.status.report(&format!(
            "Generated {} search queries for '{}'",
            variants.len(),
            topic
        ));

        let mut accumulated = Vec::new();
        for (i, query) in used.iter().enumerate() {
            self.status.report(&format!(
                "Searching with query {}/{}: '{}'",
                i + 1,
                used.len(),
                query
            ));

            let papers = self.fetch_all(query).await;
            tracing::debug!("Query '{}' returned {} papers", query, papers.len());
            accumulated.extend(papers);

            if i + 1 < used.len() && !self.settings.query_delay.is_zero() {
                self.status.report("Brief pause between queries...");
                sleep(self.settings.query_delay).await;
            }
        }

        let total = accumulated.len();
        let unique = deduplicate_papers(accumulated);
        tracing::info!(
            "Collected {} papers ({} unique) for topic: {}",
            total,
            unique.len(),
            topic
        );
        unique
    }

    /// Query every client in order, concatenating their results
    async fn fetch_all(&self, query: &str) -> Vec<Paper> {
        let mut papers = Vec::new();
        for client in &self.clients {
            let found = client
                .search_reported(query, self.settings.per_source_limit, &self.status)
                .await;
            self.status
                .report(&format!("{}: {} papers found", client.name(), found.len()));
            papers.extend(found);
        }
        papers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceType;
    use crate::sources::mock::{make_paper, MockSource};
    use crate::sources::SourceError;
    use tokio::time::Instant;

    const YEAR: i32 = 2024;

    fn settings() -> AggregatorSettings {
        AggregatorSettings {
            query_delay: Duration::ZERO,
            ..AggregatorSettings::default()
        }
    }

    fn client(mock: Arc<MockSource>) -> SourceClient {
        SourceClient::new(mock)
            .with_retry(RetryPolicy::default().with_unit(Duration::from_millis(1)))
            .with_current_year(YEAR)
    }

    #[tokio::test]
    async fn test_all_sources_empty_yields_empty() {
        let a = Arc::new(MockSource::new("constrained"));
        let b = Arc::new(MockSource::new("unconstrained"));
        let aggregator = SearchAggregator::new(client(a.clone()), client(b.clone()))
            .with_settings(settings())
            .with_current_year(YEAR);

        let papers = aggregator.search_topic("gap_finder_test").await;
        assert!(papers.is_empty());
        // Three variants searched, each against both clients
        assert_eq!(a.call_count(), 3);
        assert_eq!(b.call_count(), 3);
    }

    #[tokio::test]
    async fn test_dedup_validation_and_ranking_end_to_end() {
        let constrained = Arc::new(MockSource::new("constrained").with_papers(vec![
            make_paper("Transformers for Protein Structure", 2023, 40, SourceType::SemanticScholar),
            make_paper("Graph Kernels Revisited Again", 2015, 900, SourceType::SemanticScholar),
            make_paper("Sparse Attention in Genomics", 2020, 3, SourceType::SemanticScholar),
            make_paper("Paper From Before Time", 1850, 0, SourceType::SemanticScholar),
        ]));
        let unconstrained = Arc::new(MockSource::new("unconstrained").with_papers(vec![
            make_paper("transformers for protein structure", 2023, 41, SourceType::CrossRef),
            make_paper("Transformers for Protein Structure!", 2023, 40, SourceType::CrossRef),
        ]));

        let aggregator = SearchAggregator::new(client(constrained), client(unconstrained))
            .with_settings(settings())
            .with_current_year(YEAR);

        let papers = aggregator.search_topic("protein structure").await;
        assert_eq!(papers.len(), 3);
        assert!(papers
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert!(papers.iter().all(|p| p.source == SourceType::SemanticScholar));
        assert!(papers.iter().all(|p| p.year != 1850));
    }

    #[tokio::test]
    async fn test_failing_source_does_not_abort() {
        let broken = Arc::new(
            MockSource::new("broken").failing(|| SourceError::Network("unreachable".into())),
        );
        let healthy = Arc::new(MockSource::new("healthy").with_papers(vec![make_paper(
            "A Healthy Source Paper",
            2022,
            10,
            SourceType::CrossRef,
        )]));

        let aggregator = SearchAggregator::new(client(broken), client(healthy))
            .with_settings(settings())
            .with_current_year(YEAR);

        let papers = aggregator.search_topic("resilience").await;
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "A Healthy Source Paper");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_variants() {
        let a = Arc::new(MockSource::new("a"));
        let b = Arc::new(MockSource::new("b"));
        let aggregator = SearchAggregator::new(client(a), client(b)).with_settings(AggregatorSettings {
            query_delay: Duration::from_millis(1500),
            ..AggregatorSettings::default()
        });

        let start = Instant::now();
        aggregator.search_topic("robotics").await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_variants_searched_in_order() {
        let a = Arc::new(MockSource::new("a"));
        let aggregator = SearchAggregator::from_clients(vec![client(a.clone())])
            .with_settings(settings());

        aggregator.search_topic("robotics").await;
        let queries: Vec<_> = a.calls().into_iter().map(|(q, _)| q).collect();
        assert_eq!(
            queries,
            vec!["robotics", "robotics recent advances", "robotics systematic review"]
        );
    }

    #[tokio::test]
    async fn test_find_recent_papers() {
        let source = Arc::new(MockSource::new("a").with_papers(vec![
            make_paper("An Older Landmark Study", 2015, 5000, SourceType::CrossRef),
            make_paper("A Recent Modest Study", 2023, 2, SourceType::CrossRef),
            make_paper("A Recent Popular Study", 2023, 30, SourceType::CrossRef),
            make_paper("A Boundary Year Study", 2019, 100, SourceType::CrossRef),
        ]));
        let aggregator = SearchAggregator::from_clients(vec![client(source)])
            .with_settings(settings())
            .with_current_year(YEAR);

        let papers = aggregator.find_recent_papers("study").await;
        let titles: Vec<_> = papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["A Recent Popular Study", "A Recent Modest Study", "A Boundary Year Study"]
        );
        assert!(papers.iter().all(|p| p.relevance_score > 0.0));
    }

    #[tokio::test]
    async fn test_search_query_single_round() {
        let a = Arc::new(MockSource::new("a").with_papers(vec![make_paper(
            "Single Round Paper Title",
            2021,
            1,
            SourceType::CrossRef,
        )]));
        let aggregator = SearchAggregator::from_clients(vec![client(a.clone())])
            .with_current_year(YEAR);

        let papers = aggregator.search_query("anything").await;
        assert_eq!(papers.len(), 1);
        assert_eq!(a.call_count(), 1);
    }
}
