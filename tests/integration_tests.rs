//! Integration tests for Research Gap Finder
//!
//! These tests run both API sources against local mockito servers and drive
//! the full search pipeline (retry, rate limit, cache, validation, dedup,
//! ranking) over real HTTP.

use mockito::{Matcher, Server};
use research_gap_finder::config::load_config_with;
use research_gap_finder::search::{AggregatorSettings, SearchAggregator};
use research_gap_finder::sources::{CrossRefSource, SemanticScholarSource, Source, SourceClient};
use research_gap_finder::utils::{current_year, HttpClient, RateLimiter, ResultCache, RetryPolicy};
use research_gap_finder::ResearchSession;
use std::sync::Arc;
use std::time::Duration;

const YEAR: i32 = 2024;

fn http() -> HttpClient {
    HttpClient::with_timeout(Duration::from_secs(5)).unwrap()
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::default().with_unit(Duration::from_millis(1))
}

const SEMANTIC_BODY: &str = r#"{
    "total": 3,
    "data": [
        {
            "paperId": "p1",
            "title": "Graph Neural Networks for Molecule Design",
            "authors": [{"name": "Ada Lovelace"}, {"name": "Alan Turing"}],
            "year": 2023,
            "venue": "NeurIPS",
            "abstract": "We propose a novel graph model.",
            "citationCount": 42,
            "externalIds": {"DOI": "10.1000/gnn"},
            "url": "https://www.semanticscholar.org/paper/p1"
        },
        {
            "paperId": "p2",
            "title": "Message Passing Revisited for Chemistry",
            "authors": [{"name": "Grace Hopper"}],
            "year": 2021,
            "venue": null,
            "citationCount": 7
        },
        {
            "paperId": "p3",
            "authors": [{"name": "Nobody"}],
            "year": 2022
        }
    ]
}"#;

const CROSSREF_BODY: &str = r#"{
    "status": "ok",
    "message": {
        "items": [
            {
                "title": ["Graph neural networks for molecule design!"],
                "author": [{"given": "Ada", "family": "Lovelace"}],
                "published-print": {"date-parts": [[2023, 5]]},
                "container-title": ["Journal of Chemical Information"],
                "is-referenced-by-count": 40,
                "DOI": "10.1000/gnn"
            },
            {
                "title": ["Equivariant Networks in Drug Discovery"],
                "author": [{"given": "Rosalind", "family": "Franklin"}],
                "published-online": {"date-parts": [[2022, 1, 3]]},
                "container-title": "Nature Machine Intelligence",
                "is-referenced-by-count": 15,
                "URL": "https://doi.org/10.1000/eq"
            }
        ]
    }
}"#;

#[tokio::test]
async fn test_semantic_scholar_request_and_normalization() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/paper/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "graph neural networks".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
        ]))
        .match_header("x-api-key", "s2-secret-key")
        .match_header("user-agent", Matcher::Regex("ResearchGapFinder/".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SEMANTIC_BODY)
        .create_async()
        .await;

    let source = SemanticScholarSource::with_client(http())
        .with_base_url(server.url())
        .with_api_key(Some("s2-secret-key".to_string()));

    let papers = source.search("graph neural networks", 5).await.unwrap();
    mock.assert_async().await;

    assert_eq!(papers.len(), 3);
    let first = &papers[0];
    assert_eq!(first.title, "Graph Neural Networks for Molecule Design");
    assert_eq!(first.authors, vec!["Ada Lovelace", "Alan Turing"]);
    assert_eq!(first.year, 2023);
    assert_eq!(first.venue, "NeurIPS");
    assert_eq!(first.citations, 42);
    assert_eq!(first.doi.as_deref(), Some("10.1000/gnn"));

    // Missing venue and abstract fall back to defaults
    assert_eq!(papers[1].venue, "Preprint");
    assert!(papers[1].r#abstract.is_empty());
    // Missing title survives parsing; validation rejects it later
    assert!(papers[2].title.is_empty());
}

#[tokio::test]
async fn test_crossref_request_and_normalization() {
    let mut server = Server::new_async().await;
    let filter = format!("from-pub-date:{}", current_year() - 5);
    let mock = server
        .mock("GET", "/works")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "molecule design".into()),
            Matcher::UrlEncoded("rows".into(), "10".into()),
            Matcher::UrlEncoded("filter".into(), filter),
            Matcher::UrlEncoded("mailto".into(), "lab@example.org".into()),
        ]))
        .match_header("crossref-plus-api-token", "Bearer plus-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CROSSREF_BODY)
        .create_async()
        .await;

    let source = CrossRefSource::with_client(http())
        .with_base_url(server.url())
        .with_mailto("lab@example.org")
        .with_api_key(Some("plus-token".to_string()));

    let papers = source.search("molecule design", 10).await.unwrap();
    mock.assert_async().await;

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].authors, vec!["Ada Lovelace"]);
    assert_eq!(papers[0].year, 2023);
    assert_eq!(papers[0].venue, "Journal of Chemical Information");
    // Year falls back to the online date; container title may be a bare string
    assert_eq!(papers[1].year, 2022);
    assert_eq!(papers[1].venue, "Nature Machine Intelligence");
    assert_eq!(papers[1].url.as_deref(), Some("https://doi.org/10.1000/eq"));
}

#[tokio::test]
async fn test_rate_limited_responses_retried_then_empty() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/paper/search")
        .match_query(Matcher::Any)
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let client = SourceClient::new(Arc::new(
        SemanticScholarSource::with_client(http()).with_base_url(server.url()),
    ))
    .with_retry(fast_retry());

    let papers = client.search("anything", 10).await;
    assert!(papers.is_empty());
    mock.assert_async().await;
    // Failures are never cached
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/works")
        .match_query(Matcher::Any)
        .with_status(400)
        .expect(1)
        .create_async()
        .await;

    let client = SourceClient::new(Arc::new(
        CrossRefSource::with_client(http()).with_base_url(server.url()),
    ))
    .with_retry(fast_retry());

    assert!(client.search("anything", 10).await.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cached_results_skip_http() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/paper/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SEMANTIC_BODY)
        .expect(1)
        .create_async()
        .await;

    let client = SourceClient::new(Arc::new(
        SemanticScholarSource::with_client(http()).with_base_url(server.url()),
    ))
    .with_cache(ResultCache::new(Duration::from_secs(60)))
    .with_current_year(YEAR);

    let first = client.search("graph neural networks", 5).await;
    let second = client.search("graph neural networks", 5).await;
    mock.assert_async().await;

    // The untitled record is rejected by validation
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_aggregated_search_over_http() {
    let mut semantic_server = Server::new_async().await;
    let mut crossref_server = Server::new_async().await;

    let semantic_mock = semantic_server
        .mock("GET", "/paper/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SEMANTIC_BODY)
        .expect(1)
        .create_async()
        .await;
    let crossref_mock = crossref_server
        .mock("GET", "/works")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CROSSREF_BODY)
        .expect(1)
        .create_async()
        .await;

    let semantic = SourceClient::new(Arc::new(
        SemanticScholarSource::with_client(http()).with_base_url(semantic_server.url()),
    ))
    .with_rate_limiter(Arc::new(RateLimiter::new(Duration::from_millis(10))))
    .with_retry(fast_retry())
    .with_current_year(YEAR);
    let crossref = SourceClient::new(Arc::new(
        CrossRefSource::with_client(http()).with_base_url(crossref_server.url()),
    ))
    .with_retry(fast_retry())
    .with_current_year(YEAR);

    let aggregator = SearchAggregator::new(semantic, crossref)
        .with_settings(AggregatorSettings {
            max_query_variants: 1,
            query_delay: Duration::ZERO,
            ..AggregatorSettings::default()
        })
        .with_current_year(YEAR);

    let papers = aggregator.search_topic("graph neural networks for chemistry").await;
    semantic_mock.assert_async().await;
    crossref_mock.assert_async().await;

    // Two valid Semantic Scholar papers, one Crossref duplicate, one new
    let titles: Vec<_> = papers.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(papers.len(), 3, "titles: {:?}", titles);
    assert!(titles.contains(&"Graph Neural Networks for Molecule Design"));
    assert!(titles.contains(&"Equivariant Networks in Drug Discovery"));
    assert!(papers
        .windows(2)
        .all(|w| w[0].relevance_score >= w[1].relevance_score));
}

#[tokio::test]
async fn test_session_from_config_file() {
    let mut semantic_server = Server::new_async().await;
    let mut crossref_server = Server::new_async().await;

    let _semantic = semantic_server
        .mock("GET", "/paper/search")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let _crossref = crossref_server
        .mock("GET", "/works")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CROSSREF_BODY)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("research-gap-finder.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[search]
rate_limit_seconds = 0.0
max_retries = 1
max_query_variants = 1
query_delay_seconds = 0.0
recent_years = 50

[endpoints]
semantic_scholar = "{}"
crossref = "{}"
"#,
            semantic_server.url(),
            crossref_server.url()
        ),
    )
    .unwrap();

    let config = load_config_with(Some(path.as_path()), |_| None).unwrap();
    let mut session = ResearchSession::from_config(&config).unwrap();

    // Semantic Scholar is down; Crossref still contributes
    let papers = session.find_papers("drug discovery networks").await;
    assert_eq!(papers.len(), 2);

    let graded = session.grade_papers(10);
    assert_eq!(graded.len(), 2);
    assert!(graded
        .iter()
        .all(|(_, score)| (0.0..=10.0).contains(&score.overall_score)));

    let gaps = session.analyze_gaps().await;
    assert!(!gaps.is_empty());
}
