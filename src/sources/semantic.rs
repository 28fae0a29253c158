//! Semantic Scholar research source implementation.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{Source, SourceError, MAX_AUTHORS_PER_PAPER};
use crate::utils::{status_error, HttpClient};

/// Default Semantic Scholar Graph API base
pub const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

const SEARCH_FIELDS: &str = "title,authors,year,venue,abstract,citationCount,externalIds,url";

/// Semantic Scholar research source
///
/// Uses the Graph API paper search endpoint. The unauthenticated quota is
/// roughly one request per second, so clients wrapping this source should
/// carry a [`RateLimiter`](crate::utils::RateLimiter).
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarSource {
    /// Create a new Semantic Scholar source against the public API
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(HttpClient::new()?))
    }

    /// Create with an existing HTTP client
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client,
            base_url: SEMANTIC_API_BASE.to_string(),
            api_key: None,
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send `x-api-key` with every request (optional, for higher rate limits)
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct S2Paper {
    title: Option<String>,
    authors: Option<Vec<S2Author>>,
    year: Option<i32>,
    venue: Option<String>,
    r#abstract: Option<String>,
    citation_count: Option<u32>,
    external_ids: Option<S2ExternalIds>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

impl S2Paper {
    fn into_paper(self) -> Paper {
        let authors = self
            .authors
            .unwrap_or_default()
            .into_iter()
            .take(MAX_AUTHORS_PER_PAPER)
            .map(|a| a.name.unwrap_or_else(|| "Unknown".to_string()));

        let mut builder = PaperBuilder::new(
            self.title.unwrap_or_default().trim(),
            self.year.unwrap_or(0),
            SourceType::SemanticScholar,
        )
        .authors(authors)
        .venue(self.venue.unwrap_or_default())
        .abstract_text(self.r#abstract.unwrap_or_default())
        .citations(self.citation_count.unwrap_or(0));

        if let Some(doi) = self.external_ids.and_then(|ids| ids.doi) {
            builder = builder.doi(doi);
        }
        if let Some(url) = self.url {
            builder = builder.url(url);
        }
        builder.build()
    }
}

/// Normalize a `/paper/search` response body, dropping malformed items
pub(crate) fn parse_search_response(body: &Value) -> Vec<Paper> {
    let Some(items) = body.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match S2Paper::deserialize(item) {
            Ok(raw) => Some(raw.into_paper()),
            Err(e) => {
                tracing::warn!("Skipping malformed Semantic Scholar record: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl Source for SemanticScholarSource {
    fn id(&self) -> &str {
        "semantic"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Paper>, SourceError> {
        let url = format!("{}/paper/search", self.base_url);
        let limit = limit.to_string();

        let mut request = self
            .client
            .client()
            .get(&url)
            .query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("fields", SEARCH_FIELDS),
                ("offset", "0"),
            ])
            .header(ACCEPT, "application/json");

        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(status_error(&response));
        }

        let body: Value = response.json().await?;
        Ok(parse_search_response(&body))
    }
}
