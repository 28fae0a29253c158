//! CrossRef research source implementation.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{Source, SourceError, MAX_AUTHORS_PER_PAPER};
use crate::utils::{current_year, status_error, HttpClient};

/// Default CrossRef REST API base
pub const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// Contact address sent as `mailto` (CrossRef "polite pool")
pub const DEFAULT_MAILTO: &str = "research-gap-finder@example.com";

const SELECT_FIELDS: &str =
    "title,author,published-print,container-title,abstract,is-referenced-by-count,DOI,URL";

/// Only works published within this many years are requested
const RECENT_WINDOW_YEARS: i32 = 5;

/// CrossRef research source
///
/// Uses the `/works` search endpoint, restricted to recent publications.
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: HttpClient,
    base_url: String,
    mailto: String,
    api_key: Option<String>,
}

impl CrossRefSource {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(HttpClient::new()?))
    }

    /// Create with an existing HTTP client
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client,
            base_url: CROSSREF_API_BASE.to_string(),
            mailto: DEFAULT_MAILTO.to_string(),
            api_key: None,
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_mailto(mut self, mailto: impl Into<String>) -> Self {
        self.mailto = mailto.into();
        self
    }

    /// Metadata Plus token, sent as `Crossref-Plus-API-Token`
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }
}

/// CrossRef returns some text fields either as a string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    One(String),
    Many(Vec<String>),
}

impl TextField {
    fn into_first(self) -> String {
        match self {
            TextField::One(s) => s,
            TextField::Many(v) => v.into_iter().next().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CrDate {
    #[serde(rename = "date-parts")]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl CrDate {
    fn year(&self) -> Option<i32> {
        self.date_parts
            .first()
            .and_then(|parts| parts.first().copied().flatten())
            .filter(|year| *year != 0)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CrAuthor {
    given: Option<String>,
    family: Option<String>,
}

impl CrAuthor {
    fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.given.as_deref().unwrap_or(""),
            self.family.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CrItem {
    title: Option<TextField>,
    author: Option<Vec<CrAuthor>>,
    #[serde(rename = "published-print")]
    published_print: Option<CrDate>,
    #[serde(rename = "published-online")]
    published_online: Option<CrDate>,
    created: Option<CrDate>,
    #[serde(rename = "container-title")]
    container_title: Option<TextField>,
    r#abstract: Option<String>,
    #[serde(rename = "is-referenced-by-count")]
    is_referenced_by_count: Option<u32>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
}

impl CrItem {
    /// Print date, then online date, then record creation date
    fn year(&self) -> i32 {
        [&self.published_print, &self.published_online, &self.created]
            .into_iter()
            .flatten()
            .find_map(CrDate::year)
            .unwrap_or(0)
    }

    fn into_paper(self) -> Paper {
        let year = self.year();
        let title = self.title.map(TextField::into_first).unwrap_or_default();
        let authors = self
            .author
            .unwrap_or_default()
            .iter()
            .take(MAX_AUTHORS_PER_PAPER)
            .map(CrAuthor::display_name)
            .collect::<Vec<_>>();

        let mut builder = PaperBuilder::new(title.trim(), year, SourceType::CrossRef)
            .authors(authors)
            .venue(
                self.container_title
                    .map(TextField::into_first)
                    .unwrap_or_default(),
            )
            .abstract_text(self.r#abstract.unwrap_or_default())
            .citations(self.is_referenced_by_count.unwrap_or(0));

        if let Some(doi) = self.doi {
            builder = builder.doi(doi);
        }
        if let Some(url) = self.url {
            builder = builder.url(url);
        }
        builder.build()
    }
}

/// Normalize a `/works` response body, dropping malformed items
pub(crate) fn parse_works_response(body: &Value) -> Vec<Paper> {
    let Some(items) = body
        .get("message")
        .and_then(|m| m.get("items"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match CrItem::deserialize(item) {
            Ok(raw) => Some(raw.into_paper()),
            Err(e) => {
                tracing::warn!("Skipping malformed CrossRef record: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl Source for CrossRefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "Crossref"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Paper>, SourceError> {
        let url = format!("{}/works", self.base_url);
        let rows = limit.to_string();
        let filter = format!("from-pub-date:{}", current_year() - RECENT_WINDOW_YEARS);

        let mut request = self
            .client
            .client()
            .get(&url)
            .query(&[
                ("query", query),
                ("rows", rows.as_str()),
                ("select", SELECT_FIELDS),
                ("filter", filter.as_str()),
                ("mailto", self.mailto.as_str()),
            ])
            .header(ACCEPT, "application/json");

        if let Some(key) = &self.api_key {
            request = request.header("Crossref-Plus-API-Token", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(status_error(&response));
        }

        let body: Value = response.json().await?;
        Ok(parse_works_response(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_list_fields_and_authors() {
        let body = json!({
            "status": "ok",
            "message": {
                "items": [{
                    "title": ["Federated Learning in Hospitals"],
                    "author": [
                        {"given": "Grace", "family": "Hopper"},
                        {"family": "Turing"},
                        {"name": "Consortium"}
                    ],
                    "published-print": {"date-parts": [[2021, 3, 1]]},
                    "container-title": ["Journal of Medical Systems"],
                    "is-referenced-by-count": 12,
                    "DOI": "10.1000/jms.2021.1",
                    "URL": "https://doi.org/10.1000/jms.2021.1"
                }]
            }
        });

        let papers = parse_works_response(&body);
        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        assert_eq!(paper.title, "Federated Learning in Hospitals");
        assert_eq!(paper.authors, vec!["Grace Hopper", "Turing", ""]);
        assert_eq!(paper.year, 2021);
        assert_eq!(paper.venue, "Journal of Medical Systems");
        assert_eq!(paper.citations, 12);
        assert_eq!(paper.source, SourceType::CrossRef);
    }

    #[test]
    fn test_year_fallback_chain() {
        let body = json!({
            "message": {"items": [
                {"title": "Online Date Only Paper", "published-online": {"date-parts": [[2022]]}},
                {"title": "Created Date Only Paper", "published-print": {"date-parts": [[null]]}, "created": {"date-parts": [[2019, 5]]}},
                {"title": "No Date At All Paper", "published-print": {"date-parts": [[]]}}
            ]}
        });

        let years: Vec<_> = parse_works_response(&body).iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2022, 2019, 0]);
    }

    #[test]
    fn test_string_title_and_empty_venue() {
        let body = json!({
            "message": {"items": [{
                "title": "  Plain String Title Paper ",
                "container-title": [],
                "published-print": {"date-parts": [[2020]]}
            }]}
        });

        let papers = parse_works_response(&body);
        assert_eq!(papers[0].title, "Plain String Title Paper");
        assert_eq!(papers[0].venue, "Preprint");
    }

    #[test]
    fn test_malformed_item_dropped() {
        let body = json!({
            "message": {"items": [
                {"title": "Good CrossRef Paper", "published-print": {"date-parts": [[2020]]}},
                {"title": "Negative Citations Paper", "is-referenced-by-count": -3}
            ]}
        });

        let papers = parse_works_response(&body);
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "Good CrossRef Paper");
    }

    #[test]
    fn test_missing_items_is_empty() {
        assert!(parse_works_response(&json!({"message": {}})).is_empty());
        assert!(parse_works_response(&json!({})).is_empty());
    }
}
