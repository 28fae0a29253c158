//! Paper model representing a research paper from any source.

use serde::{Deserialize, Serialize};

/// Venue recorded when a source does not report one.
pub const DEFAULT_VENUE: &str = "Preprint";

/// Abstracts are truncated to this many characters.
pub const MAX_ABSTRACT_CHARS: usize = 500;

/// The source/repository where the paper was found
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    SemanticScholar,
    CrossRef,
    #[serde(untagged)]
    Other(String),
}

impl SourceType {
    /// Returns the display name of the source
    pub fn name(&self) -> &str {
        match self {
            SourceType::SemanticScholar => "Semantic Scholar",
            SourceType::CrossRef => "Crossref",
            SourceType::Other(s) => s,
        }
    }

    /// Returns the source identifier
    pub fn id(&self) -> &str {
        match self {
            SourceType::SemanticScholar => "semantic",
            SourceType::CrossRef => "crossref",
            SourceType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A research paper from any academic source
///
/// Papers are normalized by the source that fetched them and are treated as
/// immutable afterwards, except for `relevance_score` which the aggregator
/// sets once while ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Fingerprint derived from title and year (see [`fingerprint`])
    pub id: String,

    /// Paper title
    pub title: String,

    /// Authors in publication order
    pub authors: Vec<String>,

    /// Publication year (0 when the source reported none)
    pub year: i32,

    /// Journal, conference or "Preprint"
    pub venue: String,

    /// Abstract text, at most [`MAX_ABSTRACT_CHARS`] characters
    pub r#abstract: String,

    /// Citation count
    pub citations: u32,

    /// Digital Object Identifier
    pub doi: Option<String>,

    /// Paper page URL
    pub url: Option<String>,

    /// Blended recency/citation score assigned during ranking
    #[serde(default)]
    pub relevance_score: f64,

    /// Source where the paper was found
    pub source: SourceType,
}

impl Paper {
    /// Create a new paper with required fields
    pub fn new(title: impl Into<String>, year: i32, source: SourceType) -> Self {
        let title = title.into();
        Self {
            id: fingerprint(&title, year),
            title,
            authors: Vec::new(),
            year,
            venue: DEFAULT_VENUE.to_string(),
            r#abstract: String::new(),
            citations: 0,
            doi: None,
            url: None,
            relevance_score: 0.0,
            source,
        }
    }

    /// Years elapsed since publication, relative to `current_year`
    pub fn age(&self, current_year: i32) -> i32 {
        current_year - self.year
    }

    /// Returns true when the abstract is non-empty
    pub fn has_abstract(&self) -> bool {
        !self.r#abstract.is_empty()
    }
}

/// Stable identifier for a paper: hex MD5 of the title immediately followed
/// by the year.
///
/// Two records share an id only when title and year match exactly, so a
/// preprint and its published version with the same title and year collide.
pub fn fingerprint(title: &str, year: i32) -> String {
    format!("{:x}", md5::compute(format!("{}{}", title, year)))
}

/// Truncate to at most `max` characters on a char boundary
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder with required fields
    pub fn new(title: impl Into<String>, year: i32, source: SourceType) -> Self {
        Self {
            paper: Paper::new(title, year, source),
        }
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paper.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set venue; blank venues fall back to [`DEFAULT_VENUE`]
    pub fn venue(mut self, venue: impl AsRef<str>) -> Self {
        let venue = venue.as_ref().trim();
        self.paper.venue = if venue.is_empty() {
            DEFAULT_VENUE.to_string()
        } else {
            venue.to_string()
        };
        self
    }

    /// Set abstract, truncated to [`MAX_ABSTRACT_CHARS`]
    pub fn abstract_text(mut self, abstract_text: impl AsRef<str>) -> Self {
        self.paper.r#abstract = truncate_chars(abstract_text.as_ref(), MAX_ABSTRACT_CHARS);
        self
    }

    /// Set citation count
    pub fn citations(mut self, count: u32) -> Self {
        self.paper.citations = count;
        self
    }

    /// Set DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.paper.doi = Some(doi.into());
        self
    }

    /// Set page URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.paper.url = Some(url.into());
        self
    }

    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}
