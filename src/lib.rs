//! # Research Gap Finder
//!
//! Finds recent academic papers on a topic across Semantic Scholar and
//! Crossref, grades their quality and identifies under-explored research
//! gaps.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, QualityScore, ResearchGap)
//! - [`sources`]: Source trait, the two API sources and the retrying,
//!   rate-limited, caching [`SourceClient`]
//! - [`search`]: Query variants, multi-source aggregation and relevance ranking
//! - [`analysis`]: Quality grading, gap analysis and topic extraction
//! - [`session`]: One research session's state
//! - [`llm`]: Optional text-generation collaborator
//! - [`utils`]: Rate limiter, retry policy, cache, HTTP client, dedup, validation
//! - [`config`]: Configuration management
//!
//! ```rust,no_run
//! use research_gap_finder::{config, ResearchSession};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = config::load_config(None)?;
//! let mut session = ResearchSession::from_config(&config)?;
//!
//! session.find_papers("federated learning").await;
//! for (paper, score) in session.grade_papers(5) {
//!     println!("{} [{}] {}", score.overall_grade, paper.year, paper.title);
//! }
//! for gap in session.analyze_gaps().await {
//!     println!("{}: {}", gap.gap_type, gap.description);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod llm;
pub mod models;
pub mod search;
pub mod session;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use analysis::{GapAnalyzer, QualityGrader};
pub use models::{Paper, QualityScore, ResearchGap};
pub use search::SearchAggregator;
pub use session::ResearchSession;
pub use sources::{Source, SourceClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
