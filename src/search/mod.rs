//! Topic search: query variants, multi-source aggregation, deduplication and
//! relevance ranking.
//!
//! ```text
//! topic ──► query variants ──► [constrained client, unconstrained client] per variant
//!                                        │
//!                     validated papers ◄─┘
//!                            │
//!                     dedup by title ──► relevance score ──► sort ──► truncate
//! ```

mod aggregator;
mod queries;
mod ranking;

pub use aggregator::{AggregatorSettings, SearchAggregator};
pub use queries::{generate_query_variants, generate_query_variants_with, MAX_QUERY_VARIANTS};
pub use ranking::{rank_by_relevance, rank_recent, relevance_score};
