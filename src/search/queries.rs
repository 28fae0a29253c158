//! Query-variant generation for topic searches.

use std::collections::HashSet;

use crate::llm::{extract_json_array, TextGenerator};

/// Most variants returned for one topic
pub const MAX_QUERY_VARIANTS: usize = 4;

/// Topics with at most this many words get programmatic variants
const SHORT_TOPIC_WORDS: usize = 3;

const VARIANT_SUFFIXES: [&str; 3] = ["recent advances", "systematic review", "survey"];

/// Generator-proposed queries must have between 2 and 8 words
const GENERATED_MIN_WORDS: usize = 2;
const GENERATED_MAX_WORDS: usize = 8;
const MAX_GENERATED_QUERIES: usize = 3;

/// Rule-based variants: the topic itself plus, for short topics, review-
/// and survey-oriented phrasings
pub fn generate_query_variants(topic: &str) -> Vec<String> {
    dedup_queries(base_variants(topic))
}

/// Rule-based variants followed by up to three generator-proposed queries.
///
/// A failing generator or an unusable reply leaves the rule-based variants
/// unchanged.
pub async fn generate_query_variants_with(
    topic: &str,
    generator: &dyn TextGenerator,
) -> Vec<String> {
    let mut queries = base_variants(topic);

    let prompt = format!(
        "Generate 3 different search queries to find academic papers on: \"{topic}\"\n\n\
         Requirements:\n\
         1. Queries should be 2-6 words each\n\
         2. Cover different aspects of the topic\n\
         3. Use academic terminology\n\
         4. Include one query for recent reviews/surveys\n\n\
         Return ONLY a JSON array of 3 queries, like: [\"query 1\", \"query 2\", \"query 3\"]"
    );

    match generator.generate(&prompt).await {
        Ok(reply) => queries.extend(parse_generated_queries(&reply)),
        Err(e) => tracing::warn!("Query generation failed, using rule-based variants: {}", e),
    }

    dedup_queries(queries)
}

fn base_variants(topic: &str) -> Vec<String> {
    let topic = topic.trim();
    let mut queries = vec![topic.to_string()];
    if topic.split_whitespace().count() <= SHORT_TOPIC_WORDS {
        queries.extend(
            VARIANT_SUFFIXES
                .iter()
                .map(|suffix| format!("{} {}", topic, suffix)),
        );
    }
    queries
}

fn parse_generated_queries(reply: &str) -> Vec<String> {
    let Some(items) = extract_json_array(reply) else {
        return Vec::new();
    };

    items
        .iter()
        .take(MAX_GENERATED_QUERIES)
        .filter_map(|item| item.as_str())
        .filter(|q| {
            let words = q.split_whitespace().count();
            (GENERATED_MIN_WORDS..=GENERATED_MAX_WORDS).contains(&words)
        })
        .map(str::to_string)
        .collect()
}

/// Case-insensitive dedup preserving first occurrence, capped at
/// [`MAX_QUERY_VARIANTS`]
fn dedup_queries(queries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .filter(|q| seen.insert(q.trim().to_lowercase()))
        .take(MAX_QUERY_VARIANTS)
        .collect()
}
