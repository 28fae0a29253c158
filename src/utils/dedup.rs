//! Title-based deduplication of papers across queries and sources.

use std::collections::HashSet;

use crate::models::Paper;

/// Normalized titles longer than this may match by containment
const SUBSTRING_MATCH_MIN_CHARS: usize = 20;

/// Normalize a title for comparison: lowercase, drop everything that is not
/// a word character or whitespace, trim the ends.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Whether two normalized titles name the same paper.
///
/// Titles match exactly, or by containment when both are longer than 20
/// characters. Containment can merge unrelated papers whose titles happen to
/// contain one another.
pub fn titles_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    a.chars().count() > SUBSTRING_MATCH_MIN_CHARS
        && b.chars().count() > SUBSTRING_MATCH_MIN_CHARS
        && (a.contains(b) || b.contains(a))
}

/// Remove duplicate papers, keeping the first occurrence and preserving order
pub fn deduplicate_papers(papers: Vec<Paper>) -> Vec<Paper> {
    let mut exact: HashSet<String> = HashSet::new();
    let mut kept_titles: Vec<String> = Vec::new();
    let mut unique = Vec::with_capacity(papers.len());

    for paper in papers {
        let normalized = normalize_title(&paper.title);

        let duplicate = exact.contains(&normalized)
            || kept_titles.iter().any(|seen| titles_match(seen, &normalized));

        if duplicate {
            tracing::debug!("Dropping duplicate paper: {}", paper.title);
            continue;
        }

        exact.insert(normalized.clone());
        kept_titles.push(normalized);
        unique.push(paper);
    }

    unique
}
