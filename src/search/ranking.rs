//! Relevance scoring and ranking.

use std::cmp::Ordering;

use crate::models::Paper;

const RECENCY_WEIGHT: f64 = 0.4;
const CITATION_WEIGHT: f64 = 0.6;
/// Recency decays linearly to zero over this many years
const RECENCY_WINDOW_YEARS: f64 = 10.0;

/// Blended recency/citation relevance in [0, 1].
///
/// `recency = max(0, 1 - age/10)` and
/// `citation = min(1, (citations + 1)^0.25 / 10)`, weighted 0.4 / 0.6.
pub fn relevance_score(paper: &Paper, current_year: i32) -> f64 {
    let age = f64::from(current_year - paper.year);
    let recency = (1.0 - age / RECENCY_WINDOW_YEARS).max(0.0);
    let citation = ((f64::from(paper.citations) + 1.0).powf(0.25) / 10.0).min(1.0);
    RECENCY_WEIGHT * recency + CITATION_WEIGHT * citation
}

/// Assign relevance scores, sort descending (stable) and keep the top `max`
pub fn rank_by_relevance(mut papers: Vec<Paper>, current_year: i32, max: usize) -> Vec<Paper> {
    for paper in &mut papers {
        paper.relevance_score = relevance_score(paper, current_year);
    }
    papers.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    papers.truncate(max);
    papers
}

/// Keep papers from the last `window` years, newest first, then most cited
pub fn rank_recent(
    mut papers: Vec<Paper>,
    current_year: i32,
    window: i32,
    max: usize,
) -> Vec<Paper> {
    papers.retain(|p| p.year >= current_year - window);
    papers.sort_by(|a, b| match b.year.cmp(&a.year) {
        Ordering::Equal => b.citations.cmp(&a.citations),
        other => other,
    });
    papers.truncate(max);
    papers
}
