//! Deterministic five-factor paper quality grading.
//!
//! Each factor starts from a neutral 5.0 and moves with keyword hits, venue,
//! citation rate, recency, title/abstract length and author count. Factors
//! are capped at 10.0 and combined with fixed weights:
//!
//! | Factor | Weight |
//! |--------|--------|
//! | methodology | 0.25 |
//! | citation impact | 0.20 |
//! | novelty | 0.25 |
//! | clarity | 0.15 |
//! | applicability | 0.15 |
//!
//! Keyword matching is case-insensitive substring matching, so "method"
//! also matches "methods" and "methodology".

use thiserror::Error;

use crate::models::{round1, Paper, PaperGrade, QualityScore};
use crate::utils::current_year;

const MAX_SUB_SCORE: f64 = 10.0;
const BASE_SCORE: f64 = 5.0;

/// Per-factor `(strength at or above, weakness below)` thresholds, in
/// [`SubScores`] order. Citation impact uses a lower bar on both sides.
const ASSESSMENT_THRESHOLDS: [(f64, f64); 5] = [
    (8.0, 5.0),
    (7.0, 4.0),
    (8.0, 5.0),
    (8.0, 5.0),
    (8.0, 5.0),
];

/// Explanation used by the neutral fallback score
pub const GRADING_FAILED_EXPLANATION: &str =
    "Unable to assess paper quality due to processing error.";

/// Keyword vocabularies driving the heuristic factors
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTables {
    pub methodology: Vec<String>,
    pub top_venues: Vec<String>,
    pub generic_venues: Vec<String>,
    pub novelty: Vec<String>,
    pub structure: Vec<String>,
    pub application: Vec<String>,
    pub domain: Vec<String>,
}

fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            methodology: terms(&[
                "experiment",
                "empirical",
                "statistical",
                "quantitative",
                "qualitative",
                "survey",
                "case study",
                "longitudinal",
                "cross-sectional",
                "randomized",
                "controlled",
                "systematic",
                "meta-analysis",
                "validation",
                "evaluation",
            ]),
            top_venues: terms(&["ieee", "acm", "nature", "science"]),
            generic_venues: terms(&["conference", "journal"]),
            novelty: terms(&[
                "novel",
                "new",
                "innovative",
                "first",
                "breakthrough",
                "pioneering",
                "unprecedented",
                "original",
                "unique",
                "cutting-edge",
                "state-of-the-art",
            ]),
            structure: terms(&[
                "background",
                "objective",
                "method",
                "result",
                "conclusion",
                "purpose",
                "approach",
                "finding",
                "implication",
            ]),
            application: terms(&[
                "application",
                "practical",
                "implementation",
                "real-world",
                "industry",
                "deployment",
                "system",
                "tool",
                "framework",
                "platform",
                "solution",
                "case study",
                "evaluation",
                "performance",
                "efficiency",
            ]),
            domain: terms(&[
                "healthcare",
                "medical",
                "finance",
                "education",
                "transportation",
                "energy",
                "environment",
                "security",
                "manufacturing",
                "agriculture",
            ]),
        }
    }
}

/// Number of terms occurring in `haystack` (already lowercased)
fn hits(terms: &[String], haystack: &str) -> usize {
    terms.iter().filter(|t| haystack.contains(t.as_str())).count()
}

/// Factor weights; must be finite, non-negative and sum to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeWeights {
    pub methodology: f64,
    pub citation_impact: f64,
    pub novelty: f64,
    pub clarity: f64,
    pub applicability: f64,
}

impl Default for GradeWeights {
    fn default() -> Self {
        Self {
            methodology: 0.25,
            citation_impact: 0.20,
            novelty: 0.25,
            clarity: 0.15,
            applicability: 0.15,
        }
    }
}

impl GradeWeights {
    fn as_array(&self) -> [f64; 5] {
        [
            self.methodology,
            self.citation_impact,
            self.novelty,
            self.clarity,
            self.applicability,
        ]
    }

    pub fn validate(&self) -> Result<(), GradingError> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(GradingError::InvalidWeights(format!("{:?}", self)));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(GradingError::InvalidWeights(format!("weights sum to {}", sum)));
        }
        Ok(())
    }
}

/// Failure inside a grading computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradingError {
    #[error("invalid grade weights: {0}")]
    InvalidWeights(String),

    #[error("{factor} score is not finite")]
    NonFinite { factor: &'static str },
}

/// The five unrounded factor scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub methodology: f64,
    pub citation_impact: f64,
    pub novelty: f64,
    pub clarity: f64,
    pub applicability: f64,
}

impl SubScores {
    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("methodology", self.methodology),
            ("citation impact", self.citation_impact),
            ("novelty", self.novelty),
            ("clarity", self.clarity),
            ("applicability", self.applicability),
        ]
    }

    fn mean(&self) -> f64 {
        self.named().iter().map(|(_, s)| s).sum::<f64>() / 5.0
    }
}

/// Grades papers against a keyword vocabulary and weight set
#[derive(Debug, Clone, Default)]
pub struct QualityGrader {
    keywords: KeywordTables,
    weights: GradeWeights,
    current_year: Option<i32>,
}

impl QualityGrader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute the keyword vocabulary
    pub fn with_keywords(mut self, keywords: KeywordTables) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_weights(mut self, weights: GradeWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Grade against a fixed year instead of the calendar year
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn keywords(&self) -> &KeywordTables {
        &self.keywords
    }

    fn year(&self) -> i32 {
        self.current_year.unwrap_or_else(current_year)
    }

    /// Grade `paper`. Never fails: a computation error yields the neutral
    /// score (grade C, every factor 5.0).
    pub fn grade(&self, paper: &Paper) -> QualityScore {
        match self.try_grade(paper) {
            Ok(score) => score,
            Err(e) => {
                tracing::error!("Error grading paper \"{}\": {}", paper.title, e);
                QualityScore::neutral(GRADING_FAILED_EXPLANATION)
            }
        }
    }

    /// Grade `paper`, surfacing computation errors
    pub fn try_grade(&self, paper: &Paper) -> Result<QualityScore, GradingError> {
        self.weights.validate()?;

        let scores = self.sub_scores(paper);
        for (factor, score) in scores.named() {
            if !score.is_finite() {
                return Err(GradingError::NonFinite { factor });
            }
        }

        let overall: f64 = scores
            .named()
            .iter()
            .zip(self.weights.as_array())
            .map(|((_, score), weight)| score * weight)
            .sum();
        if !overall.is_finite() {
            return Err(GradingError::NonFinite { factor: "overall" });
        }

        let (strengths, weaknesses) = assess(&scores);

        Ok(QualityScore {
            overall_grade: PaperGrade::from_score(overall),
            overall_score: round1(overall),
            methodology: round1(scores.methodology),
            citation_impact: round1(scores.citation_impact),
            novelty: round1(scores.novelty),
            clarity: round1(scores.clarity),
            applicability: round1(scores.applicability),
            explanation: explanation(scores.mean()).to_string(),
            strengths,
            weaknesses,
        })
    }

    /// Compute the five factor scores without weighting or rounding
    pub fn sub_scores(&self, paper: &Paper) -> SubScores {
        let title = paper.title.to_lowercase();
        let abstract_text = paper.r#abstract.to_lowercase();
        let year = self.year();

        SubScores {
            methodology: self.methodology(paper, &abstract_text),
            citation_impact: citation_impact(paper, year),
            novelty: self.novelty(paper, &title, &abstract_text, year),
            clarity: self.clarity(paper, &abstract_text),
            applicability: self.applicability(&title, &abstract_text),
        }
    }

    fn methodology(&self, paper: &Paper, abstract_text: &str) -> f64 {
        let mut score = BASE_SCORE;
        score += (hits(&self.keywords.methodology, abstract_text) as f64 * 0.5).min(3.0);

        if paper.venue.chars().count() > 3 {
            let venue = paper.venue.to_lowercase();
            if hits(&self.keywords.top_venues, &venue) > 0 {
                score += 1.5;
            } else if hits(&self.keywords.generic_venues, &venue) > 0 {
                score += 0.5;
            }
        }

        score.min(MAX_SUB_SCORE)
    }

    fn novelty(&self, paper: &Paper, title: &str, abstract_text: &str, year: i32) -> f64 {
        let mut score = BASE_SCORE;
        score += (hits(&self.keywords.novelty, title) as f64).min(2.0);
        score += (hits(&self.keywords.novelty, abstract_text) as f64 * 0.3).min(2.0);

        if paper.year >= year - 1 {
            score += 1.0;
        } else if paper.year >= year - 3 {
            score += 0.5;
        }

        score.min(MAX_SUB_SCORE)
    }

    fn clarity(&self, paper: &Paper, abstract_text: &str) -> f64 {
        let mut score = BASE_SCORE;

        let title_len = paper.title.chars().count();
        if (30..=120).contains(&title_len) {
            score += 1.0;
        } else if !(20..=150).contains(&title_len) {
            score -= 1.0;
        }

        if paper.has_abstract() {
            if (100..=500).contains(&paper.r#abstract.chars().count()) {
                score += 1.0;
            }
            score += (hits(&self.keywords.structure, abstract_text) as f64 * 0.3).min(2.0);
        }

        let authors = paper.authors.len();
        if authors <= 6 {
            score += 0.5;
        } else if authors > 15 {
            score -= 0.5;
        }

        score.min(MAX_SUB_SCORE)
    }

    fn applicability(&self, title: &str, abstract_text: &str) -> f64 {
        let mut score = BASE_SCORE;
        score += (hits(&self.keywords.application, title) as f64).min(2.0);
        score += (hits(&self.keywords.application, abstract_text) as f64 * 0.2).min(2.0);

        let domain_hits = self
            .keywords
            .domain
            .iter()
            .filter(|t| title.contains(t.as_str()) || abstract_text.contains(t.as_str()))
            .count();
        score += (domain_hits as f64 * 0.5).min(1.0);

        score.min(MAX_SUB_SCORE)
    }
}

/// Citations per year of age mapped through a step table
fn citation_impact(paper: &Paper, current_year: i32) -> f64 {
    let age = (current_year - paper.year).max(1);
    let per_year = f64::from(paper.citations) / f64::from(age);

    if per_year >= 50.0 {
        10.0
    } else if per_year >= 20.0 {
        8.5
    } else if per_year >= 10.0 {
        7.0
    } else if per_year >= 5.0 {
        6.0
    } else if per_year >= 2.0 {
        5.0
    } else if per_year >= 1.0 {
        4.0
    } else {
        (3.0 - f64::from(age) * 0.2).max(2.0)
    }
}

fn assess(scores: &SubScores) -> (Vec<String>, Vec<String>) {
    let strong = [
        "Strong methodological approach",
        "High citation impact for its age",
        "Highly novel and innovative",
        "Clear and well-structured presentation",
        "Strong practical applicability",
    ];
    let weak = [
        "Limited methodological rigor",
        "Low citation impact",
        "Limited novelty or innovation",
        "Unclear presentation or structure",
        "Limited practical applicability",
    ];

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for (i, (_, score)) in scores.named().iter().enumerate() {
        let (strength_at, weakness_below) = ASSESSMENT_THRESHOLDS[i];
        if *score >= strength_at {
            strengths.push(strong[i].to_string());
        }
        if *score < weakness_below {
            weaknesses.push(weak[i].to_string());
        }
    }
    (strengths, weaknesses)
}

fn explanation(mean: f64) -> &'static str {
    if mean >= 8.5 {
        "Excellent paper with strong contributions across multiple dimensions."
    } else if mean >= 7.5 {
        "High-quality paper with solid methodology and significant impact."
    } else if mean >= 6.5 {
        "Good paper with notable contributions and clear presentation."
    } else if mean >= 5.5 {
        "Adequate paper with some valuable insights but room for improvement."
    } else {
        "Paper has limitations that affect its overall quality and impact."
    }
}
