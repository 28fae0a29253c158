//! Paper quality assessment results.

use serde::{Deserialize, Serialize};

/// Letter grade, best first.
///
/// The derived ordering follows declaration order, so `APlus < A < ... < F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaperGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl PaperGrade {
    /// Map an overall 0-10 score to a letter grade
    pub fn from_score(score: f64) -> Self {
        if score >= 9.5 {
            PaperGrade::APlus
        } else if score >= 9.0 {
            PaperGrade::A
        } else if score >= 8.5 {
            PaperGrade::AMinus
        } else if score >= 8.0 {
            PaperGrade::BPlus
        } else if score >= 7.0 {
            PaperGrade::B
        } else if score >= 6.5 {
            PaperGrade::BMinus
        } else if score >= 6.0 {
            PaperGrade::CPlus
        } else if score >= 5.0 {
            PaperGrade::C
        } else if score >= 4.0 {
            PaperGrade::CMinus
        } else if score >= 3.0 {
            PaperGrade::D
        } else {
            PaperGrade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaperGrade::APlus => "A+",
            PaperGrade::A => "A",
            PaperGrade::AMinus => "A-",
            PaperGrade::BPlus => "B+",
            PaperGrade::B => "B",
            PaperGrade::BMinus => "B-",
            PaperGrade::CPlus => "C+",
            PaperGrade::C => "C",
            PaperGrade::CMinus => "C-",
            PaperGrade::D => "D",
            PaperGrade::F => "F",
        }
    }
}

impl std::fmt::Display for PaperGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic five-factor quality assessment of a single paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub overall_grade: PaperGrade,
    /// Weighted sum of the sub-scores, rounded to one decimal
    pub overall_score: f64,
    pub methodology: f64,
    pub citation_impact: f64,
    pub novelty: f64,
    pub clarity: f64,
    pub applicability: f64,
    pub explanation: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl QualityScore {
    /// Neutral score used when an assessment cannot be completed
    pub fn neutral(explanation: impl Into<String>) -> Self {
        Self {
            overall_grade: PaperGrade::C,
            overall_score: 5.0,
            methodology: 5.0,
            citation_impact: 5.0,
            novelty: 5.0,
            clarity: 5.0,
            applicability: 5.0,
            explanation: explanation.into(),
            strengths: vec!["Paper included in academic database".to_string()],
            weaknesses: vec!["Assessment could not be completed".to_string()],
        }
    }
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(PaperGrade::from_score(9.0), PaperGrade::A);
        assert_eq!(PaperGrade::from_score(8.99), PaperGrade::AMinus);
        assert_eq!(PaperGrade::from_score(9.5), PaperGrade::APlus);
        assert_eq!(PaperGrade::from_score(10.0), PaperGrade::APlus);
        assert_eq!(PaperGrade::from_score(8.0), PaperGrade::BPlus);
        assert_eq!(PaperGrade::from_score(7.0), PaperGrade::B);
        assert_eq!(PaperGrade::from_score(6.5), PaperGrade::BMinus);
        assert_eq!(PaperGrade::from_score(6.0), PaperGrade::CPlus);
        assert_eq!(PaperGrade::from_score(5.0), PaperGrade::C);
        assert_eq!(PaperGrade::from_score(4.0), PaperGrade::CMinus);
        assert_eq!(PaperGrade::from_score(3.0), PaperGrade::D);
        assert_eq!(PaperGrade::from_score(2.99), PaperGrade::F);
    }

    #[test]
    fn test_grade_ordering_and_serde() {
        assert!(PaperGrade::APlus < PaperGrade::A);
        assert!(PaperGrade::D < PaperGrade::F);
        assert_eq!(serde_json::to_string(&PaperGrade::AMinus).unwrap(), "\"A-\"");
        assert_eq!(PaperGrade::BPlus.to_string(), "B+");
    }

    #[test]
    fn test_neutral_score() {
        let score = QualityScore::neutral("failed");
        assert_eq!(score.overall_grade, PaperGrade::C);
        assert_eq!(score.methodology, 5.0);
        assert_eq!(score.applicability, 5.0);
        assert_eq!(score.explanation, "failed");
    }
}
