//! Research gap model.

use serde::{Deserialize, Serialize};

/// Coarse High/Medium/Low rating used for gap novelty and impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    Low,
    Medium,
    High,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Low => "Low",
            Rating::Medium => "Medium",
            Rating::High => "High",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Research expertise level, least experienced first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl std::str::FromStr for ExpertiseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(ExpertiseLevel::Beginner),
            "intermediate" => Ok(ExpertiseLevel::Intermediate),
            "advanced" => Ok(ExpertiseLevel::Advanced),
            "expert" => Ok(ExpertiseLevel::Expert),
            other => Err(format!("unknown expertise level: {}", other)),
        }
    }
}

/// An identified under-explored area in a set of papers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchGap {
    /// Tag such as "temporal", "venue_diversity", "methodological"
    pub gap_type: String,
    pub description: String,
    pub supporting_evidence: Vec<String>,
    pub potential_impact: String,
    pub suggested_approach: String,
    /// Confidence in [0, 1]
    pub confidence_score: f64,
    pub novelty_grade: Rating,
    pub impact_grade: Rating,
    pub research_suggestions: Vec<String>,
    pub methodology_suggestions: Vec<String>,
    pub required_expertise: ExpertiseLevel,
    pub timeline: String,
    pub resources: Vec<String>,
}

impl ResearchGap {
    /// Create a gap with default enrichment fields
    pub fn new(
        gap_type: impl Into<String>,
        description: impl Into<String>,
        supporting_evidence: Vec<String>,
        potential_impact: impl Into<String>,
        suggested_approach: impl Into<String>,
        confidence_score: f64,
    ) -> Self {
        Self {
            gap_type: gap_type.into(),
            description: description.into(),
            supporting_evidence,
            potential_impact: potential_impact.into(),
            suggested_approach: suggested_approach.into(),
            confidence_score,
            novelty_grade: Rating::Medium,
            impact_grade: Rating::Medium,
            research_suggestions: Vec::new(),
            methodology_suggestions: Vec::new(),
            required_expertise: ExpertiseLevel::Intermediate,
            timeline: "6-12 months".to_string(),
            resources: Vec::new(),
        }
    }
}
