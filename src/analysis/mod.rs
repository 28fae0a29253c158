//! Analysis over search results: paper quality grading, research gap
//! identification and topic extraction.

mod gaps;
mod grading;
mod topic;

pub use gaps::{enrich, prioritize_gaps, GapAnalyzer, MAX_GAPS};
pub use grading::{
    GradeWeights, GradingError, KeywordTables, QualityGrader, SubScores, GRADING_FAILED_EXPLANATION,
};
pub use topic::{extract_topic, extract_topic_with};
