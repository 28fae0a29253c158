//! Core data models for papers, quality scores and research gaps.

mod gap;
mod paper;
mod quality;

pub use gap::{ExpertiseLevel, Rating, ResearchGap};
pub(crate) use paper::truncate_chars;
pub use paper::{fingerprint, Paper, PaperBuilder, SourceType, DEFAULT_VENUE, MAX_ABSTRACT_CHARS};
pub(crate) use quality::round1;
pub use quality::{PaperGrade, QualityScore};
