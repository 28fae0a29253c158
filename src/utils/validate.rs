//! Plausibility checks that reject implausible or fabricated paper records.

use chrono::Datelike;
use thiserror::Error;

use crate::models::Paper;

/// Earliest publication year accepted
pub const MIN_YEAR: i32 = 1900;
/// Citations allowed per year of age
pub const MAX_CITATIONS_PER_YEAR: i64 = 1000;
const MIN_TITLE_CHARS: usize = 10;
const MAX_TITLE_CHARS: usize = 300;
const MAX_AUTHORS: usize = 50;

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Reason a paper was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("year {year} outside 1900..={current_year}")]
    Year { year: i32, current_year: i32 },

    #[error("title length {0} outside 10..=300 characters")]
    TitleLength(usize),

    #[error("paper has no authors")]
    NoAuthors,

    #[error("{0} authors exceeds the limit of 50")]
    TooManyAuthors(usize),

    #[error("{citations} citations exceeds {max} allowed for its age")]
    Citations { citations: u32, max: i64 },
}

/// Stateless filter for implausible records
#[derive(Debug, Clone, Copy, Default)]
pub struct PaperValidator;

impl PaperValidator {
    /// Validate against the current calendar year, logging rejections
    pub fn validate(paper: &Paper) -> bool {
        Self::validate_at(paper, current_year())
    }

    /// Validate against an explicit current year, logging rejections
    pub fn validate_at(paper: &Paper, current_year: i32) -> bool {
        match Self::check(paper, current_year) {
            Ok(()) => true,
            Err(reason) => {
                tracing::warn!("Rejected paper \"{}\": {}", paper.title, reason);
                false
            }
        }
    }

    /// Return the first rule the paper violates
    pub fn check(paper: &Paper, current_year: i32) -> Result<(), ValidationError> {
        if paper.year < MIN_YEAR || paper.year > current_year {
            return Err(ValidationError::Year {
                year: paper.year,
                current_year,
            });
        }

        let title_chars = paper.title.chars().count();
        if !(MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&title_chars) {
            return Err(ValidationError::TitleLength(title_chars));
        }

        if paper.authors.is_empty() {
            return Err(ValidationError::NoAuthors);
        }
        if paper.authors.len() > MAX_AUTHORS {
            return Err(ValidationError::TooManyAuthors(paper.authors.len()));
        }

        let max = i64::from(current_year - paper.year) * MAX_CITATIONS_PER_YEAR;
        if i64::from(paper.citations) > max {
            return Err(ValidationError::Citations {
                citations: paper.citations,
                max,
            });
        }

        Ok(())
    }
}
