//! A research session: one topic's papers, their grades and the gaps found
//! in them.
//!
//! The session owns every piece of mutable state (search clients with their
//! caches and rate limiter, the per-paper score cache, the latest results),
//! so independent sessions never share anything.

use std::collections::HashMap;
use std::sync::Arc;

use crate::analysis::{extract_topic, extract_topic_with, prioritize_gaps, GapAnalyzer, QualityGrader};
use crate::config::Config;
use crate::llm::TextGenerator;
use crate::models::{ExpertiseLevel, Paper, QualityScore, ResearchGap};
use crate::search::SearchAggregator;
use crate::sources::SourceError;

/// Papers graded by [`ResearchSession::grade_papers`] unless told otherwise
pub const DEFAULT_GRADE_LIMIT: usize = 10;

pub struct ResearchSession {
    aggregator: SearchAggregator,
    grader: QualityGrader,
    gap_analyzer: GapAnalyzer,
    generator: Option<Arc<dyn TextGenerator>>,
    expertise: Option<ExpertiseLevel>,
    topic: Option<String>,
    papers: Vec<Paper>,
    scores: HashMap<String, QualityScore>,
    gaps: Vec<ResearchGap>,
}

impl std::fmt::Debug for ResearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchSession")
            .field("topic", &self.topic)
            .field("expertise", &self.expertise)
            .field("papers", &self.papers.len())
            .field("scores", &self.scores.len())
            .field("gaps", &self.gaps.len())
            .finish()
    }
}

impl ResearchSession {
    pub fn new(aggregator: SearchAggregator) -> Self {
        Self {
            aggregator,
            grader: QualityGrader::default(),
            gap_analyzer: GapAnalyzer::default(),
            generator: None,
            expertise: None,
            topic: None,
            papers: Vec::new(),
            scores: HashMap::new(),
            gaps: Vec::new(),
        }
    }

    /// Session over the Semantic Scholar and CrossRef clients built from `config`
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::new(SearchAggregator::from_config(config)?))
    }

    pub fn with_grader(mut self, grader: QualityGrader) -> Self {
        self.grader = grader;
        self
    }

    pub fn with_gap_analyzer(mut self, analyzer: GapAnalyzer) -> Self {
        self.gap_analyzer = analyzer;
        self
    }

    /// Use `generator` for topic extraction, query variants and gap analysis
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.aggregator = self.aggregator.with_generator(generator.clone());
        self.generator = Some(generator);
        self
    }

    pub fn with_expertise(mut self, level: ExpertiseLevel) -> Self {
        self.expertise = Some(level);
        self
    }

    /// Replace the grader; scores already cached are kept
    pub fn set_grader(&mut self, grader: QualityGrader) {
        self.grader = grader;
    }

    pub fn set_expertise(&mut self, level: ExpertiseLevel) {
        self.expertise = Some(level);
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn expertise(&self) -> Option<ExpertiseLevel> {
        self.expertise
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn gaps(&self) -> &[ResearchGap] {
        &self.gaps
    }

    pub fn aggregator(&self) -> &SearchAggregator {
        &self.aggregator
    }

    /// Extract a research topic from free text, asking the generator when
    /// the phrase patterns find nothing
    pub async fn resolve_topic(&self, input: &str) -> Option<String> {
        match &self.generator {
            Some(generator) => extract_topic_with(input, generator.as_ref()).await,
            None => extract_topic(input),
        }
    }

    /// Search recent papers on `topic` and make them the session's papers.
    ///
    /// Gaps from a previous topic are discarded.
    pub async fn find_papers(&mut self, topic: &str) -> &[Paper] {
        let topic = topic.trim();
        tracing::info!("Searching papers for topic: {}", topic);

        self.papers = self.aggregator.find_recent_papers(topic).await;
        self.topic = Some(topic.to_string());
        self.gaps.clear();
        &self.papers
    }

    /// Grade up to `limit` session papers, best first.
    ///
    /// Scores are cached by paper id; a paper graded before is not graded
    /// again.
    pub fn grade_papers(&mut self, limit: usize) -> Vec<(&Paper, &QualityScore)> {
        for paper in self.papers.iter().take(limit) {
            if !self.scores.contains_key(&paper.id) {
                let score = self.grader.grade(paper);
                self.scores.insert(paper.id.clone(), score);
            }
        }

        let mut graded: Vec<(&Paper, &QualityScore)> = self
            .papers
            .iter()
            .take(limit)
            .filter_map(|p| self.scores.get(&p.id).map(|s| (p, s)))
            .collect();
        graded.sort_by(|a, b| b.1.overall_score.total_cmp(&a.1.overall_score));
        graded
    }

    /// Cached score for `paper_id`, if it has been graded
    pub fn score_for(&self, paper_id: &str) -> Option<&QualityScore> {
        self.scores.get(paper_id)
    }

    pub fn graded_count(&self) -> usize {
        self.scores.len()
    }

    /// Mean overall score of every graded paper
    pub fn average_quality(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let total: f64 = self.scores.values().map(|s| s.overall_score).sum();
        Some(total / self.scores.len() as f64)
    }

    /// Identify gaps in the session's papers, replacing earlier ones
    pub async fn analyze_gaps(&mut self) -> &[ResearchGap] {
        self.gaps = match &self.generator {
            Some(generator) => {
                let topic = self.topic.as_deref().unwrap_or_default();
                self.gap_analyzer
                    .analyze_with(&self.papers, topic, generator.as_ref())
                    .await
            }
            None => self.gap_analyzer.analyze(&self.papers),
        };
        tracing::info!("Identified {} research gaps", self.gaps.len());
        &self.gaps
    }

    /// Gaps suited to the session's expertise level, most promising first.
    ///
    /// Without an expertise level every gap is returned in its original
    /// order.
    pub fn prioritized_gaps(&self) -> Vec<ResearchGap> {
        match self.expertise {
            Some(level) => prioritize_gaps(self.gaps.clone(), level),
            None => self.gaps.clone(),
        }
    }
}
