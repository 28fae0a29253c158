//! Research gap identification, enrichment and prioritisation.

use serde_json::Value;

use crate::llm::{extract_json_array, TextGenerator};
use crate::models::{truncate_chars, ExpertiseLevel, Paper, Rating, ResearchGap};
use crate::utils::current_year;

/// Most gaps returned by one analysis
pub const MAX_GAPS: usize = 5;

/// Years (counting back from the current one) checked for thin coverage
const TEMPORAL_WINDOW: i32 = 5;
const MIN_PAPERS_PER_YEAR: usize = 2;
const MIN_DISTINCT_VENUES: usize = 3;

const TEMPORAL_CONFIDENCE: f64 = 0.7;
const VENUE_CONFIDENCE: f64 = 0.6;
const GENERATED_CONFIDENCE: f64 = 0.85;
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Papers included in the generator prompt
const PROMPT_PAPERS: usize = 15;
const PROMPT_ABSTRACT_CHARS: usize = 200;
const MAX_EVIDENCE: usize = 3;
const MAX_KEY_QUESTIONS: usize = 2;

/// Identifies under-explored areas in a set of papers
#[derive(Debug, Clone, Default)]
pub struct GapAnalyzer {
    current_year: Option<i32>,
}

impl GapAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    fn year(&self) -> i32 {
        self.current_year.unwrap_or_else(current_year)
    }

    /// Deterministic gaps only: thin publication years and low venue
    /// diversity. Enriched, sorted by confidence and capped at [`MAX_GAPS`].
    pub fn analyze(&self, papers: &[Paper]) -> Vec<ResearchGap> {
        if papers.is_empty() {
            return Vec::new();
        }
        finish(self.rule_based_gaps(papers))
    }

    /// Rule-based gaps plus generator-identified ones for `topic`.
    ///
    /// A failing generator, or a reply without a usable JSON array, adds a
    /// single `analysis_limitation` gap instead.
    pub async fn analyze_with(
        &self,
        papers: &[Paper],
        topic: &str,
        generator: &dyn TextGenerator,
    ) -> Vec<ResearchGap> {
        if papers.is_empty() {
            return Vec::new();
        }

        let mut gaps = self.rule_based_gaps(papers);
        let prompt = gap_prompt(papers, topic);

        let generated = match generator.generate(&prompt).await {
            Ok(reply) => parse_generated_gaps(&reply),
            Err(e) => {
                tracing::error!("Generated gap analysis failed: {}", e);
                None
            }
        };

        match generated {
            Some(found) => gaps.extend(found),
            None => gaps.push(limitation_gap()),
        }

        finish(gaps)
    }

    fn rule_based_gaps(&self, papers: &[Paper]) -> Vec<ResearchGap> {
        let year = self.year();
        let mut gaps = Vec::new();

        let average = papers.len() as f64 / TEMPORAL_WINDOW as f64;
        for y in (year - TEMPORAL_WINDOW)..=year {
            let count = papers.iter().filter(|p| p.year == y).count();
            if count < MIN_PAPERS_PER_YEAR {
                gaps.push(ResearchGap::new(
                    "temporal",
                    format!("Limited research activity in {} with only {} publications", y, count),
                    vec![
                        format!("Only {} papers found from {}", count, y),
                        format!("Average publications per year: {:.1}", average),
                    ],
                    "Recent developments and current trends may be understudied",
                    "Conduct updated research incorporating latest developments and technologies",
                    TEMPORAL_CONFIDENCE,
                ));
            }
        }

        let venues = venue_counts(papers);
        if venues.len() < MIN_DISTINCT_VENUES {
            // First venue reaching the highest count wins ties
            let top = venues
                .iter()
                .fold(None::<&(String, usize)>, |best, entry| match best {
                    Some(b) if b.1 >= entry.1 => Some(b),
                    _ => Some(entry),
                })
                .map(|(venue, _)| venue.as_str())
                .unwrap_or("Unknown");

            gaps.push(ResearchGap::new(
                "venue_diversity",
                "Limited venue diversity suggests narrow research community engagement",
                vec![
                    format!("Papers concentrated in only {} venues", venues.len()),
                    format!("Top venue: {}", top),
                ],
                "Potential echo chamber effect limiting diverse perspectives",
                "Target interdisciplinary venues and conferences for broader impact",
                VENUE_CONFIDENCE,
            ));
        }

        for gap in &mut gaps {
            enrich(gap);
        }
        gaps
    }
}

/// Non-empty venues with their paper counts, in first-seen order
fn venue_counts(papers: &[Paper]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for paper in papers.iter().filter(|p| !p.venue.is_empty()) {
        match counts.iter_mut().find(|(v, _)| *v == paper.venue) {
            Some((_, n)) => *n += 1,
            None => counts.push((paper.venue.clone(), 1)),
        }
    }
    counts
}

fn finish(mut gaps: Vec<ResearchGap>) -> Vec<ResearchGap> {
    gaps.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
    gaps.truncate(MAX_GAPS);
    gaps
}

fn limitation_gap() -> ResearchGap {
    let mut gap = ResearchGap::new(
        "analysis_limitation",
        "Advanced gap analysis unavailable - consider manual literature review",
        vec![
            "AI analysis failed".to_string(),
            "Manual review recommended".to_string(),
        ],
        "May miss nuanced research opportunities",
        "Conduct systematic literature review with domain experts",
        FALLBACK_CONFIDENCE,
    );
    enrich(&mut gap);
    gap
}

fn gap_prompt(papers: &[Paper], topic: &str) -> String {
    let summaries: Vec<Value> = papers
        .iter()
        .take(PROMPT_PAPERS)
        .map(|p| {
            let snippet = if p.has_abstract() {
                truncate_chars(&p.r#abstract, PROMPT_ABSTRACT_CHARS)
            } else {
                "No abstract available".to_string()
            };
            let venue = if p.venue.is_empty() { "Unknown venue" } else { p.venue.as_str() };
            serde_json::json!({
                "title": p.title,
                "year": p.year,
                "venue": venue,
                "citations": p.citations,
                "abstract_snippet": snippet,
            })
        })
        .collect();
    let papers_json = serde_json::to_string_pretty(&summaries).unwrap_or_default();

    format!(
        "You are an expert research gap analyst. Analyze these {count} papers on \"{topic}\" \
         to identify significant research gaps.\n\n\
         Papers Data:\n{papers_json}\n\n\
         Identify 3-5 SPECIFIC and ACTIONABLE research gaps. For each gap:\n\n\
         1. Classify the gap type: methodological, theoretical, application, \
         interdisciplinary, technological, geographical or demographic\n\
         2. Provide concrete evidence from the papers\n\
         3. Explain the significance and potential impact\n\
         4. Suggest specific, actionable research approaches\n\n\
         Format your response as a JSON array of objects with the keys \"gap_type\", \
         \"description\", \"supporting_evidence\" (array), \"potential_impact\", \
         \"suggested_approach\" and \"key_questions\" (array).",
        count = papers.len(),
    )
}

/// Gaps from a generator reply, or `None` when the reply holds no JSON array.
///
/// Objects missing `gap_type`, `description` or `supporting_evidence` are
/// skipped.
fn parse_generated_gaps(reply: &str) -> Option<Vec<ResearchGap>> {
    let items = extract_json_array(reply)?;
    Some(items.iter().take(MAX_GAPS).filter_map(gap_from_value).collect())
}

fn strings(value: &Value, max: usize) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .take(max)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn gap_from_value(item: &Value) -> Option<ResearchGap> {
    let obj = item.as_object()?;
    let gap_type = obj.get("gap_type")?.as_str()?;
    let description = obj.get("description")?.as_str()?;
    let evidence = strings(obj.get("supporting_evidence")?, MAX_EVIDENCE);

    let text = |key: &str, default: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    };

    let mut gap = ResearchGap::new(
        gap_type,
        description,
        evidence,
        text("potential_impact", "Significant research opportunity"),
        text("suggested_approach", "Further investigation needed"),
        GENERATED_CONFIDENCE,
    );
    enrich(&mut gap);

    if let Some(questions) = obj.get("key_questions") {
        let questions = strings(questions, MAX_KEY_QUESTIONS);
        gap.description
            .push_str(&format!("\n\nKey questions: {}", questions.join("; ")));
    }
    Some(gap)
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fill in novelty, impact, suggestions, expertise, timeline and resources
/// from the gap type and description keywords.
pub fn enrich(gap: &mut ResearchGap) {
    let gap_type = gap.gap_type.to_lowercase();
    let description = gap.description.to_lowercase();
    let impact = gap.potential_impact.to_lowercase();
    let kind = gap_type.as_str();

    gap.novelty_grade = if contains_any(
        &description,
        &["unprecedented", "first", "novel", "breakthrough", "cutting-edge", "unexplored"],
    ) || matches!(kind, "interdisciplinary" | "technological")
    {
        Rating::High
    } else if contains_any(&description, &["limited", "understudied", "emerging", "recent"])
        || matches!(kind, "methodological" | "application")
    {
        Rating::Medium
    } else {
        Rating::Low
    };

    let high_impact = ["significant", "major", "critical", "transformative", "breakthrough", "paradigm"];
    gap.impact_grade = if contains_any(&impact, &high_impact)
        || contains_any(&description, &high_impact)
        || matches!(kind, "application" | "interdisciplinary" | "technological")
    {
        Rating::High
    } else {
        Rating::Medium
    };

    gap.research_suggestions = owned(match kind {
        "methodological" => &[
            "Develop and validate new research methodologies",
            "Conduct comparative studies of existing approaches",
            "Create standardized evaluation frameworks",
        ],
        "theoretical" => &[
            "Develop comprehensive theoretical frameworks",
            "Conduct systematic literature reviews",
            "Propose new conceptual models",
        ],
        "application" => &[
            "Design and implement pilot studies",
            "Develop proof-of-concept prototypes",
            "Conduct real-world case studies",
        ],
        "interdisciplinary" => &[
            "Establish cross-disciplinary research collaborations",
            "Organize interdisciplinary workshops and conferences",
            "Develop integrated research frameworks",
        ],
        _ => &[
            "Conduct comprehensive literature review",
            "Design empirical studies to address the gap",
            "Develop new research methodologies",
        ],
    });

    gap.methodology_suggestions = owned(match kind {
        "methodological" => &[
            "Mixed-methods research design",
            "Systematic review and meta-analysis",
            "Experimental validation studies",
        ],
        "theoretical" => &[
            "Grounded theory approach",
            "Conceptual framework development",
            "Delphi study with experts",
        ],
        "application" => &[
            "Action research methodology",
            "Case study research",
            "Design science research",
        ],
        "interdisciplinary" => &[
            "Transdisciplinary research approach",
            "Collaborative participatory research",
            "Systems thinking methodology",
        ],
        _ => &[
            "Exploratory research design",
            "Survey and interview methods",
            "Longitudinal study approach",
        ],
    });

    gap.required_expertise = if contains_any(
        &description,
        &["complex", "advanced", "sophisticated", "cutting-edge", "breakthrough"],
    ) {
        ExpertiseLevel::Expert
    } else if matches!(kind, "interdisciplinary" | "theoretical" | "technological") {
        ExpertiseLevel::Advanced
    } else {
        ExpertiseLevel::Intermediate
    };

    gap.timeline = if matches!(kind, "theoretical" | "interdisciplinary")
        || description.contains("comprehensive")
    {
        "12-24 months"
    } else if matches!(kind, "methodological" | "technological") {
        "6-12 months"
    } else if matches!(kind, "application" | "temporal") {
        "3-6 months"
    } else {
        "6-12 months"
    }
    .to_string();

    gap.resources = owned(match kind {
        "methodological" => &["Statistical software", "Research participants", "Data collection tools"],
        "theoretical" => &["Literature databases", "Expert consultations", "Analysis software"],
        "application" => &["Development tools", "Testing environments", "User groups"],
        "interdisciplinary" => &["Cross-domain experts", "Collaboration platforms", "Integration tools"],
        "technological" => &["Computing resources", "Software licenses", "Technical expertise"],
        _ => &["Research databases", "Analysis tools", "Expert guidance"],
    });
}

fn rating_rank(rating: Rating) -> u8 {
    match rating {
        Rating::Low => 1,
        Rating::Medium => 2,
        Rating::High => 3,
    }
}

fn expertise_rank(level: ExpertiseLevel) -> u8 {
    match level {
        ExpertiseLevel::Beginner => 1,
        ExpertiseLevel::Intermediate => 2,
        ExpertiseLevel::Advanced => 3,
        ExpertiseLevel::Expert => 4,
    }
}

/// Gaps a researcher at `level` can take on (at most one level of stretch),
/// most promising first.
///
/// Priority is `(novelty + impact) * confidence` with High=3, Medium=2,
/// Low=1; ties keep their input order.
pub fn prioritize_gaps(gaps: Vec<ResearchGap>, level: ExpertiseLevel) -> Vec<ResearchGap> {
    let ceiling = expertise_rank(level) + 1;
    let priority = |g: &ResearchGap| {
        f64::from(rating_rank(g.novelty_grade) + rating_rank(g.impact_grade)) * g.confidence_score
    };

    let mut suitable: Vec<ResearchGap> = gaps
        .into_iter()
        .filter(|g| expertise_rank(g.required_expertise) <= ceiling)
        .collect();
    suitable.sort_by(|a, b| priority(b).total_cmp(&priority(a)));
    suitable
}
