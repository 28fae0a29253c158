//! Research-topic extraction from free-form requests.

use std::sync::OnceLock;

use regex::Regex;

use crate::llm::TextGenerator;

/// Extracted topics must have at most this many words
const MAX_TOPIC_WORDS: usize = 8;
const MIN_TOPIC_CHARS: usize = 3;
/// Generator replies must be shorter than this
const MAX_GENERATED_CHARS: usize = 100;

/// Phrase patterns tried in order; group 1 captures the topic
const TOPIC_PATTERNS: [&str; 8] = [
    r"(?:research|study|investigate|explore|analyze|examine) (?:on |about |in |into )?(.+?)(?:[?.!]|$)",
    r"(?:papers|publications|articles|literature) (?:on |about |in |regarding )?(.+?)(?:[?.!]|$)",
    r"(?:interested in|working on|focusing on|looking at) (.+?)(?:[?.!]|$)",
    r"(?:topic|area|field|domain) (?:is |of )(.+?)(?:[?.!]|$)",
    r"(.+?) (?:research|studies|papers|literature)",
    r"(?:find|search|look for) (?:papers on |about |regarding )?(.+?)(?:[?.!]|$)",
    r"(.+?) (?:in|for|and) (?:healthcare|education|industry|science|technology)",
    r"(?:i want to|i'm|i am) (?:research|study|explore) (.+?)(?:[?.!]|$)",
];

struct TopicRegexes {
    quoted: Regex,
    patterns: Vec<Regex>,
    filler: Regex,
    punctuation: Regex,
}

fn regexes() -> Option<&'static TopicRegexes> {
    static REGEXES: OnceLock<Option<TopicRegexes>> = OnceLock::new();
    REGEXES
        .get_or_init(|| {
            Some(TopicRegexes {
                quoted: Regex::new(r#""([^"]+)""#).ok()?,
                patterns: TOPIC_PATTERNS
                    .iter()
                    .filter_map(|p| Regex::new(p).ok())
                    .collect(),
                filler: Regex::new(r"\b(?:papers?|research|studies|literature|please|thanks)\b").ok()?,
                punctuation: Regex::new(r"[^\w\s-]").ok()?,
            })
        })
        .as_ref()
}

/// Pull a research topic out of `input` using phrase patterns.
///
/// A quoted phrase wins outright. Otherwise the first pattern whose cleaned
/// capture is longer than three characters and at most eight words is used.
///
/// ```
/// use research_gap_finder::analysis::extract_topic;
///
/// assert_eq!(
///     extract_topic("Find papers about climate change impacts.").as_deref(),
///     Some("climate change impacts")
/// );
/// assert_eq!(extract_topic("Hello how are you"), None);
/// ```
pub fn extract_topic(input: &str) -> Option<String> {
    let re = regexes()?;
    let lower = input.trim().to_lowercase();

    if let Some(caps) = re.quoted.captures(&lower) {
        return Some(caps[1].trim().to_string());
    }

    re.patterns.iter().find_map(|pattern| {
        let caps = pattern.captures(&lower)?;
        let topic = re.filler.replace_all(caps[1].trim(), "");
        let topic = re.punctuation.replace_all(topic.trim(), "");
        let topic = topic.trim();

        let acceptable = topic.chars().count() > MIN_TOPIC_CHARS
            && topic.split_whitespace().count() <= MAX_TOPIC_WORDS;
        acceptable.then(|| topic.to_string())
    })
}

/// [`extract_topic`], falling back to asking `generator` when no pattern
/// matches.
///
/// The reply is trimmed and unquoted. It is rejected when it reads "none"
/// or is not 4 to 99 characters long.
pub async fn extract_topic_with(input: &str, generator: &dyn TextGenerator) -> Option<String> {
    if let Some(topic) = extract_topic(input) {
        return Some(topic);
    }

    let prompt = format!(
        "You are a research topic extraction expert. Extract the main research topic from \
         this user input.\n\n\
         Rules:\n\
         1. Return ONLY the core research topic (2-6 words)\n\
         2. Remove filler words like \"papers on\", \"research about\", etc.\n\
         3. If no clear research topic exists, return \"None\"\n\
         4. Focus on academic/scientific topics only\n\n\
         User input: \"{input}\"\n\n\
         Topic:"
    );

    let reply = match generator.generate(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("Topic extraction by generator failed: {}", e);
            return None;
        }
    };

    let topic = reply.trim().trim_matches('"').trim_matches('\'');
    let len = topic.chars().count();
    if topic.eq_ignore_ascii_case("none") || len <= MIN_TOPIC_CHARS || len >= MAX_GENERATED_CHARS {
        return None;
    }
    Some(topic.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::FixedGenerator;

    fn topic(input: &str) -> Option<String> {
        extract_topic(input)
    }

    #[test]
    fn test_quoted_phrase_wins() {
        assert_eq!(
            topic(r#"Find papers about "Graph Neural Networks" please"#).as_deref(),
            Some("graph neural networks")
        );
    }

    #[test]
    fn test_research_verb_pattern() {
        assert_eq!(
            topic("I want to research machine learning in healthcare").as_deref(),
            Some("machine learning in healthcare")
        );
        assert_eq!(
            topic("Can you investigate into soil microbiomes?").as_deref(),
            Some("soil microbiomes")
        );
    }

    #[test]
    fn test_trailing_keyword_pattern() {
        assert_eq!(topic("quantum computing research").as_deref(), Some("quantum computing"));
    }

    #[test]
    fn test_filler_and_punctuation_removed() {
        assert_eq!(
            topic("I'm interested in papers on federated learning, thanks!").as_deref(),
            Some("federated learning")
        );
    }

    #[test]
    fn test_hyphens_kept() {
        assert_eq!(
            topic("Show me literature on self-supervised learning.").as_deref(),
            Some("self-supervised learning")
        );
    }

    #[test]
    fn test_overlong_or_missing_topic() {
        assert_eq!(topic("Research on a b c d e f g h i j"), None);
        assert_eq!(topic("Hello how are you"), None);
        assert_eq!(topic(""), None);
    }

    #[tokio::test]
    async fn test_generator_fallback() {
        let generator = FixedGenerator::replying("  \"ocean acidification\"\n");
        assert_eq!(
            extract_topic_with("Hello there", &generator).await.as_deref(),
            Some("ocean acidification")
        );

        let none = FixedGenerator::replying("None");
        assert_eq!(extract_topic_with("Hello there", &none).await, None);

        let short = FixedGenerator::replying("ai");
        assert_eq!(extract_topic_with("Hello there", &short).await, None);

        assert_eq!(
            extract_topic_with("Hello there", &FixedGenerator::failing()).await,
            None
        );
    }

    #[tokio::test]
    async fn test_generator_skipped_when_pattern_matches() {
        let generator = FixedGenerator::replying("something else");
        assert_eq!(
            extract_topic_with("quantum computing research", &generator)
                .await
                .as_deref(),
            Some("quantum computing")
        );
        assert!(generator.prompts.lock().unwrap().is_empty());
    }
}
