//! Text-generation collaborator.
//!
//! The crate ships no language-model client. Anything able to turn a prompt
//! into text can implement [`TextGenerator`]; every feature that uses one
//! (topic extraction, query variants, gap analysis) has a deterministic
//! fallback when it is absent or fails.

use async_trait::async_trait;
use serde_json::Value;

/// Errors returned by a text generator
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The backing service could not be reached
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    /// The service answered with an error
    #[error("Generation failed: {0}")]
    Failed(String),
}

/// Opaque `generate(prompt) -> text` capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Parse the first JSON array embedded in a free-text reply.
///
/// Generators often wrap JSON in prose or code fences; everything outside the
/// outermost `[`...`]` pair is ignored.
pub(crate) fn extract_json_array(reply: &str) -> Option<Vec<Value>> {
    let start = reply.find('[')?;
    let end = reply.rfind(']')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&reply[start..=end]) {
        Ok(Value::Array(items)) => Some(items),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Generator reply is not a JSON array: {}", e);
            None
        }
    }
}
