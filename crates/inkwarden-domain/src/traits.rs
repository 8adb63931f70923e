//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the quality pipeline and its
//! collaborators. Implementations live in other crates (or in the caller).

use crate::SourceCandidate;
use serde::{Deserialize, Serialize};

/// Token counters reported by the model collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u64,

    /// Tokens produced by the completion
    pub completion_tokens: u64,
}

impl TokenUsage {
    /// Create a usage record
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    /// Prompt plus completion tokens
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens += rhs.prompt_tokens;
        self.completion_tokens += rhs.completion_tokens;
    }
}

/// Raw generated text plus usage metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text, unprocessed
    pub text: String,

    /// Token usage for this call
    pub usage: TokenUsage,
}

impl Generation {
    /// Create a generation with zero usage
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
        }
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (inkwarden-llm). Calls are
/// blocking; async callers wrap them in `spawn_blocking`.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<Generation, Self::Error>;

    /// Provider name recorded in run telemetry
    fn name(&self) -> &str;
}

/// Trait for the search collaborator
///
/// Returns unverified candidates for a query; verification is the
/// caller's job.
pub trait SourceSearch {
    /// Error type for search operations
    type Error;

    /// Search for candidate references
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceCandidate>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_accumulates() {
        let mut usage = TokenUsage::new(10, 5);
        usage += TokenUsage::new(3, 2);
        assert_eq!(usage.prompt_tokens, 13);
        assert_eq!(usage.completion_tokens, 7);
        assert_eq!(usage.total(), 20);
    }
}
