//! Inkwarden LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `inkwarden-domain`. The
//! pipeline never talks to a model directly; it goes through this trait so
//! tests can script the model's answers.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use inkwarden_llm::MockProvider;
//! use inkwarden_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result.text, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use inkwarden_domain::traits::LlmProvider as LlmProviderTrait;
use inkwarden_domain::{Generation, TokenUsage};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(LlmError),
}

#[derive(Debug, Default)]
struct MockState {
    queue: VecDeque<Scripted>,
    by_prompt: HashMap<String, Scripted>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Responses are resolved in order: an exact-prompt response, then the next
/// queued response, then the default. Every prompt is recorded so tests can
/// assert on what the pipeline asked for.
///
/// # Examples
///
/// ```
/// use inkwarden_llm::MockProvider;
/// use inkwarden_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("fallback");
/// provider.push_response("first");
/// provider.push_response("second");
///
/// assert_eq!(provider.generate("a").unwrap().text, "first");
/// assert_eq!(provider.generate("b").unwrap().text, "second");
/// assert_eq!(provider.generate("c").unwrap().text, "fallback");
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    default_response: String,
    usage: TokenUsage,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            default_response: response.into(),
            usage: TokenUsage::default(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Set the provider name reported to telemetry
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Report this usage on every successful call
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        self.lock()
            .by_prompt
            .insert(prompt.into(), Scripted::Reply(response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&self, prompt: impl Into<String>) {
        self.lock().by_prompt.insert(
            prompt.into(),
            Scripted::Fail(LlmError::Other("Mock error".to_string())),
        );
    }

    /// Queue a response for the next unmatched call
    pub fn push_response(&self, response: impl Into<String>) {
        self.lock().queue.push_back(Scripted::Reply(response.into()));
    }

    /// Queue an error for the next unmatched call
    pub fn push_error(&self, error: LlmError) {
        self.lock().queue.push_back(Scripted::Fail(error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    /// Reset the call history
    pub fn reset_call_count(&self) {
        self.lock().prompts.clear();
    }

    // A poisoned mock only happens after a panicking test; keep going.
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<Generation, Self::Error> {
        let mut state = self.lock();
        state.prompts.push(prompt.to_string());

        let scripted = match state.by_prompt.get(prompt) {
            Some(found) => Some(found.clone()),
            None => state.queue.pop_front(),
        };

        match scripted {
            Some(Scripted::Fail(err)) => Err(err),
            Some(Scripted::Reply(text)) => Ok(Generation {
                text,
                usage: self.usage,
            }),
            None => Ok(Generation {
                text: self.default_response.clone(),
                usage: self.usage,
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().text, "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello").unwrap().text, "world");
        assert_eq!(provider.generate("foo").unwrap().text, "bar");
        assert_eq!(provider.generate("unknown").unwrap().text, "Default mock response");
    }

    #[test]
    fn test_mock_provider_prompt_match_beats_queue() {
        let provider = MockProvider::default();
        provider.push_response("queued");
        provider.add_response("exact", "matched");

        assert_eq!(provider.generate("exact").unwrap().text, "matched");
        assert_eq!(provider.generate("other").unwrap().text, "queued");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("bad prompt");
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[test]
    fn test_mock_provider_queued_error() {
        let provider = MockProvider::default();
        provider.push_error(LlmError::RateLimitExceeded);

        assert_eq!(provider.generate("x"), Err(LlmError::RateLimitExceeded));
        assert!(provider.generate("x").is_ok());
    }

    #[test]
    fn test_mock_provider_usage_and_name() {
        let provider = MockProvider::new("ok")
            .with_name("gemini")
            .with_usage(TokenUsage::new(12, 30));

        let generation = provider.generate("p").unwrap();
        assert_eq!(generation.usage.total(), 42);
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
