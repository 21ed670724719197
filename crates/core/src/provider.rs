//! Provider trait: the abstraction over the language-model backend.
//!
//! The agent needs exactly one thing from a model: turn a prompt into text.
//! Implementations: any OpenAI-compatible chat-completions endpoint (Groq,
//! OpenAI, OpenRouter, Ollama, ...).

use async_trait::async_trait;

use crate::error::ProviderError;

/// The LLM gateway.
///
/// Every non-success condition (HTTP error, timeout, malformed response)
/// surfaces as a [`ProviderError`].
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "groq", "openai").
    fn name(&self) -> &str;

    /// Send a prompt and return the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Upper;

    #[async_trait]
    impl Provider for Upper {
        fn name(&self) -> &str {
            "upper"
        }
        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            Ok(prompt.to_uppercase())
        }
    }

    #[tokio::test]
    async fn provider_usable_as_trait_object() {
        let provider: Arc<dyn Provider> = Arc::new(Upper);
        assert_eq!(provider.name(), "upper");
        assert_eq!(provider.generate("abc").await.unwrap(), "ABC");
    }
}
