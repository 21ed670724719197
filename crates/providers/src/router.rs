//! Provider selection: builds the configured LLM gateway.

use sift_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named in `config.llm`.
///
/// A missing API key is allowed for local endpoints (ollama, vllm,
/// llamacpp); every other provider gets an empty bearer token and will
/// fail at request time with an authentication error.
pub fn build_from_config(
    config: &sift_config::AppConfig,
    client: reqwest::Client,
) -> Arc<dyn Provider> {
    let llm = &config.llm;
    let base_url = llm
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(&llm.provider));
    let api_key = llm.api_key.clone().unwrap_or_default();

    if api_key.is_empty() && !is_local(&llm.provider) {
        tracing::warn!(provider = %llm.provider, "No API key configured; LLM calls will fail");
    }

    Arc::new(
        OpenAiCompatProvider::new(&llm.provider, base_url, api_key, &llm.model)
            .with_client(client)
            .with_sampling(llm.temperature, llm.max_tokens)
            .with_timeout(Duration::from_secs(llm.timeout_secs)),
    )
}

fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "groq" => "https://api.groq.com/openai/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "fireworks" => "https://api.fireworks.ai/inference/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("groq").contains("api.groq.com"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let config = sift_config::AppConfig::default();
        let provider = build_from_config(&config, reqwest::Client::new());
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn local_providers_need_no_key() {
        assert!(is_local("ollama"));
        assert!(!is_local("groq"));
    }
}
