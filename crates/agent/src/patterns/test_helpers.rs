//! Shared test doubles for agent tests.

use async_trait::async_trait;
use sift_core::error::{ProviderError, ToolError};
use sift_core::provider::Provider;
use sift_core::tool::{Tool, ToolKind};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::language::LanguageDetector;

/// A provider that replays scripted replies in order and keeps every prompt
/// it was given. Panics when the script runs out.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(ProviderError::Network("connection reset".into()))])
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            panic!("ScriptedProvider: no reply left for call #{}", self.call_count())
        })
    }
}

/// JSON decision reply for a scripted provider.
pub fn decision(action: &str, input: &str) -> String {
    serde_json::json!({
        "thought": format!("use {action}"),
        "action": action,
        "action_input": input,
    })
    .to_string()
}

/// A tool with a fixed outcome that counts its calls.
pub struct StubTool {
    name: String,
    kind: ToolKind,
    outcome: Result<String, ToolError>,
    calls: Arc<AtomicUsize>,
}

impl StubTool {
    pub fn ok(name: &str, kind: ToolKind, output: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            outcome: Ok(output.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn err(name: &str, kind: ToolKind, error: ToolError) -> Self {
        Self {
            name: name.to_string(),
            kind,
            outcome: Err(error),
            calls: Arc::default(),
        }
    }

    /// Shared call counter, still readable after the tool is boxed into a registry.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "stub tool"
    }

    fn kind(&self) -> ToolKind {
        self.kind
    }

    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Always reports the same language.
pub struct FixedLanguage(pub &'static str);

impl LanguageDetector for FixedLanguage {
    fn detect(&self, _text: &str) -> Option<String> {
        Some(self.0.to_string())
    }
}
