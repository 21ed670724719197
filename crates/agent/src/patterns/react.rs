//! ReAct pattern: Thought → Action → Observation, one action per step.
//!
//! Each [`ReactAgent::step`] makes one decision call to the provider, runs at
//! most one tool, and appends a `STEP n` block to the transcript:
//!
//! ```text
//! ==================================================
//! STEP 2
//! ==================================================
//! 💭 Thought: I need the page content
//! 🎯 Action: scraper
//! 📝 Input: https://example.com
//! 📊 Result: ...
//! ```
//!
//! URL tools end the run as soon as their result is conclusive: an error,
//! unusably thin content, a summary when one was asked for, or the content
//! itself. Other tools hand the observation back to the model.

use async_trait::async_trait;
use sift_config::AgentConfig;
use sift_core::provider::Provider;
use sift_core::state::AgentState;
use sift_core::text::{prefix_chars, truncate_chars, word_count};
use sift_core::tool::{ToolRegistry, is_error_result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Agent;
use crate::context::{ActionRecord, FINAL_ANSWER, build_prompt, parse_response, summary_prompt};
use crate::language::{LanguageDetector, NoLanguageDetection, WhatlangDetector};

/// Request words that ask for a summary instead of the full content.
const SUMMARY_KEYWORDS: [&str; 16] = [
    "summarize",
    "summarise",
    "summary",
    "resume",
    "résumé",
    "résumer",
    "resumen",
    "resumir",
    "short",
    "brief",
    "corto",
    "breve",
    "tldr",
    "zusammenfassung",
    "zusammenfassen",
    "riassunto",
];

const OBSERVATION_MARKER: &str = "\n\n... (remaining content truncated)";
const EXCERPT_CHARS: usize = 100;
const FALLBACK_CONTENT_CHARS: usize = 1000;

const LLM_UNAVAILABLE: &str =
    "🔴 The AI service is temporarily unavailable. Please try again in a moment.";
const STUCK_MESSAGE: &str = "⚠️ I'm having difficulty accessing this content. The website may be blocking automated access or requires special authentication.";
const GIVE_UP_MESSAGE: &str =
    "❌ Multiple attempts failed. This website may be inaccessible or requires manual intervention.";

fn wants_summary(request: &str) -> bool {
    let request = request.to_lowercase();
    SUMMARY_KEYWORDS.iter().any(|kw| request.contains(kw))
}

/// A ReAct agent over a fixed tool registry.
pub struct ReactAgent {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    language: Arc<dyn LanguageDetector>,
    failure_limit: u32,
    observation_limit: usize,
    min_words: usize,
    summary_window: usize,
}

impl ReactAgent {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>) -> Self {
        Self::from_config(provider, tools, &AgentConfig::default())
    }

    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &AgentConfig,
    ) -> Self {
        let language: Arc<dyn LanguageDetector> = if config.detect_language {
            Arc::new(WhatlangDetector::default())
        } else {
            Arc::new(NoLanguageDetection)
        };
        Self {
            provider,
            tools,
            language,
            failure_limit: config.failure_limit,
            observation_limit: config.observation_limit,
            min_words: config.min_words,
            summary_window: config.summary_window,
        }
    }

    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.language = detector;
        self
    }

    pub fn with_failure_limit(mut self, limit: u32) -> Self {
        self.failure_limit = limit;
        self
    }

    pub fn with_observation_limit(mut self, limit: usize) -> Self {
        self.observation_limit = limit;
        self
    }

    /// Run one Think-Act-Observe step.
    pub async fn step(&self, state: &AgentState, record: &mut ActionRecord) -> AgentState {
        if state.is_terminal() {
            return state.clone();
        }
        let step = state.step_count() + 1;

        // Think
        let prompt = build_prompt(state, &self.tools);
        let reply = match self.provider.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(step, provider = self.provider.name(), error = %e, "LLM call failed");
                return state.fail(
                    state.scratchpad(),
                    format!("LLM service unavailable: {e}"),
                    LLM_UNAVAILABLE,
                );
            }
        };

        let parsed = parse_response(&reply, &self.tools);
        info!(step, action = %parsed.action, "Agent decided");

        let separator = "=".repeat(50);
        let mut transcript = format!(
            "{}\n\n{separator}\nSTEP {step}\n{separator}\n💭 Thought: {}\n🎯 Action: {}\n📝 Input: {}",
            state.scratchpad(),
            parsed.thought,
            parsed.action,
            parsed.action_input,
        );

        if parsed.action == FINAL_ANSWER {
            return state.finish(transcript, parsed.action_input);
        }

        if record.repeats_last(&parsed.action, &parsed.action_input) {
            warn!(step, tool = %parsed.action, "Repeated action, stopping");
            return state.fail(
                &transcript,
                format!("Stuck: repeated '{}' with same input", parsed.action),
                STUCK_MESSAGE,
            );
        }
        if record.should_give_up(self.failure_limit) {
            warn!(step, failures = record.failure_count(), "Too many failures, stopping");
            return state.fail(&transcript, "Too many failures", GIVE_UP_MESSAGE);
        }

        // Act
        let Some(tool) = self.tools.get(&parsed.action) else {
            return state.fail(
                &transcript,
                format!("Unknown tool requested: {}", parsed.action),
                format!("⚙️ Internal error: Invalid tool '{}'", parsed.action),
            );
        };
        let fetches_url = tool.kind().fetches_url();

        let (result, failed) = match tool.execute(&parsed.action_input).await {
            Ok(output) => {
                let failed = is_error_result(&output);
                (output, failed)
            }
            Err(e) => (format!("Tool execution error: {e}"), true),
        };
        record.record(&parsed.action, &parsed.action_input, fetches_url, failed);
        debug!(step, tool = %parsed.action, failed, chars = result.len(), "Tool finished");

        // Observe
        let observation = truncate_chars(&result, self.observation_limit, OBSERVATION_MARKER);
        transcript.push_str("\n📊 Result: ");
        transcript.push_str(&observation);

        if fetches_url {
            return self
                .conclude(state, transcript, &result, &parsed.action_input)
                .await;
        }
        state.advance(transcript)
    }

    /// Terminate after a URL tool returned `result` for `url`.
    async fn conclude(
        &self,
        state: &AgentState,
        transcript: String,
        result: &str,
        url: &str,
    ) -> AgentState {
        if is_error_result(result) {
            return state.finish(transcript, format!("❌ Failed to access content:\n\n{result}"));
        }

        let content = result.trim();
        if word_count(content) < self.min_words {
            info!(url, words = word_count(content), "Content too thin");
            return state.finish(
                transcript,
                format!(
                    "❌ **Unable to extract meaningful content from {url}**\n\n\
                     Retrieved only: \"{}...\"\n\n\
                     **Possible reasons:**\n\
                     • Heavy JavaScript rendering\n\
                     • Authentication required\n\
                     • Bot detection blocking access",
                    prefix_chars(content, EXCERPT_CHARS)
                ),
            );
        }

        let request = state.user_request();
        if !wants_summary(request) {
            return state.finish(
                transcript,
                format!("✅ **Successfully scraped content:**\n\n{content}"),
            );
        }

        let language = self.language.detect(request);
        debug!(language = ?language, "Summarizing");
        let prompt = summary_prompt(
            prefix_chars(content, self.summary_window),
            language.as_deref(),
        );
        match self.provider.generate(&prompt).await {
            Ok(summary) => {
                state.finish(transcript, format!("📝 **Summary:**\n\n{}", summary.trim()))
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed, returning raw content");
                state.finish(
                    transcript,
                    format!(
                        "⚠️ Could not generate summary due to: {e}\n\n\
                         **Here's the extracted content:**\n\n{}...",
                        prefix_chars(content, FALLBACK_CONTENT_CHARS)
                    ),
                )
            }
        }
    }
}

#[async_trait]
impl Agent for ReactAgent {
    async fn step(&self, state: &AgentState, record: &mut ActionRecord) -> AgentState {
        ReactAgent::step(self, state, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_helpers::{FixedLanguage, ScriptedProvider, StubTool, decision};
    use sift_core::error::{ProviderError, ToolError};
    use sift_core::tool::ToolKind;
    use std::sync::atomic::Ordering;

    const ARTICLE: &str = "Rust is a systems programming language focused on safety, speed, and concurrency without a garbage collector.";

    fn agent(provider: Arc<ScriptedProvider>, tools: Vec<StubTool>) -> ReactAgent {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(Box::new(tool));
        }
        ReactAgent::new(provider, Arc::new(registry))
            .with_language_detector(Arc::new(NoLanguageDetection))
    }

    async fn run_steps(agent: &ReactAgent, input: &str, max: usize) -> AgentState {
        let mut record = ActionRecord::new();
        let mut state = AgentState::from_user_input(input);
        for _ in 0..max {
            if state.is_terminal() {
                break;
            }
            state = agent.step(&state, &mut record).await;
        }
        state
    }

    #[tokio::test]
    async fn terminal_state_is_returned_unchanged() {
        let provider = Arc::new(ScriptedProvider::texts(&[]));
        let agent = agent(provider.clone(), vec![]);
        let done = AgentState::from_user_input("hi").finish("log", "answer");

        let next = agent.step(&done, &mut ActionRecord::new()).await;
        assert_eq!(next, done);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn final_answer_terminates() {
        let provider = Arc::new(ScriptedProvider::texts(&[&decision("Final Answer", "42")]));
        let agent = agent(provider, vec![]);
        let state = AgentState::from_user_input("What is 6*7?");

        let next = agent.step(&state, &mut ActionRecord::new()).await;
        assert_eq!(next.final_answer(), Some("42"));
        assert_eq!(next.error(), None);
        assert_eq!(next.step_count(), 1);
        assert!(next.scratchpad().starts_with("User: What is 6*7?"));
        assert!(next.scratchpad().contains("STEP 1"));
        assert!(next.scratchpad().contains("🎯 Action: Final Answer"));
        // Prior generation untouched.
        assert_eq!(state.step_count(), 0);
        assert!(!state.is_terminal());
    }

    #[tokio::test]
    async fn unstructured_reply_becomes_the_answer() {
        let provider = Arc::new(ScriptedProvider::texts(&["hello"]));
        let agent = agent(provider, vec![]);

        let next = run_steps(&agent, "say hello", 1).await;
        assert_eq!(next.final_answer(), Some("hello"));
        assert_eq!(next.error(), None);
        assert!(next.scratchpad().contains("💭 Thought: No structured response"));
    }

    #[tokio::test]
    async fn unknown_action_becomes_the_answer() {
        let provider = Arc::new(ScriptedProvider::texts(&[&decision("teleport", "to the moon")]));
        let agent = agent(provider, vec![]);

        let next = run_steps(&agent, "go", 1).await;
        assert_eq!(next.final_answer(), Some("to the moon"));
        assert_eq!(next.error(), None);
    }

    #[tokio::test]
    async fn provider_failure_is_fatal() {
        let provider = Arc::new(ScriptedProvider::failing());
        let agent = agent(provider, vec![]);

        let next = run_steps(&agent, "scrape https://a.example", 1).await;
        assert!(next.error().unwrap().starts_with("LLM service unavailable"));
        assert_eq!(next.final_answer(), Some(LLM_UNAVAILABLE));
        assert_eq!(next.step_count(), 1);
        assert!(next.scratchpad().contains("❌ **ERROR:** LLM service unavailable"));
    }

    #[tokio::test]
    async fn repeated_action_stops_without_dispatch() {
        let tool = StubTool::ok("parser", ToolKind::Extract, "a@b.co");
        let calls = tool.call_counter();
        let provider = Arc::new(ScriptedProvider::texts(&[
            &decision("parser", "emails: A@B.co"),
            &decision("parser", "  emails:   a@b.co "),
        ]));
        let agent = agent(provider, vec![tool]);

        let next = run_steps(&agent, "find emails", 5).await;
        assert_eq!(next.step_count(), 2);
        assert_eq!(next.error(), Some("Stuck: repeated 'parser' with same input"));
        assert_eq!(next.final_answer(), Some(STUCK_MESSAGE));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(next.scratchpad().contains("STEP 2"));
    }

    #[tokio::test]
    async fn gives_up_after_two_failures() {
        let tool = StubTool::err(
            "parser",
            ToolKind::Extract,
            ToolError::InvalidInput("bad".into()),
        );
        let calls = tool.call_counter();
        let provider = Arc::new(ScriptedProvider::texts(&[
            &decision("parser", "a"),
            &decision("parser", "b"),
            &decision("parser", "c"),
        ]));
        let agent = agent(provider, vec![tool]);

        let next = run_steps(&agent, "extract", 5).await;
        assert_eq!(next.step_count(), 3);
        assert_eq!(next.error(), Some("Too many failures"));
        assert_eq!(next.final_answer(), Some(GIVE_UP_MESSAGE));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(next.scratchpad().contains("📊 Result: Tool execution error:"));
    }

    #[tokio::test]
    async fn failure_limit_is_configurable() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            &decision("parser", "a"),
            &decision("parser", "b"),
        ]));
        let agent = agent(
            provider,
            vec![StubTool::ok("parser", ToolKind::Extract, "Not Found")],
        )
        .with_failure_limit(1);

        let next = run_steps(&agent, "extract", 5).await;
        assert_eq!(next.step_count(), 2);
        assert_eq!(next.error(), Some("Too many failures"));
    }

    #[tokio::test]
    async fn error_marker_results_count_as_failures() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            &decision("parser", "a"),
            &decision("parser", "b"),
            &decision("parser", "c"),
        ]));
        let agent = agent(
            provider,
            vec![StubTool::ok("parser", ToolKind::Extract, "Error: nothing matched")],
        );

        let next = run_steps(&agent, "extract", 5).await;
        assert_eq!(next.error(), Some("Too many failures"));
    }

    #[tokio::test]
    async fn non_url_tool_advances_with_observation() {
        let provider = Arc::new(ScriptedProvider::texts(&[&decision("parser", "emails: x")]));
        let agent = agent(provider, vec![StubTool::ok("parser", ToolKind::Extract, "a@b.co")]);

        let next = run_steps(&agent, "emails please", 1).await;
        assert!(!next.is_terminal());
        assert_eq!(next.step_count(), 1);
        assert!(next.scratchpad().ends_with("📊 Result: a@b.co"));
    }

    #[tokio::test]
    async fn observation_is_truncated_in_transcript() {
        let long = "x".repeat(200);
        let provider = Arc::new(ScriptedProvider::texts(&[&decision("parser", "urls: y")]));
        let agent = agent(provider, vec![StubTool::ok("parser", ToolKind::Extract, &long)])
            .with_observation_limit(50);

        let next = run_steps(&agent, "urls", 1).await;
        let expected = format!("📊 Result: {}{OBSERVATION_MARKER}", "x".repeat(50));
        assert!(next.scratchpad().ends_with(&expected));
    }

    #[tokio::test]
    async fn url_tool_error_finishes_with_failure_answer() {
        let provider = Arc::new(ScriptedProvider::texts(&[&decision(
            "scraper",
            "https://a.example",
        )]));
        let agent = agent(
            provider,
            vec![StubTool::ok("scraper", ToolKind::Scrape, "❌ HTTP Error 404: https://a.example")],
        );

        let next = run_steps(&agent, "scrape https://a.example", 1).await;
        assert_eq!(
            next.final_answer(),
            Some("❌ Failed to access content:\n\n❌ HTTP Error 404: https://a.example")
        );
        assert_eq!(next.error(), None);
    }

    #[tokio::test]
    async fn thin_content_gets_a_diagnostic() {
        let provider = Arc::new(ScriptedProvider::texts(&[&decision(
            "scraper",
            "https://spa.example",
        )]));
        let agent = agent(
            provider,
            vec![StubTool::ok("scraper", ToolKind::Scrape, "Loading app shell")],
        );

        let next = run_steps(&agent, "scrape https://spa.example", 1).await;
        let answer = next.final_answer().unwrap();
        assert!(answer.starts_with("❌ **Unable to extract meaningful content from https://spa.example**"));
        assert!(answer.contains("Retrieved only: \"Loading app shell...\""));
        assert!(answer.contains("• Bot detection blocking access"));
        assert_eq!(next.error(), None);
    }

    #[tokio::test]
    async fn full_content_returned_without_summary_intent() {
        let provider = Arc::new(ScriptedProvider::texts(&[&decision(
            "scraper",
            "https://a.example",
        )]));
        let agent = agent(provider.clone(), vec![StubTool::ok("scraper", ToolKind::Scrape, ARTICLE)]);

        let next = run_steps(&agent, "scrape https://a.example", 1).await;
        assert_eq!(
            next.final_answer(),
            Some(format!("✅ **Successfully scraped content:**\n\n{ARTICLE}").as_str())
        );
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn summary_intent_summarizes_in_detected_language() {
        let provider = Arc::new(ScriptedProvider::texts(&[
            decision("scraper", "https://a.example").as_str(),
            "  Rust es un lenguaje seguro.  ",
        ]));
        let agent = agent(provider.clone(), vec![StubTool::ok("scraper", ToolKind::Scrape, ARTICLE)])
            .with_language_detector(Arc::new(FixedLanguage("Spanish")));

        let next = run_steps(&agent, "resumen de https://a.example", 1).await;
        assert_eq!(next.final_answer(), Some("📝 **Summary:**\n\nRust es un lenguaje seguro."));
        assert_eq!(next.step_count(), 1);

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("- Write in Spanish"));
        assert!(prompts[1].contains(ARTICLE));
    }

    #[tokio::test]
    async fn summary_failure_falls_back_to_content() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(decision("scraper", "https://a.example")),
            Err(ProviderError::Timeout("30s".into())),
        ]));
        let agent = agent(provider, vec![StubTool::ok("scraper", ToolKind::Scrape, ARTICLE)]);

        let next = run_steps(&agent, "summarize https://a.example", 1).await;
        let answer = next.final_answer().unwrap();
        assert!(answer.starts_with("⚠️ Could not generate summary due to:"));
        assert!(answer.contains(&format!("**Here's the extracted content:**\n\n{ARTICLE}...")));
        assert_eq!(next.error(), None);
    }


    #[test]
    fn summary_intent_keywords() {
        assert!(wants_summary("Summarize https://a.example"));
        assert!(wants_summary("haz un resumen de https://a.example"));
        assert!(wants_summary("Zusammenfassung bitte"));
        assert!(wants_summary("tldr https://a.example"));
        assert!(!wants_summary("scrape https://a.example"));
    }
}
