//! Immutable agent state.
//!
//! An `AgentState` is one snapshot of an ongoing request. Every transition
//! returns a new value; nothing mutates a state in place, so any generation
//! can be kept around for tests or replay.

use serde::{Deserialize, Serialize};

use crate::message::{Message, Role};

/// One snapshot of a request: conversation, transcript, step counter and
/// the terminal outcome (if any).
///
/// Once `final_answer` or `error` is set the state is terminal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    messages: Vec<Message>,
    scratchpad: String,
    step_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AgentState {
    /// Build the initial state for a free-text request: the text is the sole
    /// user message and the seed line of the transcript.
    pub fn from_user_input(input: impl Into<String>) -> Self {
        let input = input.into();
        Self {
            scratchpad: format!("User: {input}"),
            messages: vec![Message::user(input)],
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn scratchpad(&self) -> &str {
        &self.scratchpad
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a final answer or an error has been recorded.
    pub fn is_terminal(&self) -> bool {
        self.final_answer.is_some() || self.error.is_some()
    }

    /// Content of the first user message, or `""` if there is none.
    pub fn user_request(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// Next non-terminal generation with an updated transcript.
    pub fn advance(&self, scratchpad: impl Into<String>) -> Self {
        Self {
            scratchpad: scratchpad.into(),
            step_count: self.step_count + 1,
            ..self.clone()
        }
    }

    /// Next generation carrying a final answer.
    pub fn finish(&self, scratchpad: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            scratchpad: scratchpad.into(),
            step_count: self.step_count + 1,
            final_answer: Some(answer.into()),
            ..self.clone()
        }
    }

    /// Next generation carrying an error plus the user-facing message shown
    /// in its place. The error is appended to `scratchpad`.
    pub fn fail(
        &self,
        scratchpad: &str,
        error: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        let error = error.into();
        Self {
            scratchpad: format!("{scratchpad}\n\n❌ **ERROR:** {error}"),
            step_count: self.step_count + 1,
            final_answer: Some(user_message.into()),
            error: Some(error),
            ..self.clone()
        }
    }

    /// Same generation with an error attached; the step counter is untouched.
    pub fn with_error(&self, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_from_user_input() {
        let state = AgentState::from_user_input("scrape example.com");
        assert_eq!(state.step_count(), 0);
        assert_eq!(state.user_request(), "scrape example.com");
        assert_eq!(state.scratchpad(), "User: scrape example.com");
        assert!(!state.is_terminal());
    }

    #[test]
    fn transitions_leave_the_prior_state_untouched() {
        let first = AgentState::from_user_input("hi");
        let second = first.advance("log");
        let third = second.finish("log 2", "done");

        assert_eq!(first.step_count(), 0);
        assert_eq!(first.scratchpad(), "User: hi");
        assert_eq!(second.step_count(), 1);
        assert!(!second.is_terminal());
        assert_eq!(third.step_count(), 2);
        assert_eq!(third.final_answer(), Some("done"));
        assert!(third.is_terminal());
    }

    #[test]
    fn fail_sets_error_and_user_message() {
        let initial = AgentState::from_user_input("hi");
        let state = initial.fail(initial.scratchpad(), "boom", "sorry");
        assert_eq!(state.error(), Some("boom"));
        assert_eq!(state.final_answer(), Some("sorry"));
        assert_eq!(state.step_count(), 1);
        assert!(state.scratchpad().starts_with("User: hi"));
        assert!(state.scratchpad().ends_with("❌ **ERROR:** boom"));
    }

    #[test]
    fn with_error_keeps_step_count() {
        let state = AgentState::from_user_input("hi").advance("x").with_error("capped");
        assert_eq!(state.step_count(), 1);
        assert_eq!(state.error(), Some("capped"));
        assert!(state.final_answer().is_none());
    }

    #[test]
    fn user_request_empty_without_messages() {
        assert_eq!(AgentState::default().user_request(), "");
    }

    #[test]
    fn serde_roundtrip_preserves_equality() {
        let state = AgentState::from_user_input("hola").finish("t", "a");
        let json = serde_json::to_string(&state).unwrap();
        let back: AgentState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
