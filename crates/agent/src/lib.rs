//! The Think-Act-Observe agent.
//!
//! Each [`Agent::step`] asks the model for the next action, runs the chosen
//! tool, and returns the next [`AgentState`](sift_core::AgentState):
//!
//! 1. **Think**: build a prompt from the tool list and the transcript
//! 2. **Parse**: extract `thought` / `action` / `action_input` from the reply
//! 3. **Act**: dispatch the tool unless the action repeats or failures piled up
//! 4. **Observe**: append the result, and stop early once a URL tool returned
//!    something conclusive
//!
//! [`AgentRunner`] drives steps until the state is terminal or the iteration
//! cap is hit.

pub mod context;
pub mod language;
pub mod loop_runner;
pub mod patterns;

pub use context::{ActionRecord, ParsedAction, build_prompt, parse_response, summary_prompt};
pub use language::{LanguageDetector, NoLanguageDetection, WhatlangDetector};
pub use loop_runner::AgentRunner;
pub use patterns::{Agent, ReactAgent};
