//! Drives an [`Agent`] from an initial state to a terminal one.

use sift_core::state::AgentState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::context::ActionRecord;
use crate::patterns::Agent;

/// Runs steps sequentially until the state is terminal or the cap is hit.
pub struct AgentRunner {
    agent: Arc<dyn Agent>,
    max_iterations: u32,
}

impl AgentRunner {
    pub fn new(agent: Arc<dyn Agent>, max_iterations: u32) -> Self {
        Self {
            agent,
            max_iterations,
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run to completion with a fresh [`ActionRecord`].
    pub async fn run(&self, initial: AgentState) -> AgentState {
        let mut record = ActionRecord::new();
        let mut state = initial;

        while !state.is_terminal() && state.step_count() < self.max_iterations {
            state = self.agent.step(&state, &mut record).await;
        }

        if !state.is_terminal() {
            warn!(cap = self.max_iterations, "Iteration cap reached");
            return state.with_error(format!(
                "Max iterations ({}) reached without final answer.",
                self.max_iterations
            ));
        }

        info!(
            steps = state.step_count(),
            tool_calls = record.len(),
            failed = state.error().is_some(),
            "Run finished"
        );
        state
    }

    /// [`run`](Self::run) bounded by `timeout`. On expiry the in-flight step
    /// is dropped and the initial state comes back with a timeout error.
    pub async fn run_with_timeout(&self, initial: AgentState, timeout: Duration) -> AgentState {
        match tokio::time::timeout(timeout, self.run(initial.clone())).await {
            Ok(state) => state,
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "Run timed out");
                initial.with_error(format!("Request timed out after {}s", timeout.as_secs()))
            }
        }
    }
}
