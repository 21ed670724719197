//! Request handlers. Translation only: build the initial state, run, and
//! copy the terminal state into the response.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use sift_core::state::AgentState;
use tracing::info;

use crate::SharedState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub user_input: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub final_answer: Option<String>,
    pub scratchpad: String,
    pub error: Option<String>,
    pub steps: u32,
}

impl From<AgentState> for RunResponse {
    fn from(state: AgentState) -> Self {
        Self {
            final_answer: state.final_answer().map(str::to_string),
            scratchpad: state.scratchpad().to_string(),
            error: state.error().map(str::to_string),
            steps: state.step_count(),
        }
    }
}

pub async fn run_agent(
    State(state): State<SharedState>,
    Json(request): Json<RunRequest>,
) -> Json<RunResponse> {
    info!(input_len = request.user_input.len(), "Agent run requested");

    let initial = AgentState::from_user_input(request.user_input);
    let terminal = state
        .runner
        .run_with_timeout(initial, state.request_timeout)
        .await;

    info!(
        steps = terminal.step_count(),
        error = terminal.error().is_some(),
        "Agent run completed"
    );
    Json(terminal.into())
}
