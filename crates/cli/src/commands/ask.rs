//! `sift ask`: one agent run from the command line.

use sift_config::AppConfig;
use sift_core::state::AgentState;
use sift_gateway::Runtime;
use std::process::ExitCode;
use std::time::Duration;

pub async fn run(
    config: AppConfig,
    message: String,
    trace: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        eprintln!("  ⚠️  No API key configured. Set SIFT_API_KEY or GROQ_API_KEY, or add one to");
        eprintln!("     {}", AppConfig::config_dir().join("config.toml").display());
    }

    let runtime = Runtime::from_config(&config)?;
    let timeout = Duration::from_secs(config.gateway.request_timeout_secs);
    let state = runtime
        .runner()
        .run_with_timeout(AgentState::from_user_input(message), timeout)
        .await;
    runtime.shutdown().await;

    if trace {
        println!("{}\n", state.scratchpad());
    }
    if let Some(answer) = state.final_answer() {
        println!("{answer}");
    }
    match state.error() {
        Some(error) => {
            eprintln!("\nerror: {error}");
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}
