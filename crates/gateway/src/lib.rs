//! HTTP API gateway for sift.
//!
//! Two routes: a health check and a blocking agent run. Each run executes
//! in its own request task with its own state chain; the only process-wide
//! resources are the shared browser and the HTTP client.
//!
//! Built on Axum.

pub mod api;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use sift_agent::{AgentRunner, ReactAgent};
use sift_config::{AppConfig, GatewayConfig};
use sift_tools::{ChromiumRenderer, SharedBrowser};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub runner: Arc<AgentRunner>,
    pub request_timeout: Duration,
}

pub type SharedState = Arc<GatewayState>;

/// The wired agent stack: runner plus the browser it may launch.
pub struct Runtime {
    runner: Arc<AgentRunner>,
    browser: Arc<SharedBrowser>,
}

impl Runtime {
    /// Build provider, tools, agent and runner once from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        let provider = sift_providers::build_from_config(config, client.clone());
        let browser = Arc::new(SharedBrowser::new(config.scraper.browser.clone()));
        let renderer = Arc::new(ChromiumRenderer::new(Arc::clone(&browser)));
        let tools = Arc::new(sift_tools::default_registry(&config.scraper, client, renderer));
        info!(
            provider = provider.name(),
            model = %config.llm.model,
            tools = tools.len(),
            "Agent stack ready"
        );

        let agent = Arc::new(ReactAgent::from_config(provider, tools, &config.agent));
        let runner = Arc::new(AgentRunner::new(agent, config.agent.max_iterations));
        Ok(Self { runner, browser })
    }

    pub fn runner(&self) -> Arc<AgentRunner> {
        Arc::clone(&self.runner)
    }

    /// Close the browser if a render ever launched it.
    pub async fn shutdown(&self) {
        self.browser.shutdown().await;
    }
}

/// Build the Axum router with all gateway routes.
///
/// Layers: CORS from `gateway.allowed_origins`, a 1 MB body limit, and
/// HTTP trace logging.
pub fn build_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/agent/run", post(api::run_agent))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors_layer(&gateway.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Start the gateway HTTP server and serve until Ctrl-C.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let runtime = Runtime::from_config(&config)?;
    let state = Arc::new(GatewayState {
        runner: runtime.runner(),
        request_timeout: Duration::from_secs(config.gateway.request_timeout_secs),
    });
    let app = build_router(state, &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.shutdown().await;
    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
