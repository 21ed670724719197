//! `sift serve`: start the HTTP API server.

use sift_config::AppConfig;

pub async fn run(mut config: AppConfig, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("sift gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.llm.provider, config.llm.model);
    if !config.has_api_key() {
        println!("   ⚠️  No API key set (SIFT_API_KEY or GROQ_API_KEY)");
    }

    sift_gateway::start(config).await?;

    Ok(())
}
