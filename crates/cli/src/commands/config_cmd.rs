//! `sift config`: configuration commands.

use sift_config::AppConfig;

const REDACTED: &str = "***";

pub fn print_default() {
    print!("{}", AppConfig::default_toml());
}

/// Effective configuration as TOML with the API key masked.
fn redacted_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut config = config.clone();
    if config.llm.api_key.is_some() {
        config.llm.api_key = Some(REDACTED.into());
    }
    toml::to_string_pretty(&config)
}

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    print!("{}", redacted_toml(&config)?);
    Ok(())
}

pub fn path() {
    println!("{}", AppConfig::config_dir().join("config.toml").display());
}

pub fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed and validated");
            if !config.has_api_key() {
                println!("   ⚠️  No API key set (SIFT_API_KEY or GROQ_API_KEY)");
            }
            println!();
            println!("   Provider:   {}", config.llm.provider);
            println!("   Model:      {}", config.llm.model);
            println!("   Iterations: {}", config.agent.max_iterations);
            println!("   Gateway:    {}:{}", config.gateway.host, config.gateway.port);
            Ok(())
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            Err(e.into())
        }
    }
}
