//! sift CLI: the main entry point.
//!
//! Commands:
//! - `serve`:  start the HTTP API server
//! - `ask`:    run the agent once on a single request
//! - `config`: print the default configuration, or inspect the effective one

use clap::{Parser, Subcommand};
use sift_config::AppConfig;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "sift",
    about = "sift: a web extraction agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the agent on one request and print the answer
    Ask {
        /// The request, e.g. "summarize https://example.com"
        message: String,

        /// Also print the full step transcript
        #[arg(long)]
        trace: bool,
    },

    /// Configuration commands (prints the default config without a subcommand)
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (API key redacted)
    Show,
    /// Print the config file path
    Path,
    /// Load and validate the configuration
    Validate,
}

/// RUST_LOG wins, then `--verbose`, then the configured level.
fn init_tracing(verbose: bool, json: bool, config: Option<&AppConfig>) {
    let default_level = if verbose {
        "debug"
    } else {
        config.map_or("info", |c| c.logging.level.as_str())
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json || config.is_some_and(|c| c.logging.json) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = load_config()?;
            init_tracing(cli.verbose, cli.json, Some(&config));
            commands::serve::run(config, port).await?;
        }
        Commands::Ask { message, trace } => {
            let config = load_config()?;
            init_tracing(cli.verbose, cli.json, Some(&config));
            return commands::ask::run(config, message, trace).await;
        }
        Commands::Config { action } => {
            init_tracing(cli.verbose, cli.json, None);
            match action {
                None => commands::config_cmd::print_default(),
                Some(ConfigAction::Show) => commands::config_cmd::show()?,
                Some(ConfigAction::Path) => commands::config_cmd::path(),
                Some(ConfigAction::Validate) => commands::config_cmd::validate()?,
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
