//! Configuration loading, validation, and management for sift.
//!
//! Loads configuration from `$SIFT_CONFIG` or `~/.sift/config.toml` with
//! environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.sift/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model gateway
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop limits
    #[serde(default)]
    pub agent: AgentConfig,

    /// Web extraction engine
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// HTTP boundary
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider name; selects the default base URL (groq, openai, openrouter, ollama, ...)
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Overrides the provider's default base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_llm_timeout() -> u64 {
    30
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            api_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hard cap on steps per request.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Tool failures tolerated before giving up.
    #[serde(default = "default_failure_limit")]
    pub failure_limit: u32,

    /// Max characters of a tool result kept in the transcript.
    #[serde(default = "default_observation_limit")]
    pub observation_limit: usize,

    /// Fetched content with fewer words is reported as unusable.
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Max characters of content handed to the summarizer.
    #[serde(default = "default_summary_window")]
    pub summary_window: usize,

    /// Detect the request language before summarizing.
    #[serde(default = "default_true")]
    pub detect_language: bool,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_failure_limit() -> u32 {
    2
}
fn default_observation_limit() -> usize {
    10_000
}
fn default_min_words() -> usize {
    10
}
fn default_summary_window() -> usize {
    120_000
}
fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            failure_limit: default_failure_limit(),
            observation_limit: default_observation_limit(),
            min_words: default_min_words(),
            summary_window: default_summary_window(),
            detect_language: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Max characters of extracted text.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Static results with fewer words are retried in the browser.
    #[serde(default = "default_min_words_poor")]
    pub min_words_poor: usize,

    #[serde(default = "default_scraper_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base of the exponential backoff between static retries.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: f64,

    /// Minimum spacing between requests to the same host.
    #[serde(default = "default_polite_delay")]
    pub polite_delay_secs: f64,

    /// Upper bound of the random jitter added to the politeness delay.
    #[serde(default = "default_polite_jitter")]
    pub polite_jitter_ms: u64,

    /// Max characters returned by the raw fetcher tool.
    #[serde(default = "default_fetch_max_length")]
    pub fetch_max_length: usize,

    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Hosts (and their subdomains) that always go straight to the browser.
    #[serde(default = "default_js_heavy_domains")]
    pub js_heavy_domains: Vec<String>,

    #[serde(default)]
    pub browser: BrowserConfig,
}

fn default_max_length() -> usize {
    15_000
}
fn default_min_words_poor() -> usize {
    10
}
fn default_scraper_timeout() -> u64 {
    30
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_backoff() -> f64 {
    2.0
}
fn default_polite_delay() -> f64 {
    1.0
}
fn default_polite_jitter() -> u64 {
    500
}
fn default_fetch_max_length() -> usize {
    10_000
}
fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15".into(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".into(),
    ]
}
fn default_js_heavy_domains() -> Vec<String> {
    [
        "youtube.com",
        "facebook.com",
        "twitter.com",
        "x.com",
        "instagram.com",
        "linkedin.com",
        "tiktok.com",
        "netflix.com",
        "reddit.com",
        "discord.com",
        "medium.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            min_words_poor: default_min_words_poor(),
            timeout_secs: default_scraper_timeout(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_secs: default_retry_backoff(),
            polite_delay_secs: default_polite_delay(),
            polite_jitter_ms: default_polite_jitter(),
            fetch_max_length: default_fetch_max_length(),
            user_agents: default_user_agents(),
            js_heavy_domains: default_js_heavy_domains(),
            browser: BrowserConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Pass `--no-sandbox`; needed when running as root in containers.
    #[serde(default)]
    pub no_sandbox: bool,

    /// Chrome/Chromium binary; autodetected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,

    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Best-effort wait for content selectors and network quiet.
    #[serde(default = "default_settle_timeout")]
    pub settle_timeout_secs: u64,

    /// Candidate viewports; one is picked at random per page.
    #[serde(default = "default_viewports")]
    pub viewports: Vec<Viewport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

fn default_navigation_timeout() -> u64 {
    30
}
fn default_settle_timeout() -> u64 {
    5
}
fn default_viewports() -> Vec<Viewport> {
    vec![
        Viewport {
            width: 1920,
            height: 1080,
        },
        Viewport {
            width: 1366,
            height: 768,
        },
        Viewport {
            width: 1536,
            height: 864,
        },
    ]
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: false,
            executable: None,
            navigation_timeout_secs: default_navigation_timeout(),
            settle_timeout_secs: default_settle_timeout(),
            viewports: default_viewports(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// CORS origins; `"*"` allows any.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Upper bound on one agent run.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}
fn default_request_timeout() -> u64 {
    300
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `$SIFT_CONFIG` or `~/.sift/config.toml`, then
    /// apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("SIFT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"));
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (highest priority).
    ///
    /// API key: `SIFT_API_KEY`, then `GROQ_API_KEY`, only when the file sets
    /// none. Model: `SIFT_MODEL`, then `GROQ_MODEL`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup("SIFT_API_KEY").or_else(|| lookup("GROQ_API_KEY"));
        }
        if let Some(provider) = lookup("SIFT_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("SIFT_MODEL").or_else(|| lookup("GROQ_MODEL")) {
            self.llm.model = model;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Some(v) = lookup("MAX_ITERATIONS") {
            self.agent.max_iterations = parse_env("MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("SCRAPER_MAX_LENGTH") {
            self.scraper.max_length = parse_env("SCRAPER_MAX_LENGTH", &v)?;
        }
        if let Some(v) = lookup("SCRAPER_MIN_WORDS_POOR") {
            self.scraper.min_words_poor = parse_env("SCRAPER_MIN_WORDS_POOR", &v)?;
        }
        if let Some(v) = lookup("SCRAPER_TIMEOUT") {
            self.scraper.timeout_secs = parse_env("SCRAPER_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("SCRAPER_RETRY_ATTEMPTS") {
            self.scraper.retry_attempts = parse_env("SCRAPER_RETRY_ATTEMPTS", &v)?;
        }
        if let Some(v) = lookup("SCRAPER_POLITE_DELAY") {
            self.scraper.polite_delay_secs = parse_env("SCRAPER_POLITE_DELAY", &v)?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".sift")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        if self.scraper.retry_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "scraper.retry_attempts must be at least 1".into(),
            ));
        }
        if self.scraper.user_agents.is_empty() {
            return Err(ConfigError::ValidationError(
                "scraper.user_agents must not be empty".into(),
            ));
        }
        if self.scraper.max_length == 0 {
            return Err(ConfigError::ValidationError(
                "scraper.max_length must be > 0".into(),
            ));
        }
        let valid_delay = |secs: f64| secs.is_finite() && secs >= 0.0;
        if !valid_delay(self.scraper.polite_delay_secs) || !valid_delay(self.scraper.retry_backoff_secs) {
            return Err(ConfigError::ValidationError(
                "scraper delays must be finite and not negative".into(),
            ));
        }
        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.llm.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid value for {key}: {value:?}")]
    EnvError { key: String, value: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
