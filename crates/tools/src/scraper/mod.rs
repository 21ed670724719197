//! Adaptive scraper: picks static fetch or browser rendering per URL.
//!
//! Strategy:
//! 1. Hosts on the JS-heavy list go straight to the browser.
//! 2. Everything else is fetched statically first; a thin or
//!    "enable JavaScript" result is retried in the browser. If that render
//!    fails, a static result with enough words is returned instead.
//!
//! The public contract never fails: every outcome, including failures, is a
//! human-readable string. Failures always carry one of the agent's error
//! markers (`sift_core::tool::ERROR_MARKERS`) so the loop can tell them
//! apart from content.

pub mod extract;
pub mod render;
pub mod throttle;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use sift_config::{ScraperConfig, Viewport};
use sift_core::error::ToolError;
use sift_core::text::word_count;
use sift_core::tool::{Tool, ToolKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::{normalize_scheme, pick_user_agent};
use render::{BrowserProfile, PageRenderer, RenderError};
use throttle::DomainThrottle;

pub use extract::{TRUNCATION_MARKER, html_to_text};
pub use render::{ChromiumRenderer, SharedBrowser};

/// Phrases that mark a static page as a JavaScript shell.
const JS_REQUIRED_PHRASES: [&str; 3] = ["loading", "please enable javascript", "javascript required"];

/// Why a scrape produced no content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeFailure {
    #[error("❌ Error: invalid URL: {input}")]
    InvalidUrl { input: String },

    #[error("❌ HTTP Error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("❌ Failed to fetch {url} after {attempts} attempts: {reason}")]
    Network {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("❌ Timeout while rendering page: {url}")]
    RenderTimeout { url: String },

    #[error("❌ Error: failed to render page {url}: {reason}")]
    Render { url: String, reason: String },
}

/// Outcome of one extraction path.
#[derive(Debug)]
enum Extraction {
    Content(String),
    /// Reachable but not scrapable (e.g. a PDF). Not an error, never upgraded.
    Unsupported(String),
    Failed(ScrapeFailure),
}

impl Extraction {
    fn into_text(self) -> String {
        match self {
            Extraction::Content(text) | Extraction::Unsupported(text) => text,
            Extraction::Failed(failure) => failure.to_string(),
        }
    }
}

/// The `scraper` tool.
pub struct ScraperTool {
    client: reqwest::Client,
    renderer: Arc<dyn PageRenderer>,
    throttle: DomainThrottle,
    config: ScraperConfig,
}

impl ScraperTool {
    pub fn new(config: &ScraperConfig, client: reqwest::Client, renderer: Arc<dyn PageRenderer>) -> Self {
        let throttle = DomainThrottle::new(
            secs_or_zero(config.polite_delay_secs),
            Duration::from_millis(config.polite_jitter_ms),
        );
        Self {
            client,
            renderer,
            throttle,
            config: config.clone(),
        }
    }

    /// Extract readable text from `input`. Never fails; see the module docs.
    pub async fn scrape(&self, input: &str) -> String {
        let url = match parse_url(input) {
            Ok(url) => url,
            Err(failure) => return failure.to_string(),
        };
        let host = url.host_str().unwrap_or_default().to_lowercase();

        self.throttle.wait(&host).await;

        let result = if self.is_js_heavy(&host) {
            info!(host = %host, "Known JS-heavy host, rendering");
            self.scrape_rendered(&url).await
        } else {
            debug!(host = %host, "Trying static scrape");
            let result = self.scrape_static(&url).await;
            match result {
                Extraction::Content(text) if self.needs_render(&text) => {
                    info!(url = %url, "Static result looks thin, upgrading to rendered");
                    self.upgrade(&url, text).await
                }
                other => other,
            }
        };

        result.into_text()
    }

    fn is_js_heavy(&self, host: &str) -> bool {
        self.config.js_heavy_domains.iter().any(|domain| {
            let domain = domain.to_lowercase();
            host == domain || host.ends_with(&format!(".{domain}"))
        })
    }

    fn needs_render(&self, text: &str) -> bool {
        if word_count(text) < self.config.min_words_poor {
            return true;
        }
        let lower = text.to_lowercase();
        JS_REQUIRED_PHRASES.iter().any(|phrase| lower.contains(phrase))
    }

    async fn scrape_static(&self, url: &Url) -> Extraction {
        let attempts = self.config.retry_attempts.max(1);
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let response = self
                .client
                .get(url.as_str())
                .header(USER_AGENT, pick_user_agent(&self.config.user_agents))
                .timeout(timeout)
                .send()
                .await;

            let error = match response {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        return Extraction::Failed(ScrapeFailure::HttpStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    let content_type = resp
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_lowercase();
                    if !is_html_content_type(&content_type) {
                        warn!(url = %url, content_type = %content_type, "Non-HTML content");
                        let shown = if content_type.is_empty() { "unknown" } else { content_type.as_str() };
                        return Extraction::Unsupported(format!(
                            "⚠️ The URL returned {shown} content. Only HTML pages can be scraped."
                        ));
                    }

                    match resp.text().await {
                        Ok(body) => return Extraction::Content(self.extract(&body)),
                        Err(e) => e,
                    }
                }
                Err(e) if is_transient(&e) => e,
                Err(e) => {
                    return Extraction::Failed(ScrapeFailure::Network {
                        url: url.to_string(),
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
            };

            warn!(url = %url, attempt, error = %error, "Static scrape attempt failed");
            last_error = error.to_string();
            if attempt < attempts {
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        Extraction::Failed(ScrapeFailure::Network {
            url: url.to_string(),
            attempts,
            reason: last_error,
        })
    }

    /// Render after a thin static result. If rendering fails and the static
    /// text was only flagged by a JavaScript phrase, the static text stands.
    async fn upgrade(&self, url: &Url, static_text: String) -> Extraction {
        match self.scrape_rendered(url).await {
            Extraction::Failed(failure) if word_count(&static_text) >= self.config.min_words_poor => {
                warn!(url = %url, error = %failure, "Render failed, keeping static content");
                Extraction::Content(static_text)
            }
            rendered => rendered,
        }
    }

    async fn scrape_rendered(&self, url: &Url) -> Extraction {
        let profile = self.random_profile();
        match self.renderer.render(url.as_str(), &profile).await {
            Ok(html) => Extraction::Content(html_to_text(&html, self.config.max_length)),
            Err(RenderError::Timeout) => {
                warn!(url = %url, "Render timed out");
                Extraction::Failed(ScrapeFailure::RenderTimeout {
                    url: url.to_string(),
                })
            }
            Err(RenderError::Browser(reason)) => {
                warn!(url = %url, error = %reason, "Render failed");
                Extraction::Failed(ScrapeFailure::Render {
                    url: url.to_string(),
                    reason,
                })
            }
        }
    }

    /// HTML goes through structural extraction; anything else is kept raw.
    fn extract(&self, body: &str) -> String {
        if extract::looks_like_html(body) {
            html_to_text(body, self.config.max_length)
        } else {
            extract::truncate(body.trim(), self.config.max_length)
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2f64.powi(attempt.saturating_sub(1) as i32);
        secs_or_zero(self.config.retry_backoff_secs * factor)
    }

    fn random_profile(&self) -> BrowserProfile {
        let viewport = self
            .config
            .browser
            .viewports
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(Viewport {
                width: 1920,
                height: 1080,
            });
        BrowserProfile {
            user_agent: pick_user_agent(&self.config.user_agents).to_string(),
            viewport,
        }
    }
}

#[async_trait]
impl Tool for ScraperTool {
    fn name(&self) -> &str {
        "scraper"
    }

    fn description(&self) -> &str {
        "Advanced web scraper that extracts clean text from ANY website, \
         including JavaScript-heavy sites. Input: full URL."
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Scrape
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        Ok(self.scrape(input).await)
    }
}

fn parse_url(input: &str) -> Result<Url, ScrapeFailure> {
    let invalid = || ScrapeFailure::InvalidUrl {
        input: input.trim().to_string(),
    };
    let url = Url::parse(&normalize_scheme(input)).map_err(|_| invalid())?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid()),
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
}

/// Negative or non-finite delays mean no delay.
fn secs_or_zero(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
