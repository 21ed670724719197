//! Fetcher tool: raw HTTP GET of a URL.
//!
//! Returns the response body as text without any HTML processing. A 403 or
//! a transport error on the first attempt is retried once with a different
//! user agent, since many sites block the first unknown client.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use sift_config::ScraperConfig;
use sift_core::error::ToolError;
use sift_core::text::truncate_chars;
use sift_core::tool::{Tool, ToolKind};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{normalize_scheme, pick_user_agent};

const FETCH_ATTEMPTS: u32 = 2;
const TRUNCATION_MARKER: &str = "\n... (truncated)";

pub struct FetcherTool {
    client: reqwest::Client,
    user_agents: Vec<String>,
    max_length: usize,
    timeout: Duration,
}

impl FetcherTool {
    pub fn new(config: &ScraperConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            user_agents: config.user_agents.clone(),
            max_length: config.fetch_max_length,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// GET `input` and return the body, or a failure line. Never errors.
    pub async fn fetch(&self, input: &str) -> String {
        let url = normalize_scheme(input);

        for attempt in 1..=FETCH_ATTEMPTS {
            let last_attempt = attempt == FETCH_ATTEMPTS;
            let response = self
                .client
                .get(&url)
                .header(USER_AGENT, pick_user_agent(&self.user_agents))
                .header(
                    ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => match resp.text().await {
                    Ok(body) => {
                        debug!(url = %url, chars = body.len(), "Fetched");
                        return truncate_chars(&body, self.max_length, TRUNCATION_MARKER);
                    }
                    Err(e) if !last_attempt => {
                        warn!(url = %url, error = %e, "Body read failed, retrying");
                    }
                    Err(e) => return fetch_failure(&url, e),
                },
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if status == 403 && !last_attempt {
                        debug!(url = %url, "403 on first attempt, retrying");
                        continue;
                    }
                    return format!("HTTP Error {status}: {url}");
                }
                Err(e) if !last_attempt => {
                    warn!(url = %url, error = %e, "Fetch failed, retrying");
                }
                Err(e) => return fetch_failure(&url, e),
            }
        }

        fetch_failure(&url, "no attempt succeeded")
    }
}

fn fetch_failure(url: &str, reason: impl Display) -> String {
    format!("Error: Failed to fetch {url}: {reason}")
}

#[async_trait]
impl Tool for FetcherTool {
    fn name(&self) -> &str {
        "fetcher"
    }

    fn description(&self) -> &str {
        "Fetch the raw HTML content of a URL. Input should be a valid URL."
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Fetch
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        if input.trim().is_empty() {
            return Err(ToolError::InvalidInput("fetcher needs a URL".into()));
        }
        Ok(self.fetch(input).await)
    }
}
