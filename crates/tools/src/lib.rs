//! Built-in tool implementations for sift.
//!
//! The tool set is fixed:
//! - `fetcher`: raw HTTP GET of a URL
//! - `scraper`: adaptive text extraction (static fetch or headless render)
//! - `parser`: email / URL extraction from text

pub mod fetcher;
pub mod parser;
pub mod scraper;

use rand::seq::IndexedRandom;
use sift_config::ScraperConfig;
use sift_core::tool::ToolRegistry;
use std::sync::Arc;

pub use fetcher::FetcherTool;
pub use parser::ParserTool;
pub use crate::scraper::render::{BrowserProfile, PageRenderer, RenderError};
pub use crate::scraper::{ChromiumRenderer, ScrapeFailure, ScraperTool, SharedBrowser};

/// Used when the configured list is empty.
const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Create the tool registry with all built-in tools.
///
/// `client` is shared by the fetcher and the static scraper path;
/// `renderer` backs the scraper's rendered path.
pub fn default_registry(
    config: &ScraperConfig,
    client: reqwest::Client,
    renderer: Arc<dyn PageRenderer>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(FetcherTool::new(config, client.clone())));
    registry.register(Box::new(ScraperTool::new(config, client, renderer)));
    registry.register(Box::new(ParserTool));
    registry
}

/// Prefix `https://` when the input carries no http(s) scheme.
pub(crate) fn normalize_scheme(input: &str) -> String {
    let input = input.trim();
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{input}")
    }
}

pub(crate) fn pick_user_agent(agents: &[String]) -> &str {
    agents
        .choose(&mut rand::rng())
        .map(String::as_str)
        .unwrap_or(FALLBACK_USER_AGENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sift_core::ToolKind;

    struct NoRender;

    #[async_trait]
    impl PageRenderer for NoRender {
        async fn render(&self, _url: &str, _profile: &BrowserProfile) -> Result<String, RenderError> {
            Err(RenderError::Browser("disabled".into()))
        }
    }

    #[test]
    fn default_registry_has_fixed_tool_set() {
        let registry = default_registry(
            &ScraperConfig::default(),
            reqwest::Client::new(),
            Arc::new(NoRender),
        );
        assert_eq!(registry.names(), vec!["fetcher", "parser", "scraper"]);
        assert_eq!(registry.get("fetcher").unwrap().kind(), ToolKind::Fetch);
        assert_eq!(registry.get("scraper").unwrap().kind(), ToolKind::Scrape);
        assert_eq!(registry.get("parser").unwrap().kind(), ToolKind::Extract);
    }

    #[test]
    fn scheme_defaults_to_https() {
        assert_eq!(normalize_scheme(" example.com "), "https://example.com");
        assert_eq!(normalize_scheme("http://a.b"), "http://a.b");
        assert_eq!(normalize_scheme("HTTPS://a.b"), "HTTPS://a.b");
    }

    #[test]
    fn user_agent_from_list_or_fallback() {
        let agents = vec!["ua-1".to_string()];
        assert_eq!(pick_user_agent(&agents), "ua-1");
        assert_eq!(pick_user_agent(&[]), FALLBACK_USER_AGENT);
    }
}
