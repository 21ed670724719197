//! Rendered extraction through a headless Chromium.
//!
//! [`SharedBrowser`] owns the one browser process. It is launched lazily on
//! first use, relaunched if it died, and closed through [`SharedBrowser::shutdown`]
//! by whoever owns the process lifecycle. Every page load runs in its own
//! browser context, so cookies and storage never leak between requests.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use sift_config::{BrowserConfig, Viewport};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Selectors that indicate the main content has been rendered.
const CONTENT_SELECTORS: [&str; 5] = ["article", "main", "#content", ".content", "p"];
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Per-page identity presented to the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub viewport: Viewport,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page load timed out")]
    Timeout,

    #[error("{0}")]
    Browser(String),
}

impl From<CdpError> for RenderError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Timeout => RenderError::Timeout,
            other => RenderError::Browser(other.to_string()),
        }
    }
}

/// Loads a URL with scripts executed and returns the resulting HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, profile: &BrowserProfile) -> Result<String, RenderError>;
}

struct LaunchedBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// The process-wide browser handle.
pub struct SharedBrowser {
    config: BrowserConfig,
    inner: Mutex<Option<LaunchedBrowser>>,
}

impl SharedBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(None),
        }
    }

    /// Whether a browser process is currently running.
    pub async fn is_running(&self) -> bool {
        self.inner
            .lock()
            .await
            .as_ref()
            .is_some_and(|b| !b.handler.is_finished())
    }

    fn chrome_config(&self) -> Result<ChromeConfig, RenderError> {
        let mut builder = ChromeConfig::builder()
            .request_timeout(Duration::from_secs(self.config.navigation_timeout_secs))
            .arg("--disable-blink-features=AutomationControlled")
            .args([
                "--disable-dev-shm-usage",
                "--disable-extensions",
                "--no-first-run",
                "--no-default-browser-check",
                "--mute-audio",
            ]);
        if !self.config.headless {
            builder = builder.with_head();
        }
        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.config.executable {
            builder = builder.chrome_executable(path.clone());
        }
        builder.build().map_err(RenderError::Browser)
    }

    async fn launch(&self) -> Result<LaunchedBrowser, RenderError> {
        info!(headless = self.config.headless, "Launching shared browser");
        let (browser, mut handler) = Browser::launch(self.chrome_config()?).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler stopped");
                    break;
                }
            }
        });
        Ok(LaunchedBrowser { browser, handler })
    }

    /// Open a blank page inside a fresh browser context.
    async fn open_page(&self) -> Result<(Page, BrowserContextId), RenderError> {
        let mut guard = self.inner.lock().await;

        if guard.as_ref().is_some_and(|b| b.handler.is_finished()) {
            warn!("Shared browser exited, relaunching");
            *guard = None;
        }
        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }
        let Some(launched) = guard.as_mut() else {
            return Err(RenderError::Browser("browser unavailable".into()));
        };

        let context_id = launched
            .browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await?;
        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(RenderError::Browser)?;

        match launched.browser.new_page(target).await {
            Ok(page) => Ok((page, context_id)),
            Err(e) => {
                let _ = launched.browser.dispose_browser_context(context_id).await;
                Err(e.into())
            }
        }
    }

    async fn dispose_context(&self, context_id: BrowserContextId) {
        let mut guard = self.inner.lock().await;
        if let Some(launched) = guard.as_mut()
            && let Err(e) = launched.browser.dispose_browser_context(context_id).await
        {
            debug!(error = %e, "Failed to dispose browser context");
        }
    }

    /// Close the browser process. Later renders relaunch it.
    pub async fn shutdown(&self) {
        let Some(mut launched) = self.inner.lock().await.take() else {
            return;
        };
        info!("Closing shared browser");
        if let Err(e) = launched.browser.close().await {
            warn!(error = %e, "Browser close failed");
        }
        let _ = launched.browser.wait().await;
        launched.handler.abort();
    }
}

/// [`PageRenderer`] backed by the [`SharedBrowser`].
pub struct ChromiumRenderer {
    browser: std::sync::Arc<SharedBrowser>,
    navigation_timeout: Duration,
    settle_timeout: Duration,
}

impl ChromiumRenderer {
    pub fn new(browser: std::sync::Arc<SharedBrowser>) -> Self {
        let navigation_timeout = Duration::from_secs(browser.config.navigation_timeout_secs);
        let settle_timeout = Duration::from_secs(browser.config.settle_timeout_secs);
        Self {
            browser,
            navigation_timeout,
            settle_timeout,
        }
    }

    async fn load(&self, page: &Page, url: &str, profile: &BrowserProfile) -> Result<String, RenderError> {
        page.execute(SetUserAgentOverrideParams::new(profile.user_agent.clone()))
            .await?;
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(profile.viewport.width),
            i64::from(profile.viewport.height),
            1.0,
            false,
        ))
        .await?;

        match tokio::time::timeout(self.navigation_timeout, page.goto(url)).await {
            Err(_) => return Err(RenderError::Timeout),
            Ok(result) => {
                result?;
            }
        }

        self.settle(page).await;
        Ok(page.content().await?)
    }

    /// Best-effort waits for network quiet and for a content element.
    /// Neither timing out is an error.
    async fn settle(&self, page: &Page) {
        let complete = async {
            loop {
                if let Ok(state) = page.evaluate("document.readyState").await
                    && state.into_value::<String>().is_ok_and(|s| s == "complete")
                {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        if tokio::time::timeout(self.settle_timeout, complete).await.is_err() {
            debug!("readyState wait timed out, continuing");
        }

        let content = async {
            loop {
                for selector in CONTENT_SELECTORS {
                    if page.find_element(selector).await.is_ok() {
                        return;
                    }
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        if tokio::time::timeout(self.settle_timeout, content).await.is_err() {
            debug!("No content selector matched, continuing");
        }
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str, profile: &BrowserProfile) -> Result<String, RenderError> {
        let (page, context_id) = self.browser.open_page().await?;
        debug!(url, user_agent = %profile.user_agent, "Rendering page");

        let result = self.load(&page, url, profile).await;

        if let Err(e) = page.close().await {
            debug!(error = %e, "Page close failed");
        }
        self.browser.dispose_context(context_id).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdp_timeout_maps_to_render_timeout() {
        assert!(matches!(RenderError::from(CdpError::Timeout), RenderError::Timeout));
    }

    #[test]
    fn chrome_config_builds_with_defaults() {
        let browser = SharedBrowser::new(BrowserConfig {
            executable: Some("/usr/bin/chromium".into()),
            ..BrowserConfig::default()
        });
        assert!(browser.chrome_config().is_ok());
    }

    #[tokio::test]
    async fn not_running_until_first_render() {
        let browser = SharedBrowser::new(BrowserConfig::default());
        assert!(!browser.is_running().await);
        browser.shutdown().await;
        assert!(!browser.is_running().await);
    }
}
