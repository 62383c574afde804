//! Headless-browser fetch for pages populated by client-side scripts.
//!
//! Each fetch launches a fresh browser, navigates, waits for the engine's
//! "results loaded" marker, and returns the rendered document. A marker
//! that never appears is not an error: whatever content is present is
//! returned. A browser that cannot launch or navigate yields a fixed
//! placeholder document instead of an error.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;

use super::{PlainFetcher, ERROR_PLACEHOLDER, TIMEOUT_PLACEHOLDER};
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::http;

const MARKER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Selector whose presence means an engine's results have rendered,
/// chosen by the URL's host.
pub fn results_marker(url: &str) -> &'static str {
    let host = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host.starts_with("google.") {
        "#tads, #taw, div[data-text-ad], #rso .yuRUbf"
    } else if host == "bing.com" || host.ends_with(".bing.com") {
        "#b_results li.b_algo, li.b_ad, #b_results"
    } else if host == "duckduckgo.com" || host.ends_with(".duckduckgo.com") {
        ".result, .web-result"
    } else if host.ends_with("yahoo.com") {
        "#web .algo, #web li"
    } else {
        "body"
    }
}

enum RenderFailure {
    /// The browser never started.
    Launch(ScrapeError),
    /// The browser started but the page could not be loaded.
    Load(ScrapeError),
}

/// Headless Chrome fetcher.
#[derive(Debug, Clone)]
pub struct RenderedFetcher {
    chrome_executable: Option<PathBuf>,
    user_agent: String,
    render_wait: Duration,
    page_load_timeout: Duration,
    fallback: Option<PlainFetcher>,
}

impl RenderedFetcher {
    /// `fallback` is tried when the browser cannot be launched, before
    /// settling for the placeholder document.
    pub fn new(config: &ScrapeConfig, fallback: Option<PlainFetcher>) -> Self {
        Self {
            chrome_executable: config.chrome_executable.clone(),
            user_agent: http::user_agent(config),
            render_wait: config.render_wait(),
            page_load_timeout: config.page_load_timeout(),
            fallback,
        }
    }

    /// Fetch `url` through the browser. Never fails.
    pub async fn fetch(&self, url: &str) -> String {
        self.fetch_waiting_for(url, results_marker(url)).await
    }

    /// [`fetch`](Self::fetch) with an explicit results-loaded marker.
    pub(crate) async fn fetch_waiting_for(&self, url: &str, marker: &str) -> String {
        tracing::trace!(url, "rendered fetch");
        let page = http::redact_url(url);
        let failure = match self.render(url, marker).await {
            Ok(html) => return html,
            Err(failure) => failure,
        };

        let error = match failure {
            RenderFailure::Launch(error) => {
                tracing::warn!(%page, %error, "browser launch failed");
                if let Some(plain) = &self.fallback {
                    match plain.fetch(url).await {
                        Ok(body) => return body,
                        Err(e) => tracing::warn!(%page, error = %e, "plain fallback failed"),
                    }
                }
                error
            }
            RenderFailure::Load(error) => {
                tracing::warn!(%page, %error, "page load failed");
                error
            }
        };

        match error {
            ScrapeError::Timeout(_) => TIMEOUT_PLACEHOLDER.to_owned(),
            _ => ERROR_PLACEHOLDER.to_owned(),
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1366, 768)
            .request_timeout(self.page_load_timeout)
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run");
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|e| ScrapeError::Browser(format!("invalid browser config: {e}")))
    }

    async fn render(&self, url: &str, marker: &str) -> Result<String, RenderFailure> {
        let config = self.browser_config().map_err(RenderFailure::Launch)?;
        let (mut browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            RenderFailure::Launch(ScrapeError::Browser(format!("failed to launch: {e}")))
        })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "CDP handler error");
                }
            }
        });

        let result = self.load(&browser, url, marker).await.map_err(RenderFailure::Load);

        match browser.close().await {
            Ok(_) => {
                if let Err(e) = browser.wait().await {
                    tracing::debug!(error = %e, "browser exit wait failed");
                }
            }
            Err(e) => tracing::debug!(error = %e, "browser close failed"),
        }
        handler_task.abort();
        result
    }

    async fn load(
        &self,
        browser: &Browser,
        url: &str,
        marker: &str,
    ) -> Result<String, ScrapeError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Browser(format!("failed to open page: {e}")))?;

        match tokio::time::timeout(self.page_load_timeout, page.goto(url)).await {
            Err(_) => {
                return Err(ScrapeError::Timeout(format!(
                    "{} did not load within {}s",
                    http::redact_url(url),
                    self.page_load_timeout.as_secs()
                )))
            }
            Ok(Err(e)) => {
                return Err(ScrapeError::Browser(format!(
                    "navigation to {} failed: {e}",
                    http::redact_url(url)
                )))
            }
            Ok(Ok(_)) => {}
        }

        if !self.wait_for_marker(&page, marker).await {
            tracing::debug!(
                page = %http::redact_url(url),
                marker,
                "results marker not found, using partial content"
            );
        }

        let html = page
            .content()
            .await
            .map_err(|e| ScrapeError::Browser(format!("failed to read page content: {e}")))?;
        tracing::trace!(url, bytes = html.len(), "rendered page captured");
        Ok(html)
    }

    /// Poll for `marker` until it appears or the render wait elapses.
    async fn wait_for_marker(&self, page: &Page, marker: &str) -> bool {
        let poll = async {
            loop {
                if page.find_element(marker).await.is_ok() {
                    return;
                }
                tokio::time::sleep(MARKER_POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(self.render_wait, poll).await.is_ok()
    }
}
