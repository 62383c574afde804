//! Direct HTTP fetch with a browser User-Agent and a politeness delay.

use std::time::Duration;

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::http;

/// Plain HTTP GET fetcher.
///
/// Sleeps a random delay from `plain_delay_ms` before every request and
/// bounds each request by `plain_timeout_seconds`.
#[derive(Debug, Clone)]
pub struct PlainFetcher {
    client: reqwest::Client,
    delay_ms: (u64, u64),
    timeout: Duration,
}

impl PlainFetcher {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config)?,
            delay_ms: config.plain_delay_ms,
            timeout: config.plain_timeout(),
        })
    }

    /// Fetch `url` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Timeout`] when the request exceeds its time
    /// budget and [`ScrapeError::Http`] on any other network failure or a
    /// non-2xx status.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let delay = http::jitter(self.delay_ms);
        tracing::trace!(url, delay_ms = delay.as_millis() as u64, "plain fetch");
        tokio::time::sleep(delay).await;

        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?
            .error_for_status()
            .map_err(|e| {
                ScrapeError::Http(format!(
                    "{} returned error status: {}",
                    http::redact_url(url),
                    e.without_url()
                ))
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(url, e))?;

        tracing::trace!(url, bytes = body.len(), "plain response received");
        Ok(body)
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> ScrapeError {
        let url = http::redact_url(url);
        if e.is_timeout() {
            ScrapeError::Timeout(format!("{url} after {}s", self.timeout.as_secs()))
        } else {
            ScrapeError::Http(format!("request to {url} failed: {}", e.without_url()))
        }
    }
}
