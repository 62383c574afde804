//! Page-fetch transport.
//!
//! Two strategies fetch raw page content: [`PlainFetcher`] issues a direct
//! HTTP GET, [`RenderedFetcher`] loads the page in a headless browser so
//! client-side scripts run. They are not interchangeable: the caller picks
//! a [`RenderMode`] per use case. [`FetchTransport`] holds both and routes
//! each request by mode.

mod plain;
mod rendered;

pub use plain::PlainFetcher;
pub use rendered::{results_marker, RenderedFetcher};

use crate::config::ScrapeConfig;
use crate::error::Result;

/// Returned by a rendered fetch whose navigation timed out.
pub const TIMEOUT_PLACEHOLDER: &str = "<html><body><p>Timeout</p></body></html>";

/// Returned by a rendered fetch when the browser could not be driven.
pub const ERROR_PLACEHOLDER: &str = "<html><body><p>Error</p></body></html>";

/// How a page should be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Direct HTTP GET. Failures are returned to the caller.
    Plain,
    /// Headless browser with scripts executed. Failures degrade to partial
    /// or placeholder content and never reach the caller.
    Rendered,
}

/// Fetches raw page content.
///
/// Implementations must be `Send + Sync` so one transport can serve every
/// engine of a search concurrently.
pub trait Transport: Send + Sync {
    /// Fetch `url` in the given mode.
    ///
    /// # Errors
    ///
    /// In [`RenderMode::Plain`], returns [`crate::ScrapeError::Http`] on a
    /// network failure or non-2xx status and [`crate::ScrapeError::Timeout`]
    /// when the request exceeds its time budget. [`RenderMode::Rendered`]
    /// fetches never fail.
    fn fetch(
        &self,
        url: &str,
        mode: RenderMode,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// The production transport: plain HTTP plus a headless browser.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    plain: PlainFetcher,
    rendered: RenderedFetcher,
}

impl FetchTransport {
    /// Build both fetchers from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let plain = PlainFetcher::new(config)?;
        let fallback = config.render_fallback_to_plain.then(|| plain.clone());
        Ok(Self {
            rendered: RenderedFetcher::new(config, fallback),
            plain,
        })
    }

    pub fn plain(&self) -> &PlainFetcher {
        &self.plain
    }

    pub fn rendered(&self) -> &RenderedFetcher {
        &self.rendered
    }
}

impl Transport for FetchTransport {
    async fn fetch(&self, url: &str, mode: RenderMode) -> Result<String> {
        match mode {
            RenderMode::Plain => self.plain.fetch(url).await,
            RenderMode::Rendered => Ok(self.rendered.fetch(url).await),
        }
    }
}
