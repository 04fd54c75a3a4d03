//! Page retrieval.
//!
//! Real page rendering (a browser session) is an external capability hidden
//! behind [`PageDriver`]; the retry and interstitial policy lives in
//! [`BrowserFetcher`] so it can be exercised against scripted drivers.

mod browser;
mod http_driver;

pub use browser::BrowserFetcher;
pub use http_driver::HttpDriver;

use async_trait::async_trait;
use thiserror::Error;

/// A loaded page as the driver sees it.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub title: String,
    pub html: String,
}

/// How to find an element to click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// CSS selector.
    Css(String),
    /// Anchor whose text contains the given string.
    LinkText(String),
}

/// Errors for page retrieval.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The driver could not load or interact with the page.
    #[error("Driver error: {0}")]
    Driver(String),

    /// The request timed out.
    #[error("Page load timed out")]
    Timeout,

    /// The interstitial was still present after the remediation attempt.
    #[error("Interstitial page could not be cleared")]
    InterstitialNotCleared,

    /// All attempts produced no content.
    #[error("No content for {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },
}

/// A stateful page-loading session (browser or plain HTTP).
///
/// Not safely shareable across concurrent crawls; one driver per job.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and return the loaded page.
    async fn open(&self, url: &str) -> Result<RenderedPage, FetchError>;

    /// Try to click an element. Returns whether anything was clicked.
    async fn click(&self, target: &ClickTarget) -> Result<bool, FetchError>;

    /// Re-read the current page (after navigation side effects).
    async fn current_page(&self) -> Result<RenderedPage, FetchError>;
}

/// Page retrieval with retries and interstitial handling.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the rendered HTML for a URL.
    ///
    /// Every error is non-fatal for a batch: the caller logs it and skips
    /// the URL.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
