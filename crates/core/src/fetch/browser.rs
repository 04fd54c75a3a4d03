//! Retry and interstitial policy over a [`PageDriver`].

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{FetchConfig, InterstitialConfig};

use super::{ClickTarget, FetchError, PageDriver, PageFetcher, RenderedPage};

/// Drives page loads through an injected driver, retrying with exponential
/// backoff and clicking through the age-gate interstitial when it appears.
pub struct BrowserFetcher<D: PageDriver> {
    driver: D,
    config: FetchConfig,
}

impl<D: PageDriver> BrowserFetcher<D> {
    pub fn new(driver: D, config: FetchConfig) -> Self {
        Self { driver, config }
    }

    /// One load attempt: open, remediate the interstitial once if present,
    /// then read the settled page.
    async fn attempt(&self, url: &str) -> Result<String, FetchError> {
        let page = self.driver.open(url).await?;

        if is_interstitial(&page, &self.config.interstitial) {
            info!(url = url, "interstitial detected, clicking through");
            self.click_through().await;
        }

        // Let redirects and late content settle before reading.
        sleep(Duration::from_secs(self.config.load_wait_secs)).await;
        let page = self.driver.current_page().await?;

        if still_blocked(&page, &self.config.interstitial) {
            warn!(url = url, "still on interstitial page after remediation");
            return Err(FetchError::InterstitialNotCleared);
        }

        Ok(page.html)
    }

    /// Bounded remediation: the localized button first, then the English
    /// fallback. Click failures are swallowed; the caller re-checks the page.
    async fn click_through(&self) {
        let targets = [
            ClickTarget::Css(self.config.interstitial.enter_selector.clone()),
            ClickTarget::LinkText(self.config.interstitial.enter_link_text.clone()),
        ];

        for target in &targets {
            match self.driver.click(target).await {
                Ok(true) => {
                    debug!(?target, "clicked interstitial enter button");
                    sleep(Duration::from_secs(self.config.settle_secs)).await;
                    return;
                }
                Ok(false) => continue,
                Err(e) => {
                    debug!(?target, error = %e, "interstitial click failed");
                    continue;
                }
            }
        }
    }
}

#[async_trait]
impl<D: PageDriver> PageFetcher for BrowserFetcher<D> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let retries = self.config.max_retries.max(1);

        for attempt in 0..retries {
            debug!(url = url, attempt = attempt + 1, retries, "fetching page");

            match self.attempt(url).await {
                Ok(html) => {
                    debug!(url = url, "fetch succeeded");
                    return Ok(html);
                }
                // An uncleared interstitial is not retried within the loop;
                // the whole URL is reported as having no content.
                Err(FetchError::InterstitialNotCleared) => {
                    return Err(FetchError::InterstitialNotCleared);
                }
                Err(e) => {
                    warn!(url = url, attempt = attempt + 1, error = %e, "fetch attempt failed");
                    if attempt + 1 < retries {
                        let backoff = 2u64.saturating_pow(attempt + 1);
                        debug!(seconds = backoff, "backing off before retry");
                        sleep(Duration::from_secs(backoff)).await;
                    }
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: retries,
        })
    }
}

/// Interstitial detection on first load: both markers must be present.
fn is_interstitial(page: &RenderedPage, config: &InterstitialConfig) -> bool {
    page.title.contains(&config.title_marker) && page.html.contains(&config.body_marker)
}

/// Post-remediation check is looser: either marker still present means the
/// real content never loaded.
fn still_blocked(page: &RenderedPage, config: &InterstitialConfig) -> bool {
    page.html.contains(&config.body_marker) || page.title.contains(&config.title_marker)
}
