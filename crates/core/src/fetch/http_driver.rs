//! Plain HTTP implementation of [`PageDriver`].
//!
//! Good enough for pages that render server-side. It cannot execute
//! scripts, so `click` always reports failure and interstitials that need
//! a real browser remain blocked.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tokio::sync::RwLock;

use crate::config::FetchConfig;

use super::{ClickTarget, FetchError, PageDriver, RenderedPage};

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid selector"));

pub struct HttpDriver {
    client: Client,
    last_page: RwLock<Option<RenderedPage>>,
}

impl HttpDriver {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .cookie_store(true);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| FetchError::Driver(format!("invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Driver(e.to_string()))?;

        Ok(Self {
            client,
            last_page: RwLock::new(None),
        })
    }
}

#[async_trait]
impl PageDriver for HttpDriver {
    async fn open(&self, url: &str) -> Result<RenderedPage, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Driver(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Driver(format!("HTTP {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Driver(e.to_string()))?;

        let title = Html::parse_document(&html)
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let page = RenderedPage { title, html };
        *self.last_page.write().await = Some(page.clone());
        Ok(page)
    }

    async fn click(&self, _target: &ClickTarget) -> Result<bool, FetchError> {
        // No scripting over plain HTTP.
        Ok(false)
    }

    async fn current_page(&self) -> Result<RenderedPage, FetchError> {
        self.last_page
            .read()
            .await
            .clone()
            .ok_or_else(|| FetchError::Driver("no page loaded".to_string()))
    }
}
