//! Scripted page driver.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fetch::{ClickTarget, FetchError, PageDriver, RenderedPage};

struct Scripted {
    first: RenderedPage,
    after_click: Option<RenderedPage>,
}

/// A page driver that replays scripted pages instead of loading anything.
///
/// Opening an unscripted URL fails the way a dead browser session would;
/// `fail_opens` injects transient failures before that.
pub struct ScriptedDriver {
    scripts: Mutex<HashMap<String, Scripted>>,
    current: Mutex<Option<(String, RenderedPage)>>,
    click_result: Mutex<bool>,
    fail_opens: Mutex<u32>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            click_result: Mutex::new(true),
            fail_opens: Mutex::new(0),
        }
    }

    /// Script a URL to a fixed page, clicks and all.
    pub fn script_page(&self, url: &str, page: RenderedPage) {
        self.scripts.lock().unwrap().insert(
            url.to_string(),
            Scripted {
                first: page,
                after_click: None,
            },
        );
    }

    /// Script a URL that first serves `interstitial` and, after a successful
    /// click, `content`.
    pub fn script_interstitial(
        &self,
        url: &str,
        interstitial: RenderedPage,
        content: RenderedPage,
    ) {
        self.scripts.lock().unwrap().insert(
            url.to_string(),
            Scripted {
                first: interstitial,
                after_click: Some(content),
            },
        );
    }

    /// Whether clicks report having hit anything.
    pub fn set_click_result(&self, result: bool) {
        *self.click_result.lock().unwrap() = result;
    }

    /// Make the next `n` opens fail regardless of the script.
    pub fn fail_opens(&self, n: u32) {
        *self.fail_opens.lock().unwrap() = n;
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn open(&self, url: &str) -> Result<RenderedPage, FetchError> {
        {
            let mut remaining = self.fail_opens.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FetchError::Driver("scripted open failure".to_string()));
            }
        }

        let scripts = self.scripts.lock().unwrap();
        let scripted = scripts
            .get(url)
            .ok_or_else(|| FetchError::Driver(format!("no page scripted for {}", url)))?;

        let page = scripted.first.clone();
        *self.current.lock().unwrap() = Some((url.to_string(), page.clone()));
        Ok(page)
    }

    async fn click(&self, _target: &ClickTarget) -> Result<bool, FetchError> {
        if !*self.click_result.lock().unwrap() {
            return Ok(false);
        }

        let mut current = self.current.lock().unwrap();
        if let Some((url, page)) = current.as_mut() {
            let scripts = self.scripts.lock().unwrap();
            if let Some(after) = scripts.get(url).and_then(|s| s.after_click.as_ref()) {
                *page = after.clone();
            }
        }
        Ok(true)
    }

    async fn current_page(&self) -> Result<RenderedPage, FetchError> {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|(_, page)| page.clone())
            .ok_or_else(|| FetchError::Driver("no page open".to_string()))
    }
}
