//! Best-effort machine translation.
//!
//! Translation is never load-bearing: when unconfigured, failing, or
//! returning nothing, [`Translator::translate`] hands the input back
//! unchanged and the pipeline carries on.

mod baidu;

pub use baidu::BaiduTranslator;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::TranslateConfig;

/// Text translation capability.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `src` to `tgt`. Infallible by contract:
    /// any failure returns `text` unchanged. Single attempt, no retries.
    async fn translate(&self, text: &str, src: &str, tgt: &str) -> String;

    /// Element-wise translation; entries that translate to an empty string
    /// are dropped.
    async fn translate_list(&self, items: &[String], src: &str, tgt: &str) -> Vec<String> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let translated = self.translate(item, src, tgt).await;
            if !translated.is_empty() {
                out.push(translated);
            }
        }
        out
    }
}

/// Translator used when no backend is configured: the identity function.
#[derive(Debug, Default)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str, _src: &str, _tgt: &str) -> String {
        text.to_string()
    }
}

/// Build the translator described by the configuration.
///
/// Falls back to [`NoopTranslator`] when translation is disabled, the
/// provider is unknown, or credentials are missing.
pub fn translator_from_config(config: &TranslateConfig) -> Arc<dyn Translator> {
    if config.enabled
        && config.provider == "baidu"
        && !config.baidu_appid.is_empty()
        && !config.baidu_key.is_empty()
    {
        return Arc::new(BaiduTranslator::new(config));
    }
    Arc::new(NoopTranslator)
}
