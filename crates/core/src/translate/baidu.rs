//! Baidu translation backend.
//!
//! Requests are signed with md5(appid + text + salt + key) per the fanyi API.
//! Any failure anywhere in the call returns the input text unchanged.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;

use super::Translator;

const ENDPOINT: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";

/// Baidu fanyi API client.
pub struct BaiduTranslator {
    client: Client,
    endpoint: String,
    appid: String,
    key: String,
}

impl BaiduTranslator {
    pub fn new(config: &TranslateConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: ENDPOINT.to_string(),
            appid: config.baidu_appid.clone(),
            key: config.baidu_key.clone(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn request(&self, text: &str, src: &str, tgt: &str) -> Option<String> {
        let salt = chrono::Utc::now().timestamp_millis().to_string();
        let sign = format!(
            "{:x}",
            md5::compute(format!("{}{}{}{}", self.appid, text, salt, self.key))
        );

        let form = [
            ("q", text),
            ("from", src),
            ("to", tgt),
            ("appid", self.appid.as_str()),
            ("salt", salt.as_str()),
            ("sign", sign.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .ok()?;

        let body: TranslateResponse = response.json().await.ok()?;
        body.trans_result
            .into_iter()
            .next()
            .map(|r| r.dst)
            .filter(|dst| !dst.is_empty())
    }
}

#[async_trait]
impl Translator for BaiduTranslator {
    async fn translate(&self, text: &str, src: &str, tgt: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        match self.request(text, src, tgt).await {
            Some(translated) => translated,
            None => {
                debug!("Baidu translation unavailable, keeping original text");
                text.to_string()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    trans_result: Vec<TranslateResult>,
}

#[derive(Debug, Deserialize)]
struct TranslateResult {
    dst: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> BaiduTranslator {
        let config = TranslateConfig {
            enabled: true,
            provider: "baidu".to_string(),
            baidu_appid: "app".to_string(),
            baidu_key: "key".to_string(),
            timeout_secs: 1,
            ..TranslateConfig::default()
        };
        BaiduTranslator::new(&config)
    }

    #[tokio::test]
    async fn test_unreachable_backend_returns_input() {
        // Nothing listens on this port; the call must fail fast and
        // hand back the original text.
        let t = translator().with_endpoint("http://127.0.0.1:9/translate");
        assert_eq!(t.translate("こんにちは", "ja", "zh").await, "こんにちは");
    }

    #[tokio::test]
    async fn test_empty_input_stays_empty() {
        let t = translator().with_endpoint("http://127.0.0.1:9/translate");
        assert_eq!(t.translate("", "ja", "zh").await, "");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"from":"ja","to":"zh","trans_result":[{"src":"abc","dst":"你好"}]}"#;
        let parsed: TranslateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.trans_result[0].dst, "你好");
    }

    #[test]
    fn test_error_response_parses_to_empty_results() {
        let json = r#"{"error_code":"54001","error_msg":"Invalid Sign"}"#;
        let parsed: TranslateResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.trans_result.is_empty());
    }
}
