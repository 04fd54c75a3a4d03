use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
///
/// An immutable snapshot passed into each component at construction; nothing
/// in the pipeline reads ambient global state.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// A forum section that can be crawled.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForumSection {
    /// Numeric section id as it appears in listing URLs.
    pub id: String,
    /// Human-readable section name.
    pub name: String,
}

/// Crawl orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// Site origin used to build listing URLs and absolutize relative links.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Sections available for crawling.
    #[serde(default = "default_forums")]
    pub forums: Vec<ForumSection>,
    /// Cap on detail pages visited per listing page.
    #[serde(default = "default_max_threads")]
    pub max_threads_per_page: usize,
    /// Politeness delay between successive detail-page fetches.
    #[serde(default = "default_thread_delay")]
    pub thread_delay_secs: u64,
    /// Politeness delay between listing pages.
    #[serde(default = "default_page_delay")]
    pub page_delay_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            forums: default_forums(),
            max_threads_per_page: default_max_threads(),
            thread_delay_secs: default_thread_delay(),
            page_delay_secs: default_page_delay(),
        }
    }
}

impl CrawlerConfig {
    /// Listing URL for a section page, e.g. `https://host/forum-2-3.html`.
    pub fn listing_url(&self, forum_id: &str, page: u32) -> String {
        format!(
            "{}/forum-{}-{}.html",
            self.origin.trim_end_matches('/'),
            forum_id,
            page
        )
    }

    /// Look up a configured section by id.
    pub fn forum(&self, forum_id: &str) -> Option<&ForumSection> {
        self.forums.iter().find(|f| f.id == forum_id)
    }
}

fn default_origin() -> String {
    "https://sehuatang.org".to_string()
}

fn default_forums() -> Vec<ForumSection> {
    [
        ("36", "亚洲无码"),
        ("37", "亚洲有码"),
        ("2", "国产原创"),
        ("103", "高清中文字幕"),
        ("104", "素人原创"),
        ("39", "动漫原创"),
        ("152", "韩国主播"),
    ]
    .into_iter()
    .map(|(id, name)| ForumSection {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

fn default_max_threads() -> usize {
    10
}

fn default_thread_delay() -> u64 {
    1
}

fn default_page_delay() -> u64 {
    3
}

/// Page retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Attempts per URL before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds to wait after clicking through the interstitial.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
    /// Seconds to wait after a page load before reading it.
    #[serde(default = "default_load_wait_secs")]
    pub load_wait_secs: u64,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// User agent sent by the HTTP driver.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Optional proxy URL for all page requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default)]
    pub interstitial: InterstitialConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            settle_secs: default_settle_secs(),
            load_wait_secs: default_load_wait_secs(),
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
            proxy: None,
            interstitial: InterstitialConfig::default(),
        }
    }
}

/// How the age-gate interstitial is recognized and clicked through.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterstitialConfig {
    /// Marker that must appear in the page title.
    #[serde(default = "default_title_marker")]
    pub title_marker: String,
    /// Marker that must appear in the page body.
    #[serde(default = "default_body_marker")]
    pub body_marker: String,
    /// CSS selector of the enter button (localized variant).
    #[serde(default = "default_enter_selector")]
    pub enter_selector: String,
    /// Link-text of the English fallback button.
    #[serde(default = "default_enter_link_text")]
    pub enter_link_text: String,
}

impl Default for InterstitialConfig {
    fn default() -> Self {
        Self {
            title_marker: default_title_marker(),
            body_marker: default_body_marker(),
            enter_selector: default_enter_selector(),
            enter_link_text: default_enter_link_text(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_settle_secs() -> u64 {
    3
}

fn default_load_wait_secs() -> u64 {
    2
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/139.0.0.0 Safari/537.36".to_string()
}

fn default_title_marker() -> String {
    "SEHUATANG.ORG".to_string()
}

fn default_body_marker() -> String {
    "满18岁".to_string()
}

fn default_enter_selector() -> String {
    "a.enter-btn".to_string()
}

fn default_enter_link_text() -> String {
    "If you are over 18".to_string()
}

/// MetaTube lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// MetaTube server base URL.
    #[serde(default = "default_metatube_url")]
    pub base_url: String,
    /// Optional upstream provider hint forwarded as a query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Whether the backend may fall back to other upstream providers.
    #[serde(default = "default_fallback")]
    pub fallback: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: default_metatube_url(),
            provider: None,
            fallback: default_fallback(),
            timeout_secs: default_metadata_timeout(),
        }
    }
}

fn default_metatube_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_fallback() -> bool {
    true
}

fn default_metadata_timeout() -> u64 {
    12
}

/// Machine translation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslateConfig {
    /// Master switch; when off the translator is a no-op.
    #[serde(default)]
    pub enabled: bool,
    /// Backend name; only "baidu" is implemented.
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub baidu_appid: String,
    #[serde(default)]
    pub baidu_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_translate_timeout")]
    pub timeout_secs: u64,
    /// Source language code.
    #[serde(default = "default_src_lang")]
    pub src_lang: String,
    /// Target language code.
    #[serde(default = "default_tgt_lang")]
    pub tgt_lang: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: String::new(),
            baidu_appid: String::new(),
            baidu_key: String::new(),
            timeout_secs: default_translate_timeout(),
            src_lang: default_src_lang(),
            tgt_lang: default_tgt_lang(),
        }
    }
}

fn default_translate_timeout() -> u64 {
    8
}

fn default_src_lang() -> String {
    "ja".to_string()
}

fn default_tgt_lang() -> String {
    "zh".to_string()
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("magpie.db")
}

/// Sanitized config for logging and API responses (secrets redacted).
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub metadata: MetadataConfig,
    pub translate: SanitizedTranslateConfig,
    pub database: DatabaseConfig,
}

/// Translation config with credentials hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranslateConfig {
    pub enabled: bool,
    pub provider: String,
    pub credentials_configured: bool,
    pub src_lang: String,
    pub tgt_lang: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            crawler: config.crawler.clone(),
            fetch: config.fetch.clone(),
            metadata: config.metadata.clone(),
            translate: SanitizedTranslateConfig {
                enabled: config.translate.enabled,
                provider: config.translate.provider.clone(),
                credentials_configured: !config.translate.baidu_appid.is_empty()
                    && !config.translate.baidu_key.is_empty(),
                src_lang: config.translate.src_lang.clone(),
                tgt_lang: config.translate.tgt_lang.clone(),
            },
            database: config.database.clone(),
        }
    }
}
