//! MetaTube HTTP adapter.
//!
//! MetaTube deployments differ in which field names they emit, so every
//! logical field is resolved through an explicit ordered list of accessor
//! keys, first non-empty wins. Only the read-only search endpoint is used.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use crate::config::MetadataConfig;
use crate::lang::contains_chinese;

use super::{code, MetaCandidate, MetadataError, MetadataProvider};

const MOVIES_SEARCH_PATH: &str = "/v1/movies/search";

const TITLE_CN_KEYS: &[&str] = &["title_cn", "title_zh", "title_chs", "title_chi"];
const TITLE_KEYS: &[&str] = &["title", "title_en"];
const STUDIO_CN_KEYS: &[&str] = &["studio_cn", "label_cn"];
const STUDIO_KEYS: &[&str] = &["studio", "studio_en"];
const PEOPLE_KEYS: &[&str] = &["performers", "actors", "cast"];
const TAG_KEYS: &[&str] = &["tags", "genres"];
const COVER_KEYS: &[&str] = &["cover_url", "poster_url"];
const DATE_KEYS: &[&str] = &["release_date", "date", "publish_date"];

const NAME_CN_KEYS: &[&str] = &["name_cn", "cn", "zh", "name_zh"];
const NAME_KEYS: &[&str] = &["name", "name_en", "en"];
const TAG_CN_KEYS: &[&str] = &["name_cn", "cn", "zh"];

/// Delimiters used when a people field arrives as one big string.
static NAME_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[，,;/\s]+").expect("valid delimiter pattern"));

/// MetaTube search client.
pub struct MetaTubeProvider {
    client: Client,
    base_url: String,
    provider: Option<String>,
    fallback: bool,
}

impl MetaTubeProvider {
    /// Create a new client from configuration.
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        if config.base_url.is_empty() {
            return Err(MetadataError::NotConfigured(
                "MetaTube base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            provider: config.provider.clone().filter(|p| !p.is_empty()),
            fallback: config.fallback,
        })
    }

    /// Run one search query and return the raw item array.
    async fn search(&self, query: &str) -> Result<Vec<Value>, MetadataError> {
        let url = format!("{}{}", self.base_url, MOVIES_SEARCH_PATH);

        let mut request = self
            .client
            .get(&url)
            .query(&[("q", query), ("fallback", &self.fallback.to_string())]);
        if let Some(provider) = &self.provider {
            request = request.query(&[("provider", provider.as_str())]);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| MetadataError::Parse(format!("Failed to parse search response: {}", e)))?;

        Ok(json
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl MetadataProvider for MetaTubeProvider {
    fn name(&self) -> &str {
        "metatube"
    }

    async fn lookup(&self, code: &str) -> Result<Option<MetaCandidate>, MetadataError> {
        let stripped = code::strip_code(code);
        if stripped.is_empty() {
            return Ok(None);
        }

        for variant in code::query_variants(&stripped) {
            let items = match self.search(&variant).await {
                Ok(items) => items,
                Err(e) => {
                    // A failing variant never fails the lookup; move on.
                    debug!(variant = %variant, error = %e, "MetaTube variant query failed");
                    continue;
                }
            };
            if items.is_empty() {
                continue;
            }

            debug!(
                variant = %variant,
                items = items.len(),
                "MetaTube search hit"
            );
            return Ok(Some(reconcile(&stripped, items)));
        }

        Ok(None)
    }
}

/// Pick the best item and fold its flexible fields into a candidate.
fn reconcile(stripped_code: &str, mut items: Vec<Value>) -> MetaCandidate {
    // Stable sort: ties keep provider order.
    items.sort_by(|a, b| score(stripped_code, b).cmp(&score(stripped_code, a)));
    let item = &items[0];

    let title_cn = first_str(item, TITLE_CN_KEYS);
    let title = first_str(item, TITLE_KEYS).or_else(|| title_cn.clone());
    let studio_cn = first_str(item, STUDIO_CN_KEYS);
    let studio = first_str(item, STUDIO_KEYS).or_else(|| studio_cn.clone());

    let (actresses_cn, actresses) = parse_names(first_value(item, PEOPLE_KEYS));
    let (tags_cn, tags) = parse_tags(first_value(item, TAG_KEYS));

    let cover_url = first_str(item, COVER_KEYS)
        .or_else(|| item.get("images").and_then(|i| string_at(i, "poster")));
    let release_date = first_str(item, DATE_KEYS);

    MetaCandidate {
        code: stripped_code.to_string(),
        code_display: code::display_code(stripped_code),
        title,
        title_cn,
        studio,
        studio_cn,
        actresses,
        actresses_cn,
        tags,
        tags_cn,
        release_date,
        cover_url,
    }
}

/// Higher when the queried code appears in the item's own title/alias text.
fn score(stripped_code: &str, item: &Value) -> i32 {
    let text = [
        string_at(item, "title_cn"),
        string_at(item, "title"),
        value_text(item.get("aliases")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    if code::strip_code(&text).contains(stripped_code) {
        5
    } else {
        1
    }
}

fn string_at(item: &Value, key: &str) -> Option<String> {
    let s = item.get(key)?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// First non-empty string among the given keys.
fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| string_at(item, k))
}

/// First present (non-null) value among the given keys.
fn first_value<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| item.get(*k))
        .filter(|v| !v.is_null())
}

/// Loose rendering of a value as text, for scoring only.
fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        other => Some(other.to_string()),
    }
}

/// Split a people field into (chinese, other) name lists.
///
/// Entries may be objects with localized sub-fields, or bare strings which
/// are classified by script. A single string value is split on common
/// delimiters first.
fn parse_names(value: Option<&Value>) -> (Vec<String>, Vec<String>) {
    let mut cn = Vec::new();
    let mut other = Vec::new();

    let entries: Vec<Value> = match value {
        Some(Value::String(s)) => NAME_DELIMITERS
            .split(s.trim())
            .filter(|p| !p.is_empty())
            .map(|p| Value::String(p.to_string()))
            .collect(),
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    for entry in &entries {
        classify_entry(entry, NAME_CN_KEYS, NAME_KEYS, &mut cn, &mut other);
    }

    (dedup_preserve(cn), dedup_preserve(other))
}

/// Split a tag field into (chinese, other) lists.
fn parse_tags(value: Option<&Value>) -> (Vec<String>, Vec<String>) {
    let mut cn = Vec::new();
    let mut other = Vec::new();

    if let Some(Value::Array(items)) = value {
        for entry in items {
            classify_entry(entry, TAG_CN_KEYS, NAME_KEYS, &mut cn, &mut other);
        }
    }

    (dedup_preserve(cn), dedup_preserve(other))
}

fn classify_entry(
    entry: &Value,
    cn_keys: &[&str],
    plain_keys: &[&str],
    cn: &mut Vec<String>,
    other: &mut Vec<String>,
) {
    match entry {
        Value::Object(_) => {
            if let Some(c) = first_str(entry, cn_keys) {
                cn.push(c);
            }
            if let Some(e) = first_str(entry, plain_keys) {
                other.push(e);
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return;
            }
            if contains_chinese(s) {
                cn.push(s.to_string());
            } else {
                other.push(s.to_string());
            }
        }
        _ => {}
    }
}

fn dedup_preserve(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}
