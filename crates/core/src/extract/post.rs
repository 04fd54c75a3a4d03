//! Post page extraction.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use crate::record::DraftRecord;

use super::origin_of;

/// Catalog code patterns, in precedence order: `ABP-123`, `ABP 123`, `ABP_123`.
static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)([A-Z]{2,10}-\d{2,5})",
        r"(?i)([A-Z]{2,10}\s+\d{2,5})",
        r"(?i)([A-Z]{2,10}_\d{2,5})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid code pattern"))
    .collect()
});

static CODE_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_]+").expect("valid separator pattern"));

static SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(GB|MB|G|M)").expect("valid size pattern"));

static MAGNET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(magnet:\?xt=urn:btih:[0-9A-Fa-f]{40,})").expect("valid magnet pattern")
});

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span#thread_subject").expect("valid selector"));
static HEAD_TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid selector"));
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.t_f").expect("valid selector"));
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("valid selector"));

const RAW_TEXT_LIMIT: usize = 500;

const UNCENSORED_KEYWORDS: &[&str] = &[
    "无码",
    "無碼",
    "uncensored",
    "无修正",
    "無修正",
    "流出",
    "破解",
    "破解版",
    "破解版流出",
];

/// Extract a structured draft record from a post page.
///
/// Relative image URLs are rewritten against the origin of `source_url`;
/// when no origin can be derived they are dropped rather than stored broken.
pub fn extract_post(html: &str, source_url: &str) -> DraftRecord {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .or_else(|| document.select(&HEAD_TITLE_SELECTOR).next().map(element_text))
        .unwrap_or_default();

    let body = document.select(&BODY_SELECTOR).next();
    let text = body.map(element_text).unwrap_or_default();

    let haystack = format!("{} {}", title, text);

    let code = extract_code(&haystack);
    let size_label = extract_size(&text);
    let is_uncensored = is_uncensored(&haystack);
    let images = body
        .map(|b| extract_images(b, origin_of(source_url).as_deref()))
        .unwrap_or_default();
    let magnets = extract_magnets(&text);

    let raw_text = if text.chars().count() > RAW_TEXT_LIMIT {
        let truncated: String = text.chars().take(RAW_TEXT_LIMIT).collect();
        format!("{}...", truncated)
    } else {
        text
    };

    DraftRecord {
        code,
        title,
        raw_text,
        size_label,
        is_uncensored,
        images,
        magnets,
        source_url: source_url.to_string(),
    }
}

/// Stripped, space-joined text content of an element.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First matching catalog code, separators normalized to `-` and uppercased.
pub(crate) fn extract_code(text: &str) -> Option<String> {
    for pattern in CODE_PATTERNS.iter() {
        if let Some(m) = pattern.captures(text).and_then(|c| c.get(1)) {
            let upper = m.as_str().to_uppercase();
            return Some(CODE_SEPARATORS.replace_all(&upper, "-").into_owned());
        }
    }
    None
}

/// First size mention, unit normalized to GB/MB. No fallback scan.
pub(crate) fn extract_size(text: &str) -> Option<String> {
    let caps = SIZE_PATTERN.captures(text)?;
    let number = caps.get(1)?.as_str();
    let unit = match caps.get(2)?.as_str().to_uppercase().as_str() {
        "G" | "GB" => "GB",
        _ => "MB",
    };
    Some(format!("{}{}", number, unit))
}

/// Keyword test over title + body.
pub(crate) fn is_uncensored(text: &str) -> bool {
    UNCENSORED_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Image URLs from the post body container, absolutized and deduplicated.
fn extract_images(body: ElementRef<'_>, origin: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for img in body.select(&IMG_SELECTOR) {
        let src = img
            .value()
            .attr("src")
            .or_else(|| img.value().attr("data-src"));
        let Some(src) = src else { continue };
        let Some(url) = absolutize(src, origin) else {
            continue;
        };
        if seen.insert(url.clone()) {
            images.push(url);
        }
    }
    images
}

fn absolutize(src: &str, origin: Option<&str>) -> Option<String> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }
    let origin = origin?;
    if let Some(rest) = src.strip_prefix("//") {
        let scheme = origin.split("://").next().unwrap_or("https");
        return Some(format!("{}://{}", scheme, rest));
    }
    if src.starts_with('/') {
        return Some(format!("{}{}", origin, src));
    }
    Some(format!("{}/{}", origin, src))
}

/// Magnet URIs from the body text, exact-string deduplicated in first-seen
/// order. Values are not case-normalized.
pub(crate) fn extract_magnets(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut magnets = Vec::new();
    for caps in MAGNET_PATTERN.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            let uri = m.as_str().to_string();
            if seen.insert(uri.clone()) {
                magnets.push(uri);
            }
        }
    }
    magnets
}
