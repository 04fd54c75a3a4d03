//! Listing page extraction: find thread links and canonicalize them to each
//! thread's first page.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// A thread discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    /// Link text, usually the thread title.
    pub title: String,
    /// Canonical first-page URL of the thread.
    pub url: String,
}

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Href shapes that point at a thread, each capturing the thread id.
static THREAD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"thread-(\d+)-\d+-\d+\.html",
        r"thread-(\d+)\.html",
        r"thread\.php\?tid=(\d+)",
        r"forum\.php\?mod=viewthread&tid=(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid thread pattern"))
    .collect()
});

/// Extract thread references from a listing page.
///
/// Every recognized link is canonicalized to `{origin}/thread-{id}-1-1.html`
/// and threads are deduplicated by id, preserving document order.
pub fn extract_thread_urls(html: &str, origin: &str) -> Vec<ThreadRef> {
    let document = Html::parse_document(html);
    let origin = origin.trim_end_matches('/');

    let mut seen_ids = HashSet::new();
    let mut threads = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let href = anchor.value().attr("href").unwrap_or_default();
        let Some(thread_id) = thread_id_from_href(href) else {
            continue;
        };
        if !seen_ids.insert(thread_id.clone()) {
            continue;
        }
        let title = anchor
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        threads.push(ThreadRef {
            title,
            url: format!("{}/thread-{}-1-1.html", origin, thread_id),
        });
    }

    threads
}

fn thread_id_from_href(href: &str) -> Option<String> {
    for pattern in THREAD_PATTERNS.iter() {
        if let Some(id) = pattern.captures(href).and_then(|c| c.get(1)) {
            return Some(id.as_str().to_string());
        }
    }
    None
}
