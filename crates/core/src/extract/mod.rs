//! Field extraction from forum HTML.
//!
//! Turns raw post pages into [`crate::record::DraftRecord`]s and listing
//! pages into thread references. Extraction never fails: every field
//! independently degrades to absent/empty when nothing matches.

mod listing;
mod post;

pub use listing::{extract_thread_urls, ThreadRef};
pub use post::extract_post;

/// Site origin (`scheme://host`) of a URL, if it has one.
pub(crate) fn origin_of(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .map(|r| ("https://", r))
        .or_else(|| url.strip_prefix("http://").map(|r| ("http://", r)))?;
    let host = rest.1.split('/').next()?;
    if host.is_empty() {
        return None;
    }
    Some(format!("{}{}", rest.0, host))
}
