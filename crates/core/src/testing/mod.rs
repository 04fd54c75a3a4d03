//! Testing utilities and mock implementations.
//!
//! Mocks for the external capabilities (page driver, metadata backend,
//! translation backend) so the pipeline can be exercised end to end without
//! real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use magpie_core::testing::{MockProvider, MockTranslator, ScriptedDriver};
//!
//! let provider = MockProvider::new();
//! provider.set_candidate(candidate);
//!
//! let driver = ScriptedDriver::new();
//! driver.script_page("https://host/thread-1-1-1.html", page);
//! ```

mod mock_provider;
mod mock_translator;
mod scripted_driver;

pub use mock_provider::MockProvider;
pub use mock_translator::MockTranslator;
pub use scripted_driver::ScriptedDriver;

use crate::fetch::RenderedPage;

/// An age-gate interstitial as the site serves it: marker in the title,
/// marker in the body.
pub fn interstitial_page() -> RenderedPage {
    RenderedPage {
        title: "SEHUATANG.ORG".to_string(),
        html: concat!(
            r#"<html><body><p>进入前请确认您已满18岁</p>"#,
            r##"<a class="enter-btn" href="#">If you are over 18</a></body></html>"##,
        )
        .to_string(),
    }
}

/// Canned page and candidate builders.
pub mod fixtures {
    use crate::fetch::RenderedPage;
    use crate::metadata::MetaCandidate;

    /// A well-formed magnet URI for test posts.
    pub const MAGNET: &str = "magnet:?xt=urn:btih:1234567890abcdef1234567890abcdef12345678";

    /// Listing page HTML with one link per thread id.
    pub fn listing_html(thread_ids: &[u32]) -> String {
        let links: String = thread_ids
            .iter()
            .map(|id| format!(r#"<a href="thread-{}-1-1.html">Thread {}</a>"#, id, id))
            .collect();
        format!("<html><body>{}</body></html>", links)
    }

    /// Post page HTML carrying a code, size, uncensored marker, one image
    /// and one magnet link.
    pub fn post_html(code: &str) -> String {
        format!(
            r#"<html><head><title>{code} release</title></head><body>
            <span id="thread_subject">{code} Japanese Release</span>
            <table><tr><td class="t_f">{code} 4.1GB 无码<br>
            <img src="/images/{code}.jpg">
            {magnet}</td></tr></table>
            </body></html>"#,
            code = code,
            magnet = MAGNET,
        )
    }

    pub fn listing_page(thread_ids: &[u32]) -> RenderedPage {
        RenderedPage {
            title: "forum listing".to_string(),
            html: listing_html(thread_ids),
        }
    }

    pub fn post_page(code: &str) -> RenderedPage {
        RenderedPage {
            title: format!("{} release", code),
            html: post_html(code),
        }
    }

    /// A candidate with bilingual fields filled in, keyed to `code`.
    pub fn candidate(code: &str) -> MetaCandidate {
        MetaCandidate {
            code: code.replace('-', ""),
            code_display: code.to_string(),
            title: Some("Japanese Title".to_string()),
            title_cn: Some("中文标题".to_string()),
            studio: Some("SOD".to_string()),
            actresses: vec!["Yua".to_string()],
            actresses_cn: vec!["悠亚".to_string()],
            tags_cn: vec!["单体作品".to_string()],
            release_date: Some("2024-06-15".to_string()),
            cover_url: Some("https://img/cover.jpg".to_string()),
            ..MetaCandidate::default()
        }
    }
}
