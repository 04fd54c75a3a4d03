//! Crawl request and report types.

use serde::Serialize;

/// A request to crawl a contiguous range of listing pages in one section.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Section id as it appears in listing URLs.
    pub forum_id: String,
    /// First listing page (1-based).
    pub start_page: u32,
    /// Last listing page, inclusive.
    pub end_page: u32,
}

impl CrawlRequest {
    pub fn new(forum_id: impl Into<String>, start_page: u32, end_page: u32) -> Self {
        Self {
            forum_id: forum_id.into(),
            start_page,
            end_page,
        }
    }
}

/// A single thread that could not be processed. The crawl keeps going.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome summary for one crawl request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// Listing pages actually visited.
    pub pages_visited: u32,
    /// Thread links discovered across all listing pages.
    pub threads_found: usize,
    /// Threads fetched and enriched.
    pub processed: usize,
    /// Records that passed validation and were written to the store.
    pub stored: usize,
    /// Threads that failed at any stage, with the reason.
    pub failures: Vec<CrawlFailure>,
}

impl CrawlReport {
    pub(super) fn record_failure(&mut self, url: &str, reason: impl ToString) {
        self.failures.push(CrawlFailure {
            url: url.to_string(),
            reason: reason.to_string(),
        });
    }
}
