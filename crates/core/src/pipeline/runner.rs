//! Crawl pipeline implementation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::CrawlerConfig;
use crate::enrich::Enricher;
use crate::extract::{extract_post, extract_thread_urls};
use crate::fetch::PageFetcher;
use crate::store::RecordStore;

use super::types::{CrawlReport, CrawlRequest};

/// Drives a crawl request through fetch, extraction, enrichment and storage.
pub struct CrawlPipeline {
    fetcher: Arc<dyn PageFetcher>,
    enricher: Enricher,
    store: Arc<dyn RecordStore>,
    config: CrawlerConfig,
}

impl CrawlPipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        enricher: Enricher,
        store: Arc<dyn RecordStore>,
        config: CrawlerConfig,
    ) -> Self {
        Self {
            fetcher,
            enricher,
            store,
            config,
        }
    }

    /// Run one crawl request to completion. Individual page or thread
    /// failures land in the report; only the report itself is returned.
    pub async fn run(&self, request: &CrawlRequest) -> CrawlReport {
        let section_name = self
            .config
            .forum(&request.forum_id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| request.forum_id.clone());

        info!(
            forum = %request.forum_id,
            section = %section_name,
            start = request.start_page,
            end = request.end_page,
            "Starting crawl"
        );

        let mut report = CrawlReport::default();

        for page in request.start_page..=request.end_page {
            if page > request.start_page && self.config.page_delay_secs > 0 {
                tokio::time::sleep(Duration::from_secs(self.config.page_delay_secs)).await;
            }

            let listing_url = self.config.listing_url(&request.forum_id, page);
            debug!(url = %listing_url, "Fetching listing page");

            let listing_html = match self.fetcher.fetch(&listing_url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(url = %listing_url, error = %e, "Listing page fetch failed");
                    report.record_failure(&listing_url, &e);
                    continue;
                }
            };
            report.pages_visited += 1;

            let mut threads = extract_thread_urls(&listing_html, &self.config.origin);
            report.threads_found += threads.len();
            threads.truncate(self.config.max_threads_per_page);

            for (i, thread) in threads.iter().enumerate() {
                if i > 0 && self.config.thread_delay_secs > 0 {
                    tokio::time::sleep(Duration::from_secs(self.config.thread_delay_secs))
                        .await;
                }
                self.process_thread(&thread.url, &mut report).await;
            }
        }

        info!(
            pages = report.pages_visited,
            found = report.threads_found,
            processed = report.processed,
            stored = report.stored,
            failures = report.failures.len(),
            "Crawl finished"
        );

        report
    }

    async fn process_thread(&self, url: &str, report: &mut CrawlReport) {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %url, error = %e, "Thread fetch failed");
                report.record_failure(url, &e);
                return;
            }
        };

        let draft = extract_post(&html, url);
        let record = self.enricher.enrich(draft).await;
        report.processed += 1;

        match self.store.upsert(&record) {
            Ok(stored) => {
                debug!(code = %stored.record.code.as_deref().unwrap_or("?"), "Record stored");
                report.stored += 1;
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Record not stored");
                report.record_failure(url, &e);
            }
        }
    }
}
