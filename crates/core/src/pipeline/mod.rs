//! Crawl pipeline orchestration.
//!
//! Drives a forum section crawl end to end: listing pages, detail pages,
//! field extraction, enrichment, storage. Page and thread processing is
//! sequential with configurable politeness delays; per-item failures are
//! recorded in the report and never abort the batch.

mod runner;
mod types;

pub use runner::CrawlPipeline;
pub use types::{CrawlFailure, CrawlReport, CrawlRequest};
