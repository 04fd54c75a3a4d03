//! Crawl lifecycle integration tests.
//!
//! These tests run the whole pipeline against scripted pages: listing ->
//! age-gate interstitial -> detail page -> extraction -> enrichment ->
//! storage, with the metadata and translation backends mocked.

use std::sync::Arc;

use tempfile::TempDir;

use magpie_core::{
    config::{CrawlerConfig, FetchConfig, TranslateConfig},
    fetch::RenderedPage,
    testing::fixtures::{candidate, listing_page, post_page, MAGNET},
    testing::{interstitial_page, MockProvider, MockTranslator, ScriptedDriver},
    BrowserFetcher, CrawlPipeline, CrawlRequest, Enricher, MetadataSource, RecordStore,
    SqliteRecordStore,
};

/// Test helper holding every collaborator for a pipeline run.
struct TestHarness {
    driver: Arc<ScriptedDriver>,
    provider: Arc<MockProvider>,
    translator: Arc<MockTranslator>,
    store: Arc<SqliteRecordStore>,
    config: CrawlerConfig,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let store =
            Arc::new(SqliteRecordStore::new(&db_path).expect("Failed to create record store"));

        let config = CrawlerConfig {
            origin: "https://example.com".to_string(),
            thread_delay_secs: 0,
            page_delay_secs: 0,
            ..CrawlerConfig::default()
        };

        Self {
            driver: Arc::new(ScriptedDriver::new()),
            provider: Arc::new(MockProvider::new()),
            translator: Arc::new(MockTranslator::new()),
            store,
            config,
            _temp_dir: temp_dir,
        }
    }

    fn pipeline(&self) -> CrawlPipeline {
        let fetch_config = FetchConfig {
            settle_secs: 0,
            load_wait_secs: 0,
            ..FetchConfig::default()
        };
        let fetcher = Arc::new(BrowserFetcher::new(
            SharedDriver(self.driver.clone()),
            fetch_config,
        ));
        let enricher = Enricher::new(
            self.provider.clone(),
            self.translator.clone(),
            &TranslateConfig::default(),
        );
        CrawlPipeline::new(fetcher, enricher, self.store.clone(), self.config.clone())
    }
}

/// `BrowserFetcher` owns its driver; wrap the shared scripted one.
struct SharedDriver(Arc<ScriptedDriver>);

#[async_trait::async_trait]
impl magpie_core::PageDriver for SharedDriver {
    async fn open(
        &self,
        url: &str,
    ) -> Result<RenderedPage, magpie_core::FetchError> {
        self.0.open(url).await
    }

    async fn click(
        &self,
        target: &magpie_core::fetch::ClickTarget,
    ) -> Result<bool, magpie_core::FetchError> {
        self.0.click(target).await
    }

    async fn current_page(&self) -> Result<RenderedPage, magpie_core::FetchError> {
        self.0.current_page().await
    }
}

#[tokio::test]
async fn test_crawl_through_interstitial_to_stored_record() {
    let harness = TestHarness::new();
    harness.driver.script_interstitial(
        "https://example.com/forum-36-1.html",
        interstitial_page(),
        listing_page(&[100]),
    );
    harness.driver.script_page(
        "https://example.com/thread-100-1-1.html",
        post_page("STARS-123"),
    );
    harness.provider.set_candidate(candidate("STARS-123"));

    let report = harness
        .pipeline()
        .run(&CrawlRequest::new("36", 1, 1))
        .await;

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.threads_found, 1);
    assert_eq!(report.processed, 1);
    assert_eq!(report.stored, 1);
    assert!(report.failures.is_empty());

    let stored = harness
        .store
        .get_by_code("STARS-123")
        .unwrap()
        .expect("record should be stored");
    assert_eq!(stored.record.title_cn.as_deref(), Some("中文标题"));
    assert_eq!(stored.record.studio.as_deref(), Some("SOD"));
    assert_eq!(stored.record.actresses_cn, vec!["悠亚"]);
    assert_eq!(stored.record.source, MetadataSource::Metatube);
    assert!(stored.record.is_uncensored);
    assert_eq!(stored.record.magnets, vec![MAGNET.to_string()]);
    assert_eq!(
        stored.record.images,
        vec!["https://example.com/images/STARS-123.jpg".to_string()]
    );
}

#[tokio::test]
async fn test_recrawl_merges_instead_of_duplicating() {
    let harness = TestHarness::new();
    harness.driver.script_page(
        "https://example.com/forum-36-1.html",
        listing_page(&[100]),
    );
    harness.driver.script_page(
        "https://example.com/thread-100-1-1.html",
        post_page("STARS-123"),
    );
    harness.provider.set_candidate(candidate("STARS-123"));

    let pipeline = harness.pipeline();
    pipeline.run(&CrawlRequest::new("36", 1, 1)).await;
    let report = pipeline.run(&CrawlRequest::new("36", 1, 1)).await;

    assert_eq!(report.stored, 1);
    assert_eq!(harness.store.stats().unwrap().total, 1);
}

#[tokio::test]
async fn test_metadata_outage_degrades_to_translation() {
    let harness = TestHarness::new();
    harness.driver.script_page(
        "https://example.com/forum-36-1.html",
        listing_page(&[100]),
    );
    harness.driver.script_page(
        "https://example.com/thread-100-1-1.html",
        post_page("STARS-123"),
    );
    harness.provider.fail_next("backend down");
    harness
        .translator
        .map("STARS-123 Japanese Release", "STARS-123 中文发行");

    let report = harness
        .pipeline()
        .run(&CrawlRequest::new("36", 1, 1))
        .await;

    assert_eq!(report.stored, 1);
    let stored = harness.store.get_by_code("STARS-123").unwrap().unwrap();
    assert_eq!(stored.record.title_cn.as_deref(), Some("STARS-123 中文发行"));
    assert_eq!(stored.record.source, MetadataSource::Translated);
}

#[tokio::test]
async fn test_uncleared_interstitial_is_a_recorded_failure() {
    let harness = TestHarness::new();
    harness.driver.script_page(
        "https://example.com/forum-36-1.html",
        interstitial_page(),
    );
    harness.driver.set_click_result(false);

    let report = harness
        .pipeline()
        .run(&CrawlRequest::new("36", 1, 1))
        .await;

    assert_eq!(report.pages_visited, 0);
    assert_eq!(report.stored, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, "https://example.com/forum-36-1.html");
}
