pub mod config;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod lang;
pub mod metadata;
pub mod pipeline;
pub mod record;
pub mod store;
pub mod testing;
pub mod translate;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use enrich::Enricher;
pub use fetch::{BrowserFetcher, FetchError, HttpDriver, PageDriver, PageFetcher};
pub use metadata::{MetaTubeProvider, MetadataError, MetadataProvider};
pub use pipeline::{CrawlPipeline, CrawlReport, CrawlRequest};
pub use record::{DraftRecord, EnrichedRecord, MetadataSource};
pub use store::{RecordStore, SqliteRecordStore, StoreError, StoredRecord};
pub use translate::{translator_from_config, Translator};
