use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magpie_core::{
    load_config, translator_from_config, validate_config, BrowserFetcher, Config, CrawlPipeline,
    CrawlRequest, Enricher, HttpDriver, MetaTubeProvider, RecordStore, SanitizedConfig,
    SqliteRecordStore,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MAGPIE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        config = %serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default(),
        "Configuration loaded"
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("help");

    match command {
        "crawl" => {
            let forum_id = args
                .get(1)
                .context("Usage: magpie crawl <forum-id> [start-page] [end-page]")?;
            let start: u32 = parse_page(args.get(2), 1)?;
            let end: u32 = parse_page(args.get(3), start)?;
            if end < start {
                bail!("End page {} is before start page {}", end, start);
            }
            crawl(&config, forum_id, start, end).await
        }
        "search" => {
            let keyword = args
                .get(1)
                .context("Usage: magpie search <keyword> [limit]")?;
            let limit = parse_page(args.get(2), 20)?;
            let store = open_store(&config)?;
            let hits = store.search(keyword, limit)?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
            Ok(())
        }
        "recent" => {
            let limit = parse_page(args.get(1), 20)?;
            let store = open_store(&config)?;
            let records = store.recent(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        "stats" => {
            let store = open_store(&config)?;
            println!("{}", serde_json::to_string_pretty(&store.stats()?)?);
            Ok(())
        }
        _ => {
            eprintln!("Usage: magpie <command>");
            eprintln!();
            eprintln!("Commands:");
            eprintln!("  crawl <forum-id> [start-page] [end-page]   Crawl a forum section");
            eprintln!("  search <keyword> [limit]                   Search stored records");
            eprintln!("  recent [limit]                             List recently updated records");
            eprintln!("  stats                                      Show store statistics");
            Ok(())
        }
    }
}

fn parse_page(arg: Option<&String>, default: u32) -> Result<u32> {
    match arg {
        Some(value) => value
            .parse()
            .with_context(|| format!("Not a valid number: {}", value)),
        None => Ok(default),
    }
}

fn open_store(config: &Config) -> Result<Arc<SqliteRecordStore>> {
    let store = SqliteRecordStore::new(&config.database.path)
        .with_context(|| format!("Failed to open record store at {:?}", config.database.path))?;
    Ok(Arc::new(store))
}

async fn crawl(config: &Config, forum_id: &str, start: u32, end: u32) -> Result<()> {
    if config.crawler.forum(forum_id).is_none() {
        let known: Vec<&str> = config.crawler.forums.iter().map(|f| f.id.as_str()).collect();
        bail!(
            "Unknown forum section '{}' (configured sections: {})",
            forum_id,
            known.join(", ")
        );
    }

    let driver = HttpDriver::new(&config.fetch).context("Failed to create page driver")?;
    let fetcher = Arc::new(BrowserFetcher::new(driver, config.fetch.clone()));

    let provider = Arc::new(
        MetaTubeProvider::new(&config.metadata).context("Failed to create metadata provider")?,
    );
    let translator = translator_from_config(&config.translate);
    let enricher = Enricher::new(provider, translator, &config.translate);

    let store = open_store(config)?;
    info!("Record store ready at {:?}", config.database.path);

    let pipeline = CrawlPipeline::new(fetcher, enricher, store, config.crawler.clone());
    let report = pipeline
        .run(&CrawlRequest::new(forum_id, start, end))
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
