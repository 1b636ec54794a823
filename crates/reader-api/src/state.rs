//! Shared application state, grounded on `riptide-api::state::AppState`'s
//! role as the single `Clone`-cheap handle axum hands to every handler.

use std::sync::Arc;

use reader_cache::{RedisSearchCacheStore, SearchCache};
use reader_format::{ScreenshotStore, SnapshotFormatter};
use reader_pipeline::{CrawlPipeline, SearchPipeline};
use reader_search::SearxngClient;
use reader_types::SearchCacheStore;

use crate::config::GatewayConfig;
use crate::remote_browser::RemoteBrowser;

/// The cache store is held behind `Arc<dyn SearchCacheStore>` rather than
/// pinned to `RedisSearchCacheStore`, the same indirection `CrawlPipeline`
/// already uses for `Browser`, so tests can swap in
/// `reader_types::testing::InMemoryCacheStore` without a live Redis.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub search_pipeline: Arc<SearchPipeline<SearxngClient, Arc<dyn SearchCacheStore>>>,
    pub crawl_pipeline: Arc<CrawlPipeline>,
}

impl AppState {
    pub async fn build(config: GatewayConfig) -> anyhow::Result<Self> {
        let client = Arc::new(SearxngClient::new(config.searxng_instance_url.clone()));
        let store: Arc<dyn SearchCacheStore> = Arc::new(RedisSearchCacheStore::new(&redis_url()).await?);
        let cache = Arc::new(SearchCache::new(client, store));

        let browser = Arc::new(RemoteBrowser::new(config.headless_service_url.clone()));
        let screenshots = ScreenshotStore::new(config.screenshot_root.clone());
        let formatter = Arc::new(SnapshotFormatter::new(screenshots));

        let search_pipeline = Arc::new(SearchPipeline::new(cache, Arc::clone(&browser), Arc::clone(&formatter)));
        let crawl_pipeline = Arc::new(CrawlPipeline::new(browser, formatter));

        Ok(Self { config: Arc::new(config), search_pipeline, crawl_pipeline })
    }
}

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string())
}
