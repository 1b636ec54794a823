//! Router-level tests driving `build_router` end to end through
//! `tower::ServiceExt::oneshot`, the way `riptide-api`'s `tests/api_tests.rs`
//! exercises its router instead of calling handlers directly.
//!
//! `AppState` is assembled by hand here rather than through
//! `AppState::build`, swapping in `InMemoryCacheStore` and `ScriptedBrowser`
//! so these tests never touch a real Redis, SearXNG, or headless-browser
//! instance.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use reader_api::{build_router, AppState, GatewayConfig};
use reader_cache::{query_digest, SearchCache};
use reader_format::{ScreenshotStore, SnapshotFormatter};
use reader_pipeline::{CrawlPipeline, SearchPipeline};
use reader_search::SearxngClient;
use reader_types::testing::{InMemoryCacheStore, ScriptedBrowser};
use reader_types::{CacheEntry, SearchCacheStore, SearchQuery, UpstreamResult, UpstreamSearchResponse};
use tower::ServiceExt;

fn test_state(store: Arc<dyn SearchCacheStore>) -> AppState {
    let config = GatewayConfig::default();
    let client = Arc::new(SearxngClient::new(config.searxng_instance_url.clone()));
    let cache = Arc::new(SearchCache::new(client, store));
    let browser = Arc::new(ScriptedBrowser::new());
    let formatter = Arc::new(SnapshotFormatter::new(ScreenshotStore::new(std::env::temp_dir().join("reader-api-router-tests"))));
    let search_pipeline = Arc::new(SearchPipeline::new(cache, browser.clone(), formatter.clone()));
    let crawl_pipeline = Arc::new(CrawlPipeline::new(browser, formatter));
    AppState { config: Arc::new(config), search_pipeline, crawl_pipeline }
}

fn empty_store() -> Arc<dyn SearchCacheStore> {
    Arc::new(InMemoryCacheStore::new())
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = build_router(test_state(empty_store()));
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unmatched_route_is_404() {
    let app = build_router(test_state(empty_store()));
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crawl_with_short_tld_is_400_before_touching_the_browser() {
    // `ScriptedBrowser::new()` has no script for this URL, so a 400 here
    // can only come from `validate_target_url` rejecting it up front.
    let app = build_router(test_state(empty_store()));
    let response = app
        .oneshot(Request::builder().uri("/r/http://example.x/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_with_count_zero_serves_a_fresh_cache_hit() {
    // Pre-seeds a fresh entry under the exact digest `/s/rust?count=0`
    // will look up, so the request is served entirely from C2: no
    // upstream search client and no browser scrape ever run (§4.2 step 1
    // cache hit, then §4.6 step 2's stub short-circuit).
    let store = InMemoryCacheStore::new();
    let query = SearchQuery::raw("rust", 0).with_categories(vec![]).with_engines(vec![]);
    let digest = query_digest(&query);
    let response = UpstreamSearchResponse {
        query: "rust".into(),
        total_results: 1,
        results: vec![UpstreamResult {
            url: "https://example.com/rust".into(),
            title: "Rust".into(),
            content: "A language".into(),
            engine: "e".into(),
            score: 1.0,
            category: None,
        }],
        answers: vec![],
        corrections: vec![],
        infoboxes: vec![],
        suggestions: vec![],
        unresponsive_engines: vec![],
    };
    store.insert(CacheEntry::new(digest, query, response, Utc::now())).await.unwrap();

    let app = build_router(test_state(Arc::new(store)));
    let response = app
        .oneshot(Request::builder().uri("/s/rust?count=0").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
