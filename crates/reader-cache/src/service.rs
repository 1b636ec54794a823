//! C2: `cachedSearch(query, noCache) -> UpstreamSearchResponse` (§4.2).

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use reader_search::SearchClient;
use reader_types::{CacheEntry, Freshness, ReaderError, Result, SearchCacheStore, SearchQuery, UpstreamSearchResponse};
use tracing::{info, warn};

use crate::digest::query_digest;

/// C2: digest-keyed, freshness-aware cache in front of C1.
pub struct SearchCache<C, S> {
    client: Arc<C>,
    store: Arc<S>,
}

impl<C, S> SearchCache<C, S>
where
    C: SearchClient + 'static,
    S: SearchCacheStore + 'static,
{
    pub fn new(client: Arc<C>, store: Arc<S>) -> Self {
        Self { client, store }
    }

    /// §4.2's full algorithm, steps 1-8.
    pub async fn cached_search(&self, query: &SearchQuery, no_cache: bool, user_agent: &str) -> Result<UpstreamSearchResponse> {
        let digest = query_digest(query);

        let mut stale_fallback: Option<UpstreamSearchResponse> = None;

        if !no_cache {
            if let Some(entry) = self.store.latest_by_digest(&digest).await.map_err(ReaderError::Other)? {
                match entry.classify(Utc::now()) {
                    Freshness::Fresh => {
                        info!(digest, "cache hit: fresh");
                        return Ok(entry.response);
                    }
                    Freshness::Stale => {
                        info!(digest, "cache hit: stale, will fall back to it on upstream failure");
                        stale_fallback = Some(entry.response);
                    }
                    Freshness::Expired => {
                        // Must not be returned (§3); fall through to upstream.
                    }
                }
            }
        }

        match self.fetch_from_upstream(query, user_agent).await {
            Ok(response) => {
                self.persist_fire_and_forget(digest, query.clone(), response.clone());
                Ok(response)
            }
            Err(err) => {
                if let Some(fallback) = stale_fallback {
                    warn!(digest, error = %err, "upstream failed, returning stale cache fallback");
                    Ok(fallback)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// §4.2 step 5: page 1, then page 2 if short, concatenated and
    /// truncated to `query.count`. `count == 0` (the §4.6 step-2
    /// short-circuit query) passes page 1 through untouched instead of
    /// truncating to zero.
    async fn fetch_from_upstream(&self, query: &SearchQuery, user_agent: &str) -> Result<UpstreamSearchResponse> {
        let page1_query = query.clone().at_page(1);
        let mut response = self.client.search(&page1_query, user_agent).await?;

        if (response.results.len() as u32) < query.count {
            let backoff_ms = 1000 + rand::thread_rng().gen_range(0..=1000u64);
            tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;

            let page2_query = query.clone().at_page(query.page_number + 1);
            let page2 = self.client.search(&page2_query, user_agent).await?;
            response.extend_with(page2);
        }

        if query.count > 0 {
            response.truncate_to(query.count);
        }
        Ok(response)
    }

    /// §4.2 step 6: fire-and-forget persist; log on failure, never block
    /// the response on it (§9 re-architecture guidance).
    fn persist_fire_and_forget(&self, digest: String, query: SearchQuery, response: UpstreamSearchResponse) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let entry = CacheEntry::new(digest.clone(), query, response, Utc::now());
            if let Err(err) = store.insert(entry).await {
                warn!(digest, error = %err, "failed to persist search cache entry");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reader_types::testing::InMemoryCacheStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeClient {
        calls: AtomicUsize,
        pages: Mutex<Vec<UpstreamSearchResponse>>,
        fail: bool,
    }

    fn empty_response(results: Vec<&str>) -> UpstreamSearchResponse {
        UpstreamSearchResponse {
            query: "q".into(),
            total_results: results.len() as u64,
            results: results
                .into_iter()
                .map(|u| reader_types::UpstreamResult {
                    url: u.to_string(),
                    title: "t".into(),
                    content: "c".into(),
                    engine: "e".into(),
                    score: 1.0,
                    category: None,
                })
                .collect(),
            answers: vec![],
            corrections: vec![],
            infoboxes: vec![],
            suggestions: vec![],
            unresponsive_engines: vec![],
        }
    }

    #[async_trait]
    impl SearchClient for FakeClient {
        async fn search(&self, _query: &SearchQuery, _ua: &str) -> Result<UpstreamSearchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ReaderError::DownstreamFailure("boom".into()));
            }
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                Ok(empty_response(vec![]))
            } else {
                Ok(pages.remove(0))
            }
        }
    }

    #[tokio::test]
    async fn fresh_cache_hit_skips_upstream() {
        let store = Arc::new(InMemoryCacheStore::new());
        let query = SearchQuery::new("rust", 5);
        let digest = query_digest(&query);
        let entry = CacheEntry::new(digest, query.clone(), empty_response(vec!["https://a/"]), Utc::now());
        store.insert(entry).await.unwrap();

        let client = Arc::new(FakeClient {
            calls: AtomicUsize::new(0),
            pages: Mutex::new(vec![]),
            fail: false,
        });
        let cache = SearchCache::new(client.clone(), store);
        let response = cache.cached_search(&query, false, "ua").await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_cache_bypasses_fresh_entry() {
        let store = Arc::new(InMemoryCacheStore::new());
        let query = SearchQuery::new("rust", 5);
        let digest = query_digest(&query);
        let entry = CacheEntry::new(digest, query.clone(), empty_response(vec!["https://old/"]), Utc::now());
        store.insert(entry).await.unwrap();

        let client = Arc::new(FakeClient {
            calls: AtomicUsize::new(0),
            pages: Mutex::new(vec![empty_response(vec!["https://new/", "https://new2/", "https://new3/", "https://new4/", "https://new5/"])]),
            fail: false,
        });
        let cache = SearchCache::new(client.clone(), store);
        let response = cache.cached_search(&query, true, "ua").await.unwrap();

        assert_eq!(response.results[0].url, "https://new/");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_entry_falls_back_on_upstream_failure() {
        let store = Arc::new(InMemoryCacheStore::new());
        let query = SearchQuery::new("rust", 5);
        let digest = query_digest(&query);
        let created_at = Utc::now() - chrono::Duration::hours(2);
        let entry = CacheEntry::new(digest, query.clone(), empty_response(vec!["https://stale/"]), created_at);
        store.insert(entry).await.unwrap();

        let client = Arc::new(FakeClient {
            calls: AtomicUsize::new(0),
            pages: Mutex::new(vec![]),
            fail: true,
        });
        let cache = SearchCache::new(client, store);
        let response = cache.cached_search(&query, false, "ua").await.unwrap();

        assert_eq!(response.results[0].url, "https://stale/");
    }

    #[tokio::test]
    async fn upstream_failure_without_fallback_propagates() {
        let store = Arc::new(InMemoryCacheStore::new());
        let query = SearchQuery::new("rust", 5);
        let client = Arc::new(FakeClient {
            calls: AtomicUsize::new(0),
            pages: Mutex::new(vec![]),
            fail: true,
        });
        let cache = SearchCache::new(client, store);
        let err = cache.cached_search(&query, false, "ua").await.unwrap_err();
        assert!(matches!(err, ReaderError::DownstreamFailure(_)));
    }

    #[tokio::test]
    async fn count_zero_query_passes_page_one_through_untruncated() {
        let store = Arc::new(InMemoryCacheStore::new());
        let query = SearchQuery::raw("rust", 0);
        let client = Arc::new(FakeClient {
            calls: AtomicUsize::new(0),
            pages: Mutex::new(vec![empty_response(vec!["https://a/"])]),
            fail: false,
        });
        let cache = SearchCache::new(client.clone(), store);
        let response = cache.cached_search(&query, true, "ua").await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }
}
