//! In-memory test doubles for the port traits, shared across crates'
//! test suites the way each Redis-backed adapter here is paired with a
//! lightweight in-memory stand-in for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};

use crate::cache_entry::CacheEntry;
use crate::context::RequestContext;
use crate::ports::{Browser, SearchCacheStore};
use crate::snapshot::PageSnapshot;

/// A [`Browser`] that replays a fixed, scripted sequence of snapshots per
/// URL, ignoring timing. Good enough to drive the aggregator and
/// pipeline tests deterministically.
#[derive(Default)]
pub struct ScriptedBrowser {
    scripts: HashMap<String, Vec<PageSnapshot>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, url: impl Into<String>, snapshots: Vec<PageSnapshot>) -> Self {
        self.scripts.insert(url.into(), snapshots);
        self
    }
}

impl Browser for ScriptedBrowser {
    fn scrape(&self, url: &str, _ctx: &RequestContext) -> BoxStream<'static, PageSnapshot> {
        let snapshots = self.scripts.get(url).cloned().unwrap_or_default();
        Box::pin(stream::iter(snapshots))
    }
}

/// An in-memory [`SearchCacheStore`], most-recent-first per digest.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<Vec<CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchCacheStore for InMemoryCacheStore {
    async fn latest_by_digest(&self, digest: &str) -> anyhow::Result<Option<CacheEntry>> {
        let entries = self.entries.lock().expect("lock poisoned");
        Ok(entries
            .iter()
            .filter(|e| e.query_digest == digest)
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn insert(&self, entry: CacheEntry) -> anyhow::Result<()> {
        self.entries.lock().expect("lock poisoned").push(entry);
        Ok(())
    }
}
