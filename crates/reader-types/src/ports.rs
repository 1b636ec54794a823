//! Port traits standing in for the collaborators §1 names as out of
//! scope: the headless-browser control component and the persistent
//! key-value collection. Downstream crates depend on these traits, never
//! on a concrete implementation, the way `riptide-cache`'s `CacheStorage`
//! trait decouples callers from the `RedisStorage` adapter.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::cache_entry::CacheEntry;
use crate::context::RequestContext;
use crate::snapshot::PageSnapshot;

/// The external headless-browser control component (§1 Out-of-scope).
///
/// `scrape` returns a stream of progressively-better snapshots for one
/// URL, per §4.5/§4.7. The stream ends when the Browser gives up on the
/// URL or the caller drops it.
pub trait Browser: Send + Sync {
    fn scrape(&self, url: &str, ctx: &RequestContext) -> BoxStream<'static, PageSnapshot>;
}

/// The persistent key-value collection backing C2 (§1 Out-of-scope: "persistent
/// storage primitives, treated as a generic key-value collection").
#[async_trait]
pub trait SearchCacheStore: Send + Sync {
    /// Most recent entry with a matching digest, per §4.2 step 2
    /// (`descending by createdAt, limit 1`).
    async fn latest_by_digest(&self, digest: &str) -> anyhow::Result<Option<CacheEntry>>;

    /// Persist a new entry. §4.2 step 6 calls this fire-and-forget; this
    /// trait method itself is just the write, callers choose whether to
    /// await it inline or spawn it.
    async fn insert(&self, entry: CacheEntry) -> anyhow::Result<()>;
}

/// Lets an `Arc<dyn SearchCacheStore>` stand in anywhere a concrete `S:
/// SearchCacheStore` type parameter is expected, the same way `Browser`
/// callers hold `Arc<dyn Browser>` directly.
#[async_trait]
impl SearchCacheStore for std::sync::Arc<dyn SearchCacheStore> {
    async fn latest_by_digest(&self, digest: &str) -> anyhow::Result<Option<CacheEntry>> {
        (**self).latest_by_digest(digest).await
    }

    async fn insert(&self, entry: CacheEntry) -> anyhow::Result<()> {
        (**self).insert(entry).await
    }
}
