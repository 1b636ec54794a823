//! Redis-backed [`SearchCacheStore`]: a `MultiplexedConnection` held
//! behind a cheap `Clone`, async methods built on `redis::AsyncCommands`.
//!
//! Storage shape: each entry is a JSON blob at
//! `reader:search_cache:entry:{digest}:{created_at_ms}` with a TTL equal
//! to its remaining retention, indexed by a per-digest sorted set
//! (`reader:search_cache:index:{digest}`, scored by `created_at_ms`) so
//! "most recent entry for this digest" is a `ZREVRANGE ... 0 0` away.

use async_trait::async_trait;
use redis::AsyncCommands;
use reader_types::{CacheEntry, SearchCacheStore};
use tracing::debug;

pub struct RedisSearchCacheStore {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisSearchCacheStore {
    pub async fn new(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(Self { conn })
    }

    fn index_key(digest: &str) -> String {
        format!("reader:search_cache:index:{digest}")
    }

    fn entry_key(digest: &str, created_at_ms: i64) -> String {
        format!("reader:search_cache:entry:{digest}:{created_at_ms}")
    }
}

#[async_trait]
impl SearchCacheStore for RedisSearchCacheStore {
    async fn latest_by_digest(&self, digest: &str) -> anyhow::Result<Option<CacheEntry>> {
        let mut conn = self.conn.clone();
        let index_key = Self::index_key(digest);

        let keys: Vec<String> = conn.zrevrange(&index_key, 0, 0).await?;
        let Some(entry_key) = keys.into_iter().next() else {
            return Ok(None);
        };

        let raw: Option<String> = conn.get(&entry_key).await?;
        match raw {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => {
                debug!(digest, "index pointed at an already-expired entry key");
                Ok(None)
            }
        }
    }

    async fn insert(&self, entry: CacheEntry) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let digest = entry.query_digest.clone();
        let created_at_ms = entry.created_at.timestamp_millis();
        let ttl_secs = (entry.expire_at - entry.created_at).num_seconds().max(1) as u64;

        let entry_key = Self::entry_key(&digest, created_at_ms);
        let index_key = Self::index_key(&digest);
        let payload = serde_json::to_string(&entry)?;

        conn.set_ex(&entry_key, payload, ttl_secs).await?;
        conn.zadd(&index_key, entry_key, created_at_ms).await?;
        conn.expire(&index_key, ttl_secs as i64).await?;
        Ok(())
    }
}
