//! C2: durable, digest-keyed cache of upstream search responses with a
//! fresh/stale/expired lifecycle and fallback-on-upstream-failure
//! semantics (§4.2).

pub mod digest;
pub mod redis_store;
pub mod service;

pub use digest::query_digest;
pub use redis_store::RedisSearchCacheStore;
pub use service::SearchCache;
