//! Shared data model, error taxonomy, and port traits for the
//! search-answering gateway core.
//!
//! Every other crate in this workspace depends on this one and nothing
//! flows the other way, the same foundation role `riptide-types` plays
//! for the `riptide-*` crates.

pub mod cache_entry;
pub mod context;
pub mod error;
pub mod formatted;
pub mod ports;
pub mod query;
pub mod search_response;
pub mod snapshot;
pub mod testing;

pub use cache_entry::{CacheEntry, Freshness, RETENTION_MS, VALID_MS};
pub use context::{Mode, RequestContext, DEFAULT_USER_AGENT};
pub use error::{ReaderError, Result};
pub use formatted::FormattedPage;
pub use ports::{Browser, SearchCacheStore};
pub use query::SearchQuery;
pub use search_response::{UpstreamResult, UpstreamSearchResponse};
pub use snapshot::{PageSnapshot, ParsedContent};
