//! `CacheEntry` and its fresh/stale/expired lifecycle (§3).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::query::SearchQuery;
use crate::search_response::UpstreamSearchResponse;

/// How fresh the retention window is (§3).
pub const VALID_MS: i64 = 60 * 60 * 1_000; // 1 hour
/// How long an entry is retained before it must not be returned (§3).
pub const RETENTION_MS: i64 = 7 * 24 * 60 * 60 * 1_000; // 7 days

/// The age class of a [`CacheEntry`] relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Expired,
}

/// A durable, digest-keyed cache record of an upstream search response.
///
/// Never mutated after creation; deleted by an external TTL sweep at
/// `expire_at` (§3 Lifecycles). The core only ever inserts and reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub query_digest: String,
    pub query: SearchQuery,
    pub response: UpstreamSearchResponse,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Builds a new entry with `expireAt = createdAt + retentionMs` (§3).
    pub fn new(query_digest: String, query: SearchQuery, response: UpstreamSearchResponse, created_at: DateTime<Utc>) -> Self {
        let expire_at = created_at + Duration::milliseconds(RETENTION_MS);
        Self {
            query_digest,
            query,
            response,
            created_at,
            expire_at,
        }
    }

    /// Classifies this entry's age against `now` per the §3 invariant:
    /// fresh if `now - createdAt < validMs`, stale if `< retentionMs`,
    /// expired otherwise.
    pub fn classify(&self, now: DateTime<Utc>) -> Freshness {
        let age_ms = (now - self.created_at).num_milliseconds();
        if age_ms < VALID_MS {
            Freshness::Fresh
        } else if age_ms < RETENTION_MS {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_aged(age_ms: i64) -> CacheEntry {
        let created_at = Utc::now() - Duration::milliseconds(age_ms);
        CacheEntry::new(
            "digest".into(),
            SearchQuery::new("q", 5),
            UpstreamSearchResponse {
                query: "q".into(),
                total_results: 0,
                results: vec![],
                answers: vec![],
                corrections: vec![],
                infoboxes: vec![],
                suggestions: vec![],
                unresponsive_engines: vec![],
            },
            created_at,
        )
    }

    #[test]
    fn fresh_just_under_one_hour() {
        let entry = entry_aged(VALID_MS - 1_000);
        assert_eq!(entry.classify(Utc::now()), Freshness::Fresh);
    }

    #[test]
    fn stale_between_valid_and_retention() {
        let entry = entry_aged(VALID_MS + 1_000);
        assert_eq!(entry.classify(Utc::now()), Freshness::Stale);
    }

    #[test]
    fn expired_past_retention() {
        let entry = entry_aged(RETENTION_MS + 1_000);
        assert_eq!(entry.classify(Utc::now()), Freshness::Expired);
    }
}
