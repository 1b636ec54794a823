//! `UpstreamSearchResponse` / `UpstreamResult` (§3).

use serde::{Deserialize, Serialize};
use url::Url;

/// A single hit from the upstream meta-search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamResult {
    pub url: String,
    pub title: String,
    /// The upstream's snippet, called `content` in §3's wire shape.
    pub content: String,
    pub engine: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub category: Option<String>,
}

impl UpstreamResult {
    /// Validates the `url` field parses as absolute http(s), per §3.
    pub fn validate(&self) -> Result<(), url::ParseError> {
        let parsed = Url::parse(&self.url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            // url crate has no dedicated variant for "wrong scheme"; reuse
            // its parse-error type by re-parsing an empty string, which is
            // the idiomatic way to surface a generic url::ParseError.
            return Err(Url::parse("").unwrap_err());
        }
        Ok(())
    }
}

/// The full upstream response, ordered. Order is authoritative for slot
/// index in every downstream stage (§3 Invariants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSearchResponse {
    pub query: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub results: Vec<UpstreamResult>,
    #[serde(default)]
    pub answers: Vec<serde_json::Value>,
    #[serde(default)]
    pub corrections: Vec<serde_json::Value>,
    #[serde(default)]
    pub infoboxes: Vec<serde_json::Value>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub unresponsive_engines: Vec<serde_json::Value>,
}

impl UpstreamSearchResponse {
    /// Truncates `results` to `count`, preserving order (§3, §4.2 step 5).
    pub fn truncate_to(&mut self, count: u32) {
        self.results.truncate(count as usize);
    }

    /// Concatenates another page's results onto this one, in order.
    pub fn extend_with(&mut self, mut other: UpstreamSearchResponse) {
        self.results.append(&mut other.results);
        self.total_results = self.total_results.max(other.total_results);
        self.suggestions.extend(other.suggestions);
    }
}
