//! `SearchQuery` (§3): the immutable request driving C1/C2/C6.

use serde::{Deserialize, Serialize};

/// A search request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub count: u32,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub engines: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_page_number")]
    pub page_number: u32,
}

fn default_page_number() -> u32 {
    1
}

fn default_count() -> u32 {
    5
}

impl SearchQuery {
    /// Builds a query, clamping `count` to the `1..=20` range from §3
    /// (default 5 when the caller passes 0 and did not mean to
    /// short-circuit). Callers that want the `count=0` short-circuit from
    /// §4.6 step 2 must pass it through explicitly via [`SearchQuery::raw`].
    pub fn new(text: impl Into<String>, count: u32) -> Self {
        Self {
            text: text.into(),
            count: count.clamp(1, 20),
            categories: Vec::new(),
            engines: Vec::new(),
            language: None,
            page_number: default_page_number(),
        }
    }

    /// Builds a query without clamping `count`, so `count=0` (the §4.6
    /// step-2 short-circuit) can be represented.
    pub fn raw(text: impl Into<String>, count: u32) -> Self {
        Self {
            text: text.into(),
            count,
            categories: Vec::new(),
            engines: Vec::new(),
            language: None,
            page_number: default_page_number(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_engines(mut self, engines: Vec<String>) -> Self {
        self.engines = engines;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn at_page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    /// Deterministic, key-sorted serialization used as the C2 cache-digest
    /// input (§3: `queryDigest = md5_b64(canonical(query))`).
    ///
    /// `serde_json` does not sort map keys by default, so this builds an
    /// explicit `BTreeMap` rather than relying on struct field order,
    /// which would silently break if a field were ever reordered.
    pub fn canonical(&self) -> String {
        use std::collections::BTreeMap;

        let mut sorted_categories = self.categories.clone();
        sorted_categories.sort();
        let mut sorted_engines = self.engines.clone();
        sorted_engines.sort();

        let mut map: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
        map.insert("text", serde_json::Value::String(self.text.clone()));
        map.insert("count", serde_json::Value::from(self.count));
        map.insert(
            "categories",
            serde_json::Value::from(sorted_categories),
        );
        map.insert("engines", serde_json::Value::from(sorted_engines));
        map.insert(
            "language",
            self.language
                .clone()
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null),
        );
        map.insert("pageNumber", serde_json::Value::from(self.page_number));

        serde_json::to_string(&map).expect("BTreeMap<&str, Value> always serializes")
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new(String::new(), default_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_is_stable_under_list_reordering() {
        let a = SearchQuery::new("rust", 5).with_categories(vec!["news".into(), "it".into()]);
        let b = SearchQuery::new("rust", 5).with_categories(vec!["it".into(), "news".into()]);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn canonical_changes_when_any_field_changes() {
        let a = SearchQuery::new("rust", 5);
        let b = SearchQuery::new("rust", 6);
        assert_ne!(a.canonical(), b.canonical());

        let c = SearchQuery::new("rust", 5).with_language(Some("en".into()));
        assert_ne!(a.canonical(), c.canonical());
    }

    #[test]
    fn count_clamps_to_1_20() {
        assert_eq!(SearchQuery::new("x", 0).count, 1);
        assert_eq!(SearchQuery::new("x", 100).count, 20);
    }

    #[test]
    fn raw_preserves_zero_count() {
        assert_eq!(SearchQuery::raw("x", 0).count, 0);
    }
}
