//! `PageSnapshot` (§3): the opaque record the external Browser collaborator
//! produces. The core only reads the fields listed here; it never
//! constructs or mutates a snapshot itself outside of tests.

use serde::{Deserialize, Serialize};

/// Parsed/"readability" subset of a snapshot, when the Browser ran one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedContent {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published_time: Option<String>,
}

/// A single progressively-better render of one URL.
///
/// `#[non_exhaustive]` because this type is owned by the external Browser
/// collaborator (§1 Out-of-scope) and may grow fields independently of
/// this crate's release cadence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct PageSnapshot {
    pub href: String,
    pub title: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    pub parsed: Option<ParsedContent>,
    #[serde(default)]
    pub imgs: Vec<String>,
    pub screenshot: Option<Vec<u8>>,
    pub pageshot: Option<Vec<u8>>,
    pub rebase: Option<String>,
    pub max_elem_depth: Option<u32>,
    pub elem_count: Option<u32>,
    #[serde(default)]
    pub pdfs: Vec<String>,
    /// Producer-signaled: this snapshot is a rendered PDF, not HTML (§4.4
    /// Markdown path step 1).
    #[serde(default)]
    pub is_pdf: bool,
}

impl PageSnapshot {
    /// A bare snapshot with only the URL populated. The shape scrape
    /// streams emit before any content has arrived.
    pub fn empty(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }

    /// §4.4 step 2: DOM degradation threshold.
    pub fn exceeds_dom_budget(&self) -> bool {
        self.max_elem_depth.is_some_and(|d| d > 256) || self.elem_count.is_some_and(|c| c > 70_000)
    }
}
