//! Per-request context (§5, §9): explicit, never ambient. Every operation
//! that needs the caller's user-agent, mode flags, or host takes one of
//! these as an argument instead of reaching for process-wide state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Output format selector (§4.4, GLOSSARY "Mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Markdown,
    Html,
    Text,
    Screenshot,
    Pageshot,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Markdown
    }
}

/// Per-request state threaded explicitly through every downstream call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub user_agent: String,
    pub mode: Mode,
    pub with_images_summary: bool,
    pub with_links_summary: bool,
    /// The gateway's own hostname, used by C7's circuit-breaker check.
    pub host: String,
}

/// A fixed desktop Chrome UA used when the caller supplies none (§4.1).
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

impl RequestContext {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            mode: Mode::default(),
            with_images_summary: false,
            with_links_summary: false,
            host: host.into(),
        }
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}
