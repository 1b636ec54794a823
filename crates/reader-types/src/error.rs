//! Error taxonomy for the gateway (§7).
//!
//! Mirrors the shape of `riptide-types::error::riptide_error::RiptideError`:
//! a single `thiserror` enum, `#[from]` conversions for the common
//! underlying error types, and an `Other` escape hatch for ad hoc
//! `anyhow::Error`s bubbled up from collaborator code.

use thiserror::Error;

/// Result alias using [`ReaderError`].
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors produced by the gateway core.
///
/// Each variant maps to the HTTP status code documented in §7 at the API
/// boundary; the core itself never talks HTTP.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Malformed URL, bad protocol, or bad TLD (§7 `ParamValidation`, 400).
    #[error("invalid request parameter: {0}")]
    ParamValidation(String),

    /// The pipeline produced nothing (§7 `AssertionFailure`/`NoContent`, 404).
    #[error("no content available")]
    NoContent,

    /// Upstream search or scrape failed after retries (§7 `DownstreamFailure`).
    #[error("downstream failure: {0}")]
    DownstreamFailure(String),

    /// Unexpected internal error (§7 `Internal`, 500).
    #[error("internal error: {0}")]
    Internal(String),

    /// URL parsing failure, folded into `ParamValidation` at the API boundary.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem I/O failure (screenshot persistence, sweeper).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Escape hatch for collaborator errors that don't fit the taxonomy.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReaderError {
    /// True for errors C2 should treat as a trigger for stale-cache fallback.
    pub fn is_downstream(&self) -> bool {
        matches!(self, ReaderError::DownstreamFailure(_))
    }
}
