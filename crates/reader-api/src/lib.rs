//! Thin axum HTTP layer (§6) over the search-answering gateway core.
//! Delegates all logic to `reader-pipeline`; this crate is routing,
//! header parsing, config, and error-to-status mapping only.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod headers;
pub mod remote_browser;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use config::GatewayConfig;
pub use routes::build_router;
pub use state::AppState;
