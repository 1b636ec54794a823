//! Route table (§6): `/s/*`, `/r/*` + `POST /r`, `/healthz`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{crawl, health, search};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/s/*query", get(search::search))
        .route("/r/*url", get(crawl::crawl_get))
        .route("/r", post(crawl::crawl_post))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
