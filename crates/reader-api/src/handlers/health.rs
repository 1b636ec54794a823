//! `GET /healthz`: trivial liveness probe, grounded on `riptide-api::health`.

use axum::http::StatusCode;

pub async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
