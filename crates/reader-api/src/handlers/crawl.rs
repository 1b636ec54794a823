//! `GET /r/{url...}` / `POST /r` (§6).

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use reader_types::{Mode, RequestContext, DEFAULT_USER_AGENT};

use crate::errors::ApiError;
use crate::headers::{header_flag, header_str, parse_mode};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CrawlBody {
    pub url: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default, rename = "respondWith")]
    pub respond_with: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[tracing::instrument(skip(state, headers))]
pub async fn crawl_get(State(state): State<AppState>, Path(raw_url): Path<String>, headers: HeaderMap) -> Result<String, ApiError> {
    let ctx = build_context(&state, &headers, None);
    let wait_for_selector = header_str(&headers, "x-wait-for-selector").is_some();
    let page = state.crawl_pipeline.crawl(&ctx, &raw_url, wait_for_selector, None).await?;
    Ok(page.text_representation.unwrap_or_default())
}

#[tracing::instrument(skip(state, headers, body))]
pub async fn crawl_post(State(state): State<AppState>, headers: HeaderMap, Json(body): Json<CrawlBody>) -> Result<String, ApiError> {
    let mode = body.respond_with.as_deref().map(parse_mode_str);
    let ctx = build_context(&state, &headers, mode);
    let page = state.crawl_pipeline.crawl(&ctx, &body.url, false, body.html).await?;
    Ok(page.text_representation.unwrap_or_default())
}

fn build_context(state: &AppState, headers: &HeaderMap, body_mode: Option<Mode>) -> RequestContext {
    let mode = body_mode.unwrap_or_else(|| parse_mode(headers));
    let mut ctx = RequestContext::new(state.config.host.clone()).with_mode(mode);
    ctx.with_images_summary = header_flag(headers, "x-with-images-summary");
    ctx.with_links_summary = header_flag(headers, "x-with-links-summary");
    ctx = ctx.with_user_agent(header_str(headers, "user-agent").unwrap_or(DEFAULT_USER_AGENT));
    ctx
}

fn parse_mode_str(value: &str) -> Mode {
    match value.to_ascii_lowercase().as_str() {
        "html" => Mode::Html,
        "text" => Mode::Text,
        "screenshot" => Mode::Screenshot,
        "pageshot" => Mode::Pageshot,
        _ => Mode::Markdown,
    }
}
