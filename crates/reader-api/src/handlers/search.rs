//! `GET /s/{query...}` (§6).

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;

use reader_pipeline::SearchPipelineInput;
use reader_types::{RequestContext, DEFAULT_USER_AGENT};

use crate::errors::ApiError;
use crate::headers::{header_flag, header_list, header_str, parse_mode, parse_timeout_ms};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQueryParams {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default)]
    pub engines: Option<String>,
}

#[tracing::instrument(skip(state, headers))]
pub async fn search(
    State(state): State<AppState>,
    Path(raw_query): Path<String>,
    Query(params): Query<SearchQueryParams>,
    headers: HeaderMap,
) -> Result<String, ApiError> {
    let search_text = urlencoding_decode(&raw_query);

    let count = params.count.unwrap_or(5).clamp(0, 20);
    let categories = comma_list(params.categories.as_deref(), &headers, "x-categories");
    let engines = comma_list(params.engines.as_deref(), &headers, "x-engines");
    let language = header_str(&headers, "x-locale")
        .or_else(|| header_str(&headers, "x-language"))
        .map(str::to_string);

    let input = SearchPipelineInput {
        search_text,
        count,
        categories,
        engines,
        language,
        no_cache: header_flag(&headers, "x-no-cache"),
        timeout_ms: parse_timeout_ms(&headers),
        cache_tolerance_ms: None,
    };

    let mut ctx = RequestContext::new(state.config.host.clone()).with_mode(parse_mode(&headers));
    ctx.with_images_summary = header_flag(&headers, "x-with-images-summary");
    ctx.with_links_summary = header_flag(&headers, "x-with-links-summary");
    if let Some(ua) = header_str(&headers, "user-agent") {
        ctx = ctx.with_user_agent(ua);
    } else {
        ctx = ctx.with_user_agent(DEFAULT_USER_AGENT);
    }

    let batch = state.search_pipeline.run(input, &ctx).await?;
    Ok(batch.to_string_form())
}

fn comma_list(query_value: Option<&str>, headers: &HeaderMap, header_name: &str) -> Vec<String> {
    if let Some(value) = query_value {
        return value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect();
    }
    header_list(headers, header_name)
}

/// axum's `Path` extractor already percent-decodes; this is a defensive
/// second pass for `+` used as a space, which `Path` does not unescape.
fn urlencoding_decode(raw: &str) -> String {
    raw.replace('+', " ")
}
