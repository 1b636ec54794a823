//! `SearxngClient`: the concrete C1 implementation, grounded on
//! `riptide_search::providers::SerperProvider`. A struct wrapping a
//! `reqwest::Client`, a typed `search()` entry point, and hand-rolled
//! JSON-`Value` parsing of the upstream body rather than a brittle
//! `#[derive(Deserialize)]` DTO, since the upstream's exact field set
//! varies by deployment.

use async_trait::async_trait;
use reader_types::{ReaderError, Result, SearchQuery, UpstreamResult, UpstreamSearchResponse};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::retry::{execute_with_429_retry, AttemptOutcome};

/// C1's contract: `search(SearchQuery) -> UpstreamSearchResponse | DownstreamFailure`.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &SearchQuery, user_agent: &str) -> Result<UpstreamSearchResponse>;
}

/// One-shot SearXNG-style meta-search client (§4.1).
pub struct SearxngClient {
    base_url: String,
    http: reqwest::Client,
}

impl SearxngClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    fn build_request(&self, query: &SearchQuery, user_agent: &str) -> reqwest::RequestBuilder {
        let mut params: Vec<(String, String)> = vec![
            ("q".into(), query.text.clone()),
            ("format".into(), "json".into()),
        ];
        if let Some(language) = &query.language {
            params.push(("language".into(), language.clone()));
        }
        if query.page_number > 0 {
            params.push(("pageno".into(), query.page_number.to_string()));
        }
        if !query.categories.is_empty() {
            params.push(("categories".into(), query.categories.join(",")));
        }
        if !query.engines.is_empty() {
            params.push(("engines".into(), query.engines.join(",")));
        }

        self.http
            .get(format!("{}/search", self.base_url))
            .query(&params)
            .header("Accept", "application/json")
            .header("User-Agent", user_agent)
    }

    #[instrument(skip(self), fields(query = %query.text, page = query.page_number))]
    async fn attempt_once(&self, query: &SearchQuery, user_agent: &str) -> AttemptOutcome<UpstreamSearchResponse> {
        let response = match self.build_request(query, user_agent).send().await {
            Ok(r) => r,
            Err(err) => return AttemptOutcome::Fatal(anyhow::anyhow!("upstream search request failed: {err}")),
        };

        if response.status().as_u16() == 429 {
            return AttemptOutcome::RateLimited;
        }
        if !response.status().is_success() {
            return AttemptOutcome::Fatal(anyhow::anyhow!(
                "upstream search returned non-2xx status: {}",
                response.status()
            ));
        }

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(err) => return AttemptOutcome::Fatal(anyhow::anyhow!("upstream search body was not JSON: {err}")),
        };

        if !body.is_object() {
            return AttemptOutcome::Fatal(anyhow::anyhow!("upstream search body was not a JSON object"));
        }

        match parse_response(&query.text, &body) {
            Ok(parsed) => AttemptOutcome::Done(parsed),
            Err(err) => AttemptOutcome::Fatal(err),
        }
    }
}

#[async_trait]
impl SearchClient for SearxngClient {
    async fn search(&self, query: &SearchQuery, user_agent: &str) -> Result<UpstreamSearchResponse> {
        info!(query = %query.text, page = query.page_number, "issuing upstream search");
        execute_with_429_retry(|| self.attempt_once(query, user_agent))
            .await
            .map_err(|err| {
                warn!(query = %query.text, error = %err, "upstream search failed");
                ReaderError::DownstreamFailure(err.to_string())
            })
    }
}

fn parse_response(query_text: &str, body: &Value) -> anyhow::Result<UpstreamSearchResponse> {
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    let url = item.get("url").and_then(Value::as_str)?.to_string();
                    Some(UpstreamResult {
                        url,
                        title: item.get("title").and_then(Value::as_str).unwrap_or_default().to_string(),
                        content: item.get("content").and_then(Value::as_str).unwrap_or_default().to_string(),
                        engine: item.get("engine").and_then(Value::as_str).unwrap_or_default().to_string(),
                        score: item.get("score").and_then(Value::as_f64).unwrap_or_default(),
                        category: item.get("category").and_then(Value::as_str).map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let str_list = |key: &str| -> Vec<String> {
        body.get(key)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    };
    let value_list = |key: &str| -> Vec<Value> {
        body.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
    };

    Ok(UpstreamSearchResponse {
        query: body.get("query").and_then(Value::as_str).unwrap_or(query_text).to_string(),
        total_results: body.get("number_of_results").and_then(Value::as_u64).unwrap_or(0),
        results,
        answers: value_list("answers"),
        corrections: value_list("corrections"),
        infoboxes: value_list("infoboxes"),
        suggestions: str_list("suggestions"),
        unresponsive_engines: value_list("unresponsive_engines"),
    })
}
