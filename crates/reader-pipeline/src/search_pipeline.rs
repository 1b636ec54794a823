//! C6: the search pipeline (§4.6). C2 fetch, C5 fan-out, per-emission
//! formatting, and the early-return timer vs qualification gate race.
//!
//! The race is modeled with `tokio::select!` over the aggregator stream
//! and a single reusable `tokio::time::Sleep`, per §9's "selection over
//! three sources" guidance, with branch priority
//! `emission-meets-gate > timer` made explicit via `biased;`. Grounded
//! structurally on `riptide-api::handlers::search`/`deepsearch`,
//! generalized into a web-framework-independent, directly testable unit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reader_aggregate::scrape_many;
use reader_cache::SearchCache;
use reader_format::SnapshotFormatter;
use reader_search::SearchClient;
use reader_types::{
    Browser, FormattedPage, PageSnapshot, ReaderError, RequestContext, Result, SearchCacheStore, SearchQuery, UpstreamResult,
};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::batch::{reorganize, Batch};

const DEFAULT_TIMER_MS: u64 = 15_000;

/// §4.6 Inputs.
#[derive(Debug, Clone)]
pub struct SearchPipelineInput {
    pub search_text: String,
    pub count: u32,
    pub categories: Vec<String>,
    pub engines: Vec<String>,
    pub language: Option<String>,
    pub no_cache: bool,
    pub timeout_ms: Option<u64>,
    /// Accepted for parity with the §4.6 Inputs contract; no Step in
    /// §4.6 specifies an effect for it (the same gap §9 Open Questions
    /// calls out for `time_range`), so it is not threaded into C2.
    pub cache_tolerance_ms: Option<u64>,
}

pub struct SearchPipeline<C, S> {
    cache: Arc<SearchCache<C, S>>,
    browser: Arc<dyn Browser>,
    formatter: Arc<SnapshotFormatter>,
}

impl<C, S> SearchPipeline<C, S>
where
    C: SearchClient + 'static,
    S: SearchCacheStore + 'static,
{
    pub fn new(cache: Arc<SearchCache<C, S>>, browser: Arc<dyn Browser>, formatter: Arc<SnapshotFormatter>) -> Self {
        Self { cache, browser, formatter }
    }

    #[tracing::instrument(skip(self, input, ctx), fields(search_text = %input.search_text, count = input.count))]
    pub async fn run(&self, input: SearchPipelineInput, ctx: &RequestContext) -> Result<Batch> {
        let query = if input.count == 0 {
            SearchQuery::raw(&input.search_text, 0)
        } else {
            SearchQuery::new(&input.search_text, input.count)
        };
        let mut query = query.with_categories(input.categories.clone()).with_engines(input.engines.clone());
        if input.language.is_some() {
            query = query.with_language(input.language.clone());
        }

        let mut upstream = self.cache.cached_search(&query, input.no_cache, &ctx.user_agent).await?;

        // §4.6 step 2.
        if input.count == 0 {
            return Ok(Batch::stubs(&upstream.results));
        }
        upstream.truncate_to(query.count);

        if upstream.results.is_empty() {
            return Err(ReaderError::NoContent);
        }

        let urls: Vec<String> = upstream.results.iter().map(|r| r.url.clone()).collect();
        let slot_count = urls.len();
        let stream = scrape_many(Arc::clone(&self.browser), urls, ctx.clone());
        tokio::pin!(stream);

        let timer_ms = input.timeout_ms.unwrap_or(DEFAULT_TIMER_MS);
        // Parked a year out until the first qualified slot arms it for real (§4.6 step 4).
        let sleep = tokio::time::sleep(Duration::from_secs(365 * 24 * 3600));
        tokio::pin!(sleep);
        let mut timer_armed = false;

        let mut last_slots: Vec<Option<PageSnapshot>> = vec![None; slot_count];
        let mut slot_versions = vec![0u64; slot_count];
        let mut format_cache: HashMap<(usize, u64), FormattedPage> = HashMap::new();
        let mut last_batch: Option<Batch> = None;

        loop {
            tokio::select! {
                biased;

                maybe_slots = stream.next() => {
                    let Some(slots) = maybe_slots else {
                        return last_batch.ok_or(ReaderError::NoContent);
                    };

                    for (index, slot) in slots.iter().enumerate() {
                        if *slot != last_slots[index] {
                            slot_versions[index] += 1;
                        }
                    }
                    last_slots = slots.clone();

                    let formatted = self
                        .format_slots(&slots, &upstream.results, ctx, &mut format_cache, &slot_versions)
                        .await;

                    if !timer_armed && formatted.iter().any(FormattedPage::qualified) {
                        timer_armed = true;
                        sleep.as_mut().reset(Instant::now() + Duration::from_millis(timer_ms));
                        info!(timer_ms, "early-return timer armed on first qualified slot");
                    }

                    let reorganized = reorganize(formatted, input.count);
                    let gate_passed = reorganized.len() as u32 >= input.count
                        && reorganized.iter().all(FormattedPage::qualified);
                    last_batch = Some(Batch::new(reorganized));

                    if gate_passed {
                        return Ok(last_batch.expect("just assigned"));
                    }
                }

                () = &mut sleep, if timer_armed => {
                    warn!("early-return timer fired before the qualification gate");
                    return last_batch.ok_or(ReaderError::NoContent);
                }
            }
        }
    }

    /// §4.6 step 3: format every slot, caching by `(slotIndex,
    /// snapshotVersion)` per §9's redesign of the identity-keyed cache.
    /// `PageSnapshot` is an owned value here, not an object reference, so
    /// a version counter per slot stands in for identity.
    async fn format_slots(
        &self,
        slots: &[Option<PageSnapshot>],
        upstream_results: &[UpstreamResult],
        ctx: &RequestContext,
        format_cache: &mut HashMap<(usize, u64), FormattedPage>,
        slot_versions: &[u64],
    ) -> Vec<FormattedPage> {
        let mut pages = Vec::with_capacity(slots.len());
        for (index, slot) in slots.iter().enumerate() {
            let upstream_result = &upstream_results[index];
            let page = match slot {
                None => stub_from_upstream(upstream_result),
                Some(snapshot) => {
                    let key = (index, slot_versions[index]);
                    if let Some(cached) = format_cache.get(&key) {
                        cached.clone()
                    } else {
                        let page = match self.formatter.format(ctx, snapshot).await {
                            Ok(page) => page,
                            Err(err) => {
                                warn!(error = %err, slot = index, "formatter failed, falling back to upstream stub");
                                stub_from_upstream(upstream_result)
                            }
                        };
                        format_cache.insert(key, page.clone());
                        page
                    }
                }
            };
            pages.push(page);
        }
        pages
    }
}

fn stub_from_upstream(result: &UpstreamResult) -> FormattedPage {
    FormattedPage::stub(result.url.clone(), result.title.clone(), result.content.clone())
}
