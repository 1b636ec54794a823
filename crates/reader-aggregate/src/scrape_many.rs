//! C5: `scrapeMany(urls, options) -> lazy sequence of (Snapshot|nil)[]` (§4.5).
//!
//! Built as an `async_stream::stream!` generator over hand-rolled
//! `Stream::poll_next` state machines, the same shape as
//! `riptide-streaming::ndjson`/`backpressure`. Each emission is an
//! owned clone of the slot array, not a shared mutable slice, so
//! consumers can process one emission while the next is already forming.

use std::sync::Arc;

use async_stream::stream;
use futures::stream::{select_all, BoxStream, StreamExt};
use reader_types::{Browser, PageSnapshot, RequestContext};
use tracing::debug;

/// Fans N `Browser::scrape` streams into slot-array emissions.
///
/// Emits the nil-filled slot array immediately, then once per
/// non-nil update to any slot, then once more when every underlying
/// stream has terminated. Dropping the returned stream drops every
/// underlying scrape stream with it (§4.5 Cancellation). There is no
/// detached task here, just polled futures.
pub fn scrape_many(browser: Arc<dyn Browser>, urls: Vec<String>, ctx: RequestContext) -> BoxStream<'static, Vec<Option<PageSnapshot>>> {
    let slot_count = urls.len();

    stream! {
        let mut slots: Vec<Option<PageSnapshot>> = vec![None; slot_count];
        yield slots.clone();

        let per_url_streams = urls.into_iter().enumerate().map(|(index, url)| {
            let browser = Arc::clone(&browser);
            let ctx = ctx.clone();
            stream! {
                let mut inner = browser.scrape(&url, &ctx);
                while let Some(snapshot) = inner.next().await {
                    yield (index, snapshot);
                }
                debug!(url, "scrape stream for slot ended");
            }
            .boxed()
        });

        let mut merged = select_all(per_url_streams);
        while let Some((index, snapshot)) = merged.next().await {
            slots[index] = Some(snapshot);
            yield slots.clone();
        }

        yield slots.clone();
    }
    .boxed()
}
