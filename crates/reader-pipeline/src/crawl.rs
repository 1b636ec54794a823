//! C7: the crawl pipeline (§4.7). URL validation, self-crawl rejection,
//! and the "continue until good, else last" scrape loop.

use std::sync::Arc;

use futures::StreamExt;
use reader_format::SnapshotFormatter;
use reader_types::{Browser, FormattedPage, PageSnapshot, ReaderError, RequestContext, Result};
use url::Url;

/// §4.7 step: protocol allowlist plus a minimal TLD sanity check.
///
/// Both failure modes fold into the same `ParamValidation` message so the
/// HTTP boundary always answers the §8 scenario-6 body verbatim:
/// `Invalid URL or TLD`.
pub fn validate_target_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|_| invalid_url())?;

    if !matches!(url.scheme(), "http" | "https" | "file") {
        return Err(invalid_url());
    }

    if url.scheme() != "file" {
        let host = url.host_str().ok_or_else(invalid_url)?;
        let last_label = host.rsplit('.').next().unwrap_or(host);
        if last_label.len() < 2 {
            return Err(invalid_url());
        }
    }

    Ok(url)
}

fn invalid_url() -> ReaderError {
    ReaderError::ParamValidation("Invalid URL or TLD".into())
}

pub struct CrawlPipeline {
    browser: Arc<dyn Browser>,
    formatter: Arc<SnapshotFormatter>,
}

impl CrawlPipeline {
    pub fn new(browser: Arc<dyn Browser>, formatter: Arc<SnapshotFormatter>) -> Self {
        Self { browser, formatter }
    }

    /// §4.7: validates, rejects self-crawls, then either formats
    /// caller-supplied HTML directly or drives the Browser stream to the
    /// first "good enough" snapshot (or the last one seen).
    #[tracing::instrument(skip(self, ctx, html), fields(url = %raw_url))]
    pub async fn crawl(&self, ctx: &RequestContext, raw_url: &str, wait_for_selector: bool, html: Option<String>) -> Result<FormattedPage> {
        let target = validate_target_url(raw_url)?;

        // Circuit-breaker set (§5 Shared resources): this gateway's own
        // host is the only member that matters for one request, so a
        // direct comparison stands in for the shared add-only set without
        // reintroducing cross-request global state (§9 re-architecture
        // guidance against ambient state for per-request data).
        if target.host_str() == Some(ctx.host.as_str()) {
            return Err(ReaderError::ParamValidation("refusing to crawl own host".into()));
        }

        // POST body's `html` field (§6) supplies the page directly,
        // bypassing the Browser round-trip entirely.
        if let Some(html) = html {
            let snapshot = PageSnapshot { href: target.as_str().to_string(), html: Some(html), ..Default::default() };
            return self.formatter.format(ctx, &snapshot).await;
        }

        let mut stream = self.browser.scrape(target.as_str(), ctx);
        let mut last_snapshot: Option<PageSnapshot> = None;

        while let Some(snapshot) = stream.next().await {
            if wait_for_selector || !is_good_enough(&snapshot) {
                last_snapshot = Some(snapshot);
                continue;
            }
            return self.formatter.format(ctx, &snapshot).await;
        }

        match last_snapshot {
            Some(snapshot) => self.formatter.format(ctx, &snapshot).await,
            None => Err(ReaderError::NoContent),
        }
    }
}

/// §4.7: a snapshot is good enough to stop on unless it both lacks
/// `parsed.content` and lacks a non-empty title, and isn't a PDF.
fn is_good_enough(snapshot: &PageSnapshot) -> bool {
    if snapshot.is_pdf {
        return true;
    }
    let has_parsed_content = snapshot.parsed.as_ref().is_some_and(|p| p.content.is_some());
    let has_title = snapshot.title.as_deref().is_some_and(|t| !t.is_empty());
    has_parsed_content || has_title
}

#[cfg(test)]
mod tests {
    use super::*;
    use reader_format::ScreenshotStore;
    use reader_types::testing::ScriptedBrowser;
    use reader_types::{Mode, ParsedContent};

    fn ctx() -> RequestContext {
        RequestContext::new("gateway.local").with_mode(Mode::Markdown)
    }

    fn formatter() -> Arc<SnapshotFormatter> {
        Arc::new(SnapshotFormatter::new(ScreenshotStore::new(std::env::temp_dir().join("reader-pipeline-crawl-tests"))))
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_target_url("https://example.com/").is_ok());
        assert!(validate_target_url("http://example.com/path?q=1").is_ok());
    }

    #[test]
    fn rejects_short_tld() {
        let err = validate_target_url("http://foo.x/").unwrap_err();
        assert!(matches!(err, ReaderError::ParamValidation(msg) if msg == "Invalid URL or TLD"));
    }

    #[test]
    fn rejects_non_http_protocols() {
        let err = validate_target_url("ftp://example.com/").unwrap_err();
        assert!(matches!(err, ReaderError::ParamValidation(_)));
    }

    #[tokio::test]
    async fn rejects_self_crawl_without_calling_browser() {
        let browser = Arc::new(ScriptedBrowser::new());
        let pipeline = CrawlPipeline::new(browser, formatter());
        let ctx = ctx();
        let err = pipeline.crawl(&ctx, "https://gateway.local/", false, None).await.unwrap_err();
        assert!(matches!(err, ReaderError::ParamValidation(_)));
    }

    #[tokio::test]
    async fn stops_on_first_snapshot_with_parsed_content() {
        let incomplete = PageSnapshot::empty("https://a.com/");
        let complete = PageSnapshot {
            href: "https://a.com/".into(),
            parsed: Some(ParsedContent { title: Some("T".into()), content: Some("<p>body</p>".into()), published_time: None }),
            title: Some("T".into()),
            html: Some("<p>body</p>".into()),
            ..Default::default()
        };
        let browser = Arc::new(ScriptedBrowser::new().with_script("https://a.com/", vec![incomplete, complete]));
        let pipeline = CrawlPipeline::new(browser, formatter());
        let page = pipeline.crawl(&ctx(), "https://a.com/", false, None).await.unwrap();
        assert!(page.qualified());
    }

    #[tokio::test]
    async fn wait_for_selector_forces_consumption_through_to_last_snapshot() {
        let first = PageSnapshot {
            href: "https://a.com/".into(),
            title: Some("T".into()),
            html: Some("<p>first</p>".into()),
            parsed: Some(ParsedContent { title: Some("T".into()), content: Some("first".into()), published_time: None }),
            ..Default::default()
        };
        let last = PageSnapshot {
            href: "https://a.com/".into(),
            title: Some("T".into()),
            html: Some("<p>final</p>".into()),
            parsed: Some(ParsedContent { title: Some("T".into()), content: Some("final".into()), published_time: None }),
            ..Default::default()
        };
        let browser = Arc::new(ScriptedBrowser::new().with_script("https://a.com/", vec![first, last]));
        let pipeline = CrawlPipeline::new(browser, formatter());
        let page = pipeline.crawl(&ctx(), "https://a.com/", true, None).await.unwrap();
        assert_eq!(page.content.as_deref(), Some("final"));
    }

    #[tokio::test]
    async fn empty_stream_is_no_content() {
        let browser = Arc::new(ScriptedBrowser::new());
        let pipeline = CrawlPipeline::new(browser, formatter());
        let err = pipeline.crawl(&ctx(), "https://a.com/", false, None).await.unwrap_err();
        assert!(matches!(err, ReaderError::NoContent));
    }

    #[tokio::test]
    async fn supplied_html_bypasses_the_browser_entirely() {
        // An empty-scripted browser would answer `NoContent` (see
        // `empty_stream_is_no_content`); getting formatted content back
        // instead proves the browser was never consulted.
        let browser = Arc::new(ScriptedBrowser::new());
        let pipeline = CrawlPipeline::new(browser, formatter());
        let page = pipeline
            .crawl(&ctx(), "https://a.com/", false, Some("<p>supplied body</p>".into()))
            .await
            .unwrap();
        assert!(page.content.unwrap().contains("supplied body"));
    }
}
