//! C4: `format(mode, snapshot) -> FormattedPage` (§4.4). Mode dispatch plus
//! the markdown path's two-pass readability heuristic and the
//! images/links mixins. Same DOM-budget-then-fallback-chain shape as
//! `riptide-extraction::enhanced_extractor`, reused here one level up as
//! a C3-calling orchestrator instead of a DOM walker itself.

use std::collections::BTreeMap;

use reader_markdown::{to_markdown, ImageRef, LinkRef, MarkdownOptions};
use reader_types::{FormattedPage, Mode, PageSnapshot, RequestContext, Result};
use url::Url;

use crate::artifacts::ScreenshotStore;

pub struct SnapshotFormatter {
    screenshots: ScreenshotStore,
}

impl SnapshotFormatter {
    pub fn new(screenshots: ScreenshotStore) -> Self {
        Self { screenshots }
    }

    #[tracing::instrument(skip(self, snapshot), fields(url = %snapshot.href, mode = ?ctx.mode))]
    pub async fn format(&self, ctx: &RequestContext, snapshot: &PageSnapshot) -> Result<FormattedPage> {
        let mut mixin_source: Option<(Vec<ImageRef>, Vec<LinkRef>)> = None;

        let mut page = match ctx.mode {
            Mode::Screenshot => self.format_screenshot(ctx, snapshot).await?,
            Mode::Pageshot => self.format_pageshot(ctx, snapshot).await?,
            Mode::Html => format_html(snapshot),
            Mode::Text => format_text(snapshot),
            Mode::Markdown => {
                let (page, images, links) = format_markdown(snapshot);
                mixin_source = Some((images, links));
                page
            }
        };

        if let Some((images, links)) = mixin_source {
            if ctx.with_images_summary {
                page.images = Some(images_summary(&images));
            }
            if ctx.with_links_summary {
                page.links = Some(links_summary(&links));
            }
        }

        page.text_representation = Some(text_representation(ctx.mode, &page));
        Ok(page)
    }

    async fn format_screenshot(&self, ctx: &RequestContext, snapshot: &PageSnapshot) -> Result<FormattedPage> {
        let mut page = FormattedPage { url: Some(snapshot.href.clone()), title: snapshot.title.clone(), ..Default::default() };
        if let Some(bytes) = &snapshot.screenshot {
            page.screenshot_url = Some(self.screenshots.persist(&ctx.host, bytes).await?);
        }
        Ok(page)
    }

    async fn format_pageshot(&self, ctx: &RequestContext, snapshot: &PageSnapshot) -> Result<FormattedPage> {
        let mut page = FormattedPage {
            url: Some(snapshot.href.clone()),
            title: snapshot.title.clone(),
            html: snapshot.html.clone(),
            ..Default::default()
        };
        if let Some(bytes) = &snapshot.pageshot {
            page.pageshot_url = Some(self.screenshots.persist(&ctx.host, bytes).await?);
        }
        Ok(page)
    }
}

fn format_html(snapshot: &PageSnapshot) -> FormattedPage {
    FormattedPage {
        url: Some(snapshot.href.clone()),
        title: snapshot.title.clone(),
        html: snapshot.html.clone(),
        ..Default::default()
    }
}

fn format_text(snapshot: &PageSnapshot) -> FormattedPage {
    FormattedPage {
        url: Some(snapshot.href.clone()),
        title: snapshot.title.clone(),
        text: snapshot.text.clone(),
        ..Default::default()
    }
}

/// §4.4 markdown path, steps 1-3.
fn format_markdown(snapshot: &PageSnapshot) -> (FormattedPage, Vec<ImageRef>, Vec<LinkRef>) {
    let mut page = FormattedPage {
        url: Some(snapshot.href.clone()),
        title: snapshot.title.clone().or_else(|| snapshot.parsed.as_ref().and_then(|p| p.title.clone())),
        published_time: snapshot.parsed.as_ref().and_then(|p| p.published_time.clone()),
        ..Default::default()
    };

    if snapshot.is_pdf {
        let content = snapshot
            .parsed
            .as_ref()
            .and_then(|p| p.content.clone())
            .or_else(|| snapshot.text.clone())
            .unwrap_or_default();
        page.content = Some(content);
        return (page, Vec::new(), Vec::new());
    }

    if snapshot.exceeds_dom_budget() {
        page.content = snapshot.text.clone();
        return (page, Vec::new(), Vec::new());
    }

    let (content, images, links) = render_markdown_content(snapshot);
    page.content = Some(content);
    (page, images, links)
}

/// §4.4 step 3: the two-pass readability heuristic plus raw-HTML/text fallback chain.
fn render_markdown_content(snapshot: &PageSnapshot) -> (String, Vec<ImageRef>, Vec<LinkRef>) {
    let base_url = Url::parse(&snapshot.href).ok();
    let html = snapshot.html.clone().unwrap_or_default();
    let opts = MarkdownOptions { base_url: base_url.clone(), ..Default::default() };

    let par1 = to_markdown(&html, &opts);
    let parsed_content = snapshot.parsed.as_ref().and_then(|p| p.content.clone());

    let (content, images, links) = match &parsed_content {
        Some(pc) => {
            let par2 = to_markdown(pc, &opts);
            let par1_len = char_len(&par1.markdown);
            if par1_len > 0 && char_len(&par2.markdown) as f64 >= 0.3 * par1_len as f64 {
                let no_rules_opts = MarkdownOptions { no_rules: true, base_url: base_url.clone(), ..Default::default() };
                let rerun = to_markdown(pc, &no_rules_opts);
                (rerun.markdown, rerun.images, rerun.links)
            } else {
                (par1.markdown.clone(), par1.images.clone(), par1.links.clone())
            }
        }
        None => (par1.markdown.clone(), par1.images.clone(), par1.links.clone()),
    };

    if !content.trim().is_empty() && !looks_like_raw_html(&content) {
        return (content, images, links);
    }

    if !par1.markdown.trim().is_empty() && !looks_like_raw_html(&par1.markdown) {
        return (par1.markdown, par1.images, par1.links);
    }

    (snapshot.text.clone().unwrap_or_default(), Vec::new(), Vec::new())
}

fn looks_like_raw_html(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// §4.4 Mixins: "Image i,j: alt" -> src, grouping all 1-based positions
/// that shared the same `src`.
fn images_summary(images: &[ImageRef]) -> BTreeMap<String, String> {
    let mut grouped: Vec<(String, Vec<u32>, String)> = Vec::new();
    for image in images {
        match grouped.iter_mut().find(|(src, _, _)| *src == image.src) {
            Some((_, positions, _)) => positions.push(image.position),
            None => grouped.push((image.src.clone(), vec![image.position], image.alt.clone())),
        }
    }

    grouped
        .into_iter()
        .map(|(src, positions, alt)| {
            let positions = positions.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
            (format!("Image {positions}: {alt}"), src)
        })
        .collect()
}

/// §4.4 Mixins: anchorText -> href, later duplicate anchor texts win.
fn links_summary(links: &[LinkRef]) -> BTreeMap<String, String> {
    let mut summary = BTreeMap::new();
    for link in links {
        summary.insert(link.text.clone(), link.href.clone());
    }
    summary
}

/// §4.4 "String form": the per-mode `textRepresentation` value. (The
/// larger Title/URL Source/Markdown Content template lives in C6, which
/// composes it from this field when rendering a batch entry.)
fn text_representation(mode: Mode, page: &FormattedPage) -> String {
    match mode {
        Mode::Markdown => page.content.clone().unwrap_or_default(),
        Mode::Html => page.html.clone().unwrap_or_default(),
        Mode::Text => page.text.clone().unwrap_or_default(),
        Mode::Screenshot => page.screenshot_url.clone().map(|u| format!("{u}\n")).unwrap_or_default(),
        Mode::Pageshot => page.pageshot_url.clone().map(|u| format!("{u}\n")).unwrap_or_default(),
    }
}
