//! The recursive DOM walker behind C3. Same shape as
//! `riptide_extraction::enhanced_extractor::StructuredExtractor`:
//! walks `element.children()`, matches `ElementRef::wrap(child)` against a
//! tag-name dispatch, and collapses whitespace on text runs. This module
//! keeps that shape and replaces the "pull plain text out" goal with
//! "emit Markdown, tracking images and links along the way" (§4.3).

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};
use url::Url;

use crate::escape::{collapse_blank_lines, collapse_whitespace, escape_parens, escape_quotes, longest_backtick_run};
use crate::tables::render_table;

/// Tags rule 1 (remove-irrelevant) drops outright.
const REMOVE_IRRELEVANT_TAGS: &[&str] = &["meta", "style", "script", "noscript", "link", "textarea", "select", "head"];

#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Skips rules 1-4 (remove-irrelevant, truncate-svg, title-as-h1,
    /// data-url-to-pseudo-object-url); rules 5-9 still apply (§4.3).
    pub no_rules: bool,
    /// Used to resolve relative `href`/`src` attributes to absolute URLs.
    pub base_url: Option<Url>,
    /// Rule 4: rewrite `data:` image sources to pseudo `blob:` object URLs.
    pub img_data_url_to_object_url: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self { no_rules: false, base_url: None, img_data_url_to_object_url: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub position: u32,
    pub alt: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRef {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, Default)]
pub struct RewriteResult {
    pub markdown: String,
    pub images: Vec<ImageRef>,
    pub links: Vec<LinkRef>,
}

/// Entry point (§4.3, §8 Fallback): try the full rule chain including GFM
/// tables; on failure retry with tables disabled; on a second failure give
/// up and return an empty result rather than propagate.
pub fn to_markdown(html_fragment: &str, options: &MarkdownOptions) -> RewriteResult {
    match render(html_fragment, options, true) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(error = %err, "markdown render failed with table plugin, retrying without it");
            match render(html_fragment, options, false) {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(error = %err, "markdown render failed without table plugin too, returning empty");
                    RewriteResult::default()
                }
            }
        }
    }
}

struct Ctx<'a> {
    opts: &'a MarkdownOptions,
    with_tables: bool,
    image_counter: u32,
    images: Vec<ImageRef>,
    links: Vec<LinkRef>,
}

fn render(html_fragment: &str, options: &MarkdownOptions, with_tables: bool) -> anyhow::Result<RewriteResult> {
    let document = Html::parse_fragment(html_fragment);
    let mut ctx = Ctx { opts: options, with_tables, image_counter: 0, images: Vec::new(), links: Vec::new() };
    let markdown = collapse_blank_lines(render_children(document.tree.root(), &mut ctx)?.trim());
    Ok(RewriteResult { markdown, images: ctx.images, links: ctx.links })
}

fn render_children(node: NodeRef<'_, Node>, ctx: &mut Ctx) -> anyhow::Result<String> {
    let mut out = String::new();
    for child in node.children() {
        out.push_str(&render_node(child, ctx)?);
    }
    Ok(out)
}

fn render_element_ref_children(el: ElementRef<'_>, ctx: &mut Ctx) -> anyhow::Result<String> {
    let mut out = String::new();
    for child in el.children() {
        out.push_str(&render_node(child, ctx)?);
    }
    Ok(out)
}

fn render_node(node: NodeRef<'_, Node>, ctx: &mut Ctx) -> anyhow::Result<String> {
    match node.value() {
        Node::Text(text) => Ok(text.to_string()),
        Node::Element(elem) => render_element(node, elem, ctx),
        _ => render_children(node, ctx),
    }
}

fn render_element(node: NodeRef<'_, Node>, elem: &scraper::node::Element, ctx: &mut Ctx) -> anyhow::Result<String> {
    let tag = elem.name();

    // Rule 1: remove-irrelevant.
    if !ctx.opts.no_rules && REMOVE_IRRELEVANT_TAGS.contains(&tag) {
        return Ok(String::new());
    }
    // Rule 2: truncate-svg. Drop the whole subtree, it's almost always an icon sprite.
    if !ctx.opts.no_rules && tag == "svg" {
        return Ok(String::new());
    }
    // Rule 3: title-as-h1. Surface <title> as a Setext-style heading.
    if !ctx.opts.no_rules && tag == "title" {
        let text = collapse_whitespace(&render_children(node, ctx)?);
        if text.is_empty() {
            return Ok(String::new());
        }
        return Ok(format!("{}\n{}\n\n", text, "=".repeat(text.chars().count())));
    }

    match tag {
        "img" => Ok(render_img(elem, ctx)),
        "a" if elem.attr("href").is_some() => render_link(node, elem, ctx),
        "code" => render_code(node, elem, ctx),
        "table" if ctx.with_tables => {
            let element_ref = ElementRef::wrap(node).expect("Node::Element wraps to ElementRef");
            let mut render_cell = |cell: ElementRef<'_>| render_element_ref_children(cell, ctx);
            render_table(element_ref, &mut render_cell)
        }
        "table" => {
            // Tables disabled (fallback retry or caller opt-out): fall through to
            // plain child rendering so the row/cell text still survives.
            render_children(node, ctx)
        }
        "p" => render_paragraph(node, ctx),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => render_heading(node, tag, ctx),
        "br" => Ok("\n".to_string()),
        "hr" => Ok("\n---\n\n".to_string()),
        "strong" | "b" => wrap_inline(node, ctx, "**", "**"),
        "em" | "i" => wrap_inline(node, ctx, "*", "*"),
        "li" => {
            let text = collapse_whitespace(&render_children(node, ctx)?);
            if text.is_empty() { Ok(String::new()) } else { Ok(format!("- {text}\n")) }
        }
        "ul" | "ol" => {
            let body = render_children(node, ctx)?;
            if body.is_empty() { Ok(String::new()) } else { Ok(format!("{body}\n")) }
        }
        "blockquote" => {
            let body = render_children(node, ctx)?;
            let trimmed = body.trim();
            if trimmed.is_empty() {
                Ok(String::new())
            } else {
                let quoted: String = trimmed.lines().map(|line| format!("> {line}\n")).collect();
                Ok(format!("{quoted}\n"))
            }
        }
        _ => render_children(node, ctx),
    }
}

fn render_paragraph(node: NodeRef<'_, Node>, ctx: &mut Ctx) -> anyhow::Result<String> {
    let inner = render_children(node, ctx)?;
    let collapsed = collapse_blank_lines(inner.trim());
    if collapsed.is_empty() { Ok(String::new()) } else { Ok(format!("{collapsed}\n\n")) }
}

fn render_heading(node: NodeRef<'_, Node>, tag: &str, ctx: &mut Ctx) -> anyhow::Result<String> {
    let level: usize = tag[1..2].parse().unwrap_or(1);
    let text = collapse_whitespace(&render_children(node, ctx)?);
    if text.is_empty() { Ok(String::new()) } else { Ok(format!("{} {text}\n\n", "#".repeat(level))) }
}

fn wrap_inline(node: NodeRef<'_, Node>, ctx: &mut Ctx, open: &str, close: &str) -> anyhow::Result<String> {
    let inner = render_children(node, ctx)?;
    let trimmed = inner.trim();
    if trimmed.is_empty() { Ok(String::new()) } else { Ok(format!("{open}{trimmed}{close}")) }
}

/// Rule 6 (improved-inline-link): anchor text with whitespace collapsed,
/// href resolved against the base URL and paren-escaped, optional title
/// quote-escaped. Tracked in `ctx.links` for C4's link summary.
fn render_link(node: NodeRef<'_, Node>, elem: &scraper::node::Element, ctx: &mut Ctx) -> anyhow::Result<String> {
    let href_raw = elem.attr("href").unwrap_or("");
    let resolved = resolve_url(ctx.opts.base_url.as_ref(), href_raw);
    let text = collapse_whitespace(&render_children(node, ctx)?);

    if !resolved.is_empty() {
        ctx.links.push(LinkRef { text: text.clone(), href: resolved.clone() });
    }

    let escaped_href = escape_parens(&resolved);
    match elem.attr("title") {
        Some(title) => Ok(format!("[{}]({} \"{}\")", text, escaped_href, escape_quotes(title))),
        None => Ok(format!("[{text}]({escaped_href})")),
    }
}

/// Rules 4 and 8: resolve `src`/`data-src`, optionally rewrite `data:` URLs
/// to pseudo `blob:` object URLs, and generate `alt` text when missing.
/// Tracked in `ctx.images` (1-indexed position) for C4's image summary.
fn render_img(elem: &scraper::node::Element, ctx: &mut Ctx) -> String {
    let mut src = elem.attr("src").unwrap_or("").to_string();

    if src.is_empty() {
        if let Some(data_src) = elem.attr("data-src") {
            if !data_src.starts_with("data:") {
                src = data_src.to_string();
            }
        }
    }

    if !ctx.opts.no_rules && ctx.opts.img_data_url_to_object_url && src.starts_with("data:") {
        let origin = ctx
            .opts
            .base_url
            .as_ref()
            .map(|u| format!("{}://{}", u.scheme(), u.host_str().unwrap_or("")))
            .unwrap_or_default();
        let digest = md5::compute(src.as_bytes());
        src = format!("blob:{origin}/{digest:x}");
    }

    let resolved = resolve_url(ctx.opts.base_url.as_ref(), &src);
    ctx.image_counter += 1;
    let position = ctx.image_counter;

    let alt = match elem.attr("alt") {
        Some(alt) if !alt.trim().is_empty() => alt.trim().to_string(),
        _ => String::new(),
    };

    ctx.images.push(ImageRef { position, alt: alt.clone(), src: resolved.clone() });
    format!("![Image {position}: {alt}]({resolved})")
}

/// Rule 7 (improved-code): a `<code>` that is the sole child of a `<pre>`
/// becomes a fenced block (language from `class="language-*"`); otherwise
/// it's fenced inline with one more backtick than the longest run it contains.
fn render_code(node: NodeRef<'_, Node>, elem: &scraper::node::Element, ctx: &mut Ctx) -> anyhow::Result<String> {
    let is_pre_block = node
        .parent()
        .and_then(|parent| parent.value().as_element().map(|e| (e, parent)))
        .map(|(parent_elem, parent)| parent_elem.name() == "pre" && parent.children().count() == 1)
        .unwrap_or(false);

    let inner = render_children(node, ctx)?;

    if is_pre_block {
        let lang = elem.classes().find_map(|c| c.strip_prefix("language-")).unwrap_or("");
        return Ok(format!("```{lang}\n{}\n```\n\n", inner.trim_end_matches('\n')));
    }

    if inner.contains('\n') {
        return Ok(format!("```\n{inner}\n```"));
    }

    let fence = "`".repeat(longest_backtick_run(&inner) + 1);
    if inner.starts_with('`') || inner.ends_with('`') {
        Ok(format!("{fence} {inner} {fence}"))
    } else {
        Ok(format!("{fence}{inner}{fence}"))
    }
}

fn resolve_url(base: Option<&Url>, raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match base {
        Some(base) => base.join(raw).map(|u| u.to_string()).unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(html: &str) -> RewriteResult {
        to_markdown(html, &MarkdownOptions::default())
    }

    #[test]
    fn renders_heading_and_paragraph() {
        let r = md("<h1>Title</h1><p>Hello <strong>world</strong></p>");
        assert_eq!(r.markdown, "# Title\n\nHello **world**");
    }

    #[test]
    fn rule1_strips_script_and_style() {
        let r = md("<p>keep</p><script>evil()</script><style>.a{}</style>");
        assert_eq!(r.markdown, "keep");
    }

    #[test]
    fn rule2_truncates_svg() {
        let r = md("<p>before</p><svg><path d=\"M0 0\"/></svg><p>after</p>");
        assert_eq!(r.markdown, "before\n\nafter");
    }

    #[test]
    fn rule3_title_as_setext_h1() {
        let r = md("<title>My Page</title><p>body</p>");
        assert_eq!(r.markdown, "My Page\n========\n\nbody");
    }

    #[test]
    fn no_rules_keeps_title_and_script_literal() {
        let opts = MarkdownOptions { no_rules: true, ..Default::default() };
        let r = to_markdown("<title>T</title><script>x()</script>", &opts);
        assert!(r.markdown.contains('T'));
    }

    #[test]
    fn rule6_link_tracks_and_escapes() {
        let opts = MarkdownOptions { base_url: Url::parse("https://example.com/base/").ok(), ..Default::default() };
        let r = to_markdown(r#"<a href="/p(1)">click here</a>"#, &opts);
        assert_eq!(r.markdown, "[click here](https://example.com/p\\(1\\))");
        assert_eq!(r.links.len(), 1);
        assert_eq!(r.links[0].href, "https://example.com/p(1)");
    }

    #[test]
    fn rule8_always_prefixes_image_n_even_with_real_alt() {
        let r = md(r#"<img src="a.png"><img src="b.png" alt="cat">"#);
        assert_eq!(r.images.len(), 2);
        assert_eq!(r.images[0].alt, "");
        assert_eq!(r.images[1].alt, "cat");
        assert!(r.markdown.contains("![Image 1: ](a.png)"));
        assert!(r.markdown.contains("![Image 2: cat](b.png)"));
    }

    #[test]
    fn rule7_pre_code_becomes_fenced_block_with_language() {
        let r = md(r#"<pre><code class="language-rust">fn main() {}</code></pre>"#);
        assert_eq!(r.markdown, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn rule7_inline_code_fences_on_embedded_backticks() {
        let r = md("<p>run <code>a`b</code> now</p>");
        assert!(r.markdown.contains("``a`b``"));
    }

    #[test]
    fn rule9_renders_gfm_table() {
        let r = md("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>");
        assert_eq!(r.markdown, "| A | B |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn idempotent_on_already_rendered_markdown_text() {
        let text = "Already **bold** text with a [link](https://example.com)";
        let wrapped = format!("<p>{text}</p>");
        let r = md(&wrapped);
        assert_eq!(r.markdown.trim(), text.trim());
    }
}
