//! The reorganization step and batch string form from §4.6.

use std::collections::BTreeMap;

use reader_types::{FormattedPage, UpstreamResult};

/// A finished, ordered set of formatted pages ready for a response.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub pages: Vec<FormattedPage>,
}

impl Batch {
    pub fn new(pages: Vec<FormattedPage>) -> Self {
        Self { pages }
    }

    /// §4.6 step 2: the `count=0` short-circuit batch of stub pages.
    pub fn stubs(results: &[UpstreamResult]) -> Self {
        let pages = results.iter().map(|r| FormattedPage::stub(r.url.clone(), r.title.clone(), r.content.clone())).collect();
        Self { pages }
    }

    /// §4.6 "Batch string form".
    pub fn to_string_form(&self) -> String {
        let body = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| render_entry(i + 1, page))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}\n", body.trim_end())
    }
}

/// §4.6 Reorganization: qualified-first selection, then restored to
/// original slot order, then truncated to `count`. Dropping trailing
/// qualified slots beyond `count` is intentional (§9 Open Questions).
pub fn reorganize(pages: Vec<FormattedPage>, count: u32) -> Vec<FormattedPage> {
    let count = count as usize;
    let mut qualified = Vec::new();
    let mut unqualified = Vec::new();
    for (index, page) in pages.iter().enumerate() {
        if page.qualified() {
            qualified.push(index);
        } else {
            unqualified.push(index);
        }
    }

    let mut selected = qualified;
    for index in unqualified {
        if selected.len() >= count {
            break;
        }
        selected.push(index);
    }

    selected.sort_unstable();
    selected.truncate(count);
    selected.into_iter().map(|i| pages[i].clone()).collect()
}

fn render_entry(index: usize, page: &FormattedPage) -> String {
    let Some(url) = page.url.as_deref() else {
        return format!("[{index}] No content available for (unknown URL)");
    };

    if let Some(content) = &page.content {
        let mut block = format!("[{index}] Title: {}\nURL Source: {}\n", page.title.as_deref().unwrap_or(""), url);
        if let Some(published) = &page.published_time {
            block.push_str(&format!("Published Time: {published}\n"));
        }
        block.push_str("Markdown Content:\n");
        block.push_str(content);
        if let Some(images) = &page.images {
            block.push_str(&render_map_block("Images", images));
        }
        if let Some(links) = &page.links {
            block.push_str(&render_map_block("Links/Buttons", links));
        }
        return block;
    }

    if let Some(description) = &page.description {
        let mut block = format!(
            "[{index}] Title: {}\nURL Source: {}\nDescription: {}\n",
            page.title.as_deref().unwrap_or(""),
            url,
            description
        );
        if let Some(text_representation) = &page.text_representation {
            block.push_str("Content:\n");
            block.push_str(text_representation);
        }
        return block;
    }

    format!("[{index}] No content available for {url}")
}

fn render_map_block(header: &str, map: &BTreeMap<String, String>) -> String {
    let mut out = format!("\n{header}:\n");
    for (key, value) in map {
        out.push_str(&format!("{key}: {value}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualified_page(url: &str) -> FormattedPage {
        FormattedPage { url: Some(url.into()), title: Some("t".into()), content: Some("body".into()), ..Default::default() }
    }

    fn stub_page(url: &str) -> FormattedPage {
        FormattedPage::stub(url, "t", "desc")
    }

    #[test]
    fn reorganize_fills_from_unqualified_preserving_slot_order() {
        let pages = vec![stub_page("a"), qualified_page("b"), stub_page("c"), qualified_page("d")];
        let result = reorganize(pages, 3);
        let urls: Vec<_> = result.iter().map(|p| p.url.clone().unwrap()).collect();
        assert_eq!(urls, vec!["a", "b", "d"]);
    }

    #[test]
    fn reorganize_drops_trailing_qualified_beyond_count() {
        let pages = vec![qualified_page("a"), qualified_page("b"), qualified_page("c")];
        let result = reorganize(pages, 2);
        let urls: Vec<_> = result.iter().map(|p| p.url.clone().unwrap()).collect();
        assert_eq!(urls, vec!["a", "b"]);
    }

    #[test]
    fn batch_string_form_uses_full_template_when_content_present() {
        let batch = Batch::new(vec![qualified_page("https://a/")]);
        let text = batch.to_string_form();
        assert!(text.starts_with("[1] Title: t\nURL Source: https://a/\nMarkdown Content:\nbody"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn batch_string_form_uses_description_template_for_stubs() {
        let batch = Batch::new(vec![stub_page("https://a/")]);
        let text = batch.to_string_form();
        assert_eq!(text, "[1] Title: t\nURL Source: https://a/\nDescription: desc\n");
    }
}
