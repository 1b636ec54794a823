//! `FormattedPage` (§3): the per-URL output record, and the qualification
//! invariant used throughout C6's gate and reorganization logic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fully-formatted page, ready to be rendered into a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormattedPage {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub published_time: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    pub screenshot_url: Option<String>,
    pub pageshot_url: Option<String>,
    /// `"Image i,j: alt" -> src`, present only when `withImagesSummary`.
    pub images: Option<BTreeMap<String, String>>,
    /// `anchorText -> href`, present only when `withLinksSummary`; later
    /// duplicate anchor texts overwrite earlier ones (§4.4 Mixins).
    pub links: Option<BTreeMap<String, String>>,
    /// The canonical string form (§4.4 "String form").
    pub text_representation: Option<String>,
}

impl FormattedPage {
    /// §3 Invariants: `(title AND content) OR screenshotUrl OR pageshotUrl
    /// OR text OR html` is non-empty.
    pub fn qualified(&self) -> bool {
        let title_and_content = non_empty(&self.title) && non_empty(&self.content);
        title_and_content
            || non_empty(&self.screenshot_url)
            || non_empty(&self.pageshot_url)
            || non_empty(&self.text)
            || non_empty(&self.html)
    }

    /// A stub page synthesized from an upstream result when no snapshot
    /// arrived for a slot (§4.6 step 3, and the `count=0` short-circuit).
    pub fn stub(url: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_requires_title_and_content_together() {
        let mut page = FormattedPage {
            title: Some("t".into()),
            ..Default::default()
        };
        assert!(!page.qualified());
        page.content = Some("c".into());
        assert!(page.qualified());
    }

    #[test]
    fn qualified_via_screenshot_alone() {
        let page = FormattedPage {
            screenshot_url: Some("http://x/1.png".into()),
            ..Default::default()
        };
        assert!(page.qualified());
    }

    #[test]
    fn stub_is_never_qualified() {
        let page = FormattedPage::stub("https://e.com", "Title", "desc");
        assert!(!page.qualified());
    }
}
