//! C3: the rule-based HTML-to-Markdown rewriter (§4.3). Converts a parsed
//! (or raw) HTML fragment into GFM-flavored Markdown plus the image/link
//! inventories C4 folds into its images/links mixins.

pub mod escape;
pub mod render;
pub mod tables;

pub use render::{to_markdown, ImageRef, LinkRef, MarkdownOptions, RewriteResult};
