//! Small text-shaping helpers shared by several rules (§4.3).

use once_cell::sync::Lazy;
use regex::Regex;

static COLLAPSE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses any run of whitespace to a single space and trims the ends.
/// Used by improved-inline-link (rule 6) on anchor text.
pub fn collapse_whitespace(text: &str) -> String {
    COLLAPSE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Collapses runs of 3+ newlines down to 2. Improved-paragraph (rule 5).
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newline_run = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                out.push(ch);
            }
        } else {
            newline_run = 0;
            out.push(ch);
        }
    }
    out
}

/// Backslash-escapes `(` and `)`. Used when embedding a URL inside
/// Markdown link syntax (rule 6).
pub fn escape_parens(text: &str) -> String {
    text.replace('(', "\\(").replace(')', "\\)")
}

/// Backslash-escapes `"`. Used when embedding a title string inside
/// Markdown link syntax (rule 6).
pub fn escape_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Length of the longest run of consecutive backticks in `text`. Rule 7
/// fences with one more backtick than the longest run it contains so the
/// fence itself can never be confused with the content.
pub fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0usize;
    let mut current = 0usize;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(collapse_whitespace("  a   b\n\tc "), "a b c");
    }

    #[test]
    fn collapses_blank_line_runs() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn escapes_parens_and_quotes() {
        assert_eq!(escape_parens("a(b)c"), "a\\(b\\)c");
        assert_eq!(escape_quotes("a\"b"), "a\\\"b");
    }

    #[test]
    fn backtick_fence_is_one_longer_than_longest_run() {
        assert_eq!(longest_backtick_run("no backticks"), 0);
        assert_eq!(longest_backtick_run("has ``two``"), 2);
    }
}
