//! §6 header parsing: `X-Respond-With`, `X-Timeout`, `X-No-Cache`,
//! `X-Locale`, `x-categories`/`x-engines`/`x-language`/`x-time_range`
//! (split on `", "`), plus the crawl-specific selector/proxy/mixin
//! headers.

use axum::http::HeaderMap;
use reader_types::Mode;

pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn header_flag(headers: &HeaderMap, name: &str) -> bool {
    header_str(headers, name).is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

pub fn header_list(headers: &HeaderMap, name: &str) -> Vec<String> {
    header_str(headers, name)
        .map(|v| v.split(", ").filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// `X-Respond-With` (§6), defaulting to `markdown` (GLOSSARY "Mode").
pub fn parse_mode(headers: &HeaderMap) -> Mode {
    match header_str(headers, "x-respond-with").map(str::to_ascii_lowercase).as_deref() {
        Some("html") => Mode::Html,
        Some("text") => Mode::Text,
        Some("screenshot") => Mode::Screenshot,
        Some("pageshot") => Mode::Pageshot,
        _ => Mode::Markdown,
    }
}

/// `X-Timeout` in seconds, converted to milliseconds.
pub fn parse_timeout_ms(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, "x-timeout").and_then(|v| v.parse::<u64>().ok()).map(|secs| secs * 1_000)
}
