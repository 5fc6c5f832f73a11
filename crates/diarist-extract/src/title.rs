//! Title resolution.

use regex::Regex;
use std::sync::LazyLock;

use crate::sanitize::strip_tags;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title\s*>").expect("Invalid title regex")
});

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").expect("Invalid h1 regex"));

static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2\b[^>]*>(.*?)</h2\s*>").expect("Invalid h2 regex"));

/// Title matchers in priority order.
pub const TITLE_MATCHERS: &[fn(&str) -> Option<String>] = &[document_title, heading_1, heading_2];

/// Resolve a post title, falling back to the filename.
pub fn resolve_title(html: &str, filename: &str) -> String {
    TITLE_MATCHERS
        .iter()
        .find_map(|matcher| matcher(html))
        .unwrap_or_else(|| filename.to_string())
}

/// Content of `<title>`, trimmed but otherwise taken as-is.
pub fn document_title(html: &str) -> Option<String> {
    let caps = TITLE_RE.captures(html)?;
    non_empty(caps[1].trim().to_string())
}

/// Plain text of the first `<h1>`.
pub fn heading_1(html: &str) -> Option<String> {
    heading(&H1_RE, html)
}

/// Plain text of the first `<h2>`.
pub fn heading_2(html: &str) -> Option<String> {
    heading(&H2_RE, html)
}

fn heading(re: &Regex, html: &str) -> Option<String> {
    let caps = re.captures(html)?;
    non_empty(strip_tags(&caps[1]))
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
