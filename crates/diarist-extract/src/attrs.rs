//! Opening-tag scanning and attribute lookup.

use regex::Regex;
use std::sync::LazyLock;

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("Invalid attribute regex")
});

/// An opening tag found in raw markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenTag<'a> {
    /// Raw attribute text between the tag name and `>`
    pub attrs: &'a str,

    /// Byte offset of `<`
    pub start: usize,

    /// Byte offset just past `>`
    pub end: usize,
}

impl<'a> OpenTag<'a> {
    /// Value of the named attribute, matched case-insensitively.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        attr_value(self.attrs, name)
    }

    /// Whether the `class` attribute contains `token` as one of its classes.
    pub fn has_class(&self, token: &str) -> bool {
        self.attr("class")
            .is_some_and(|class| class.split_whitespace().any(|c| c == token))
    }
}

/// Iterate over the opening tags matched by `re`, which must capture the
/// attribute text in group 1.
pub fn open_tags<'a>(re: &'a Regex, html: &'a str) -> impl Iterator<Item = OpenTag<'a>> + 'a {
    re.captures_iter(html).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(OpenTag {
            attrs: caps.get(1).map(|m| m.as_str()).unwrap_or(""),
            start: whole.start(),
            end: whole.end(),
        })
    })
}

/// Look up an attribute value in the raw attribute text of a tag.
pub fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    ATTR_RE.captures_iter(attrs).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quoted_and_unquoted_values() {
        let attrs = r#" class="post-date big" datetime='2024-03-05' data-x=7"#;

        assert_eq!(attr_value(attrs, "class"), Some("post-date big"));
        assert_eq!(attr_value(attrs, "datetime"), Some("2024-03-05"));
        assert_eq!(attr_value(attrs, "data-x"), Some("7"));
        assert_eq!(attr_value(attrs, "missing"), None);
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        assert_eq!(attr_value(r#" DateTime="2024-01-01""#, "datetime"), Some("2024-01-01"));
    }

    #[test]
    fn does_not_match_attribute_suffix() {
        assert_eq!(attr_value(r#" data-class="post""#, "class"), None);
    }

    #[test]
    fn finds_class_tokens() {
        static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<time\b([^>]*)>").unwrap());

        let html = r#"<p><time class="big post-date" datetime="2024-01-01">x</time></p>"#;
        let tag = open_tags(&RE, html).next().unwrap();

        assert!(tag.has_class("post-date"));
        assert!(!tag.has_class("post"));
        assert_eq!(&html[tag.start..tag.end], r#"<time class="big post-date" datetime="2024-01-01">"#);
    }
}
