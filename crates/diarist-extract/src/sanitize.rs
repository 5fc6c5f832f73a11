//! Markup to plain-text reduction.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("Invalid script regex")
});

static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("Invalid style regex")
});

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid comment regex"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("Invalid tag regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Reduce markup to canonical plain text.
///
/// Script and style blocks are dropped with their content, then comments,
/// then every remaining tag. Entities are decoded afterwards so escaped markup
/// in the source survives as literal text. Decoding follows the HTML5 rules for
/// text content, so legacy names without a semicolon (`&amp`, `&copy`) expand
/// and numeric references use the replacement table (`&#128;` is `€`). Whitespace runs (Unicode-aware,
/// newlines included) collapse to a single ASCII space.
pub fn strip_tags(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = COMMENT_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    let text = htmlize::unescape(text);
    let text = WHITESPACE_RE.replace_all(&text, " ");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_nested_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn drops_script_and_style_content() {
        let html = r#"<div>a<script type="text/javascript">var x = "<b>";</script>b<STYLE>p { color: red }</STYLE>c</div>"#;

        assert_eq!(strip_tags(html), "abc");
    }

    #[test]
    fn drops_comments() {
        assert_eq!(strip_tags("one <!-- two\nlines --> three"), "one three");
    }

    #[test]
    fn decodes_entities_after_stripping() {
        assert_eq!(strip_tags("<p>&lt;b&gt; &amp; &#8212; &quot;</p>"), "<b> & \u{2014} \"");
    }

    #[test]
    fn decodes_legacy_entities_without_semicolon() {
        assert_eq!(strip_tags("fish &amp chips"), "fish & chips");
        assert_eq!(strip_tags("&copy 2024 me"), "\u{a9} 2024 me");
    }

    #[test]
    fn numeric_references_use_replacement_table() {
        assert_eq!(strip_tags("&#128; 10"), "\u{20ac} 10");
        assert_eq!(strip_tags("&#x93;quoted&#x94;"), "\u{201c}quoted\u{201d}");
        assert_eq!(strip_tags("a&#0;b"), "a\u{fffd}b");
    }

    #[test]
    fn unknown_entities_stay_literal() {
        assert_eq!(strip_tags("&zzz; &"), "&zzz; &");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(strip_tags("\n  line one\n\n\tline\u{3000}two  "), "line one line two");
    }

    #[test]
    fn keeps_multibyte_text() {
        assert_eq!(strip_tags("<p>今日は<em>晴れ</em>でした。</p>"), "今日は晴れでした。");
    }

    #[test]
    fn empty_input_yields_empty_text() {
        assert_eq!(strip_tags(""), "");
        assert_eq!(strip_tags("<div>  </div>"), "");
    }
}
