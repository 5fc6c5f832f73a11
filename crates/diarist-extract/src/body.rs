//! Post body selection.
//!
//! Exactly one container is chosen as the excerpt source; later candidates are
//! only consulted when earlier ones are absent.

use regex::Regex;
use std::sync::LazyLock;

use crate::attrs::open_tags;

static ARTICLE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<article\b([^>]*)>").expect("Invalid article regex"));

static ARTICLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</article\s*>").expect("Invalid article close regex"));

static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<article\b[^>]*>.*?</article\s*>").expect("Invalid article block regex")
});

static MAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<main\b[^>]*>.*?</main\s*>").expect("Invalid main regex")
});

static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body\b[^>]*>.*?</body\s*>").expect("Invalid body regex")
});

/// Body matchers in priority order.
pub const BODY_MATCHERS: &[fn(&str) -> Option<&str>] = &[post_article, main_content, body_element];

/// Select the markup an excerpt is taken from.
pub fn select_body(html: &str) -> &str {
    BODY_MATCHERS
        .iter()
        .find_map(|matcher| matcher(html))
        .unwrap_or(html)
}

/// The first `<article>` whose class mentions `post`, tags included.
pub fn post_article(html: &str) -> Option<&str> {
    let open = open_tags(&ARTICLE_OPEN_RE, html)
        .find(|tag| tag.attr("class").is_some_and(|class| class.contains("post")))?;
    let close = ARTICLE_CLOSE_RE.find_at(html, open.end)?;

    Some(&html[open.start..close.end()])
}

/// The first `<main>`, narrowed to its first nested `<article>` if it has one.
pub fn main_content(html: &str) -> Option<&str> {
    let main = MAIN_RE.find(html)?.as_str();

    Some(ARTICLE_RE.find(main).map_or(main, |article| article.as_str()))
}

/// The `<body>` element.
pub fn body_element(html: &str) -> Option<&str> {
    BODY_RE.find(html).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_post_article() {
        let html = r#"<body><main><article class="post entry"><p>Post</p></article></main></body>"#;

        assert_eq!(select_body(html), r#"<article class="post entry"><p>Post</p></article>"#);
    }

    #[test]
    fn post_class_is_a_substring_match() {
        let html = r#"<article class="teaser"><p>no</p></article><article class='post-body'><p>yes</p></article>"#;

        assert_eq!(post_article(html), Some("<article class='post-body'><p>yes</p></article>"));
    }

    #[test]
    fn ignores_post_outside_class() {
        let html = r#"<article id="post-1"><p>x</p></article>"#;

        assert_eq!(post_article(html), None);
    }

    #[test]
    fn unclosed_post_article_is_skipped() {
        let html = r#"<article class="post"><p>never closed</p><main><p>Main</p></main>"#;

        assert_eq!(select_body(html), "<main><p>Main</p></main>");
    }

    #[test]
    fn narrows_main_to_nested_article() {
        let html = "<main><nav>menu</nav><article><p>Story</p></article></main>";

        assert_eq!(select_body(html), "<article><p>Story</p></article>");
    }

    #[test]
    fn uses_whole_main_without_article() {
        let html = "<header>h</header><main><p>Only main</p></main>";

        assert_eq!(select_body(html), "<main><p>Only main</p></main>");
    }

    #[test]
    fn falls_back_to_body_then_document() {
        let body = "<html><body class=\"x\"><p>Body</p></body></html>";
        let bare = "<p>Fragment</p>";

        assert_eq!(select_body(body), "<body class=\"x\"><p>Body</p></body>");
        assert_eq!(select_body(bare), bare);
    }
}
