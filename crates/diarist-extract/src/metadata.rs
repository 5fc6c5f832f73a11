//! Post metadata records.

use serde::Serialize;

use crate::body::select_body;
use crate::date::{resolve_date, sort_key};
use crate::sanitize::strip_tags;
use crate::title::resolve_title;

/// Default excerpt length, in characters.
pub const DEFAULT_EXCERPT_CHARS: usize = 200;

/// Appended to excerpts cut short.
const ELLIPSIS: char = '…';

/// Metadata extracted from one post file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostMetadata {
    /// Display title, plain text (never empty)
    pub title: String,

    /// Display date, `YYYY-MM-DD` or whatever the post declared
    pub date: String,

    /// Plain-text summary of the post body
    pub excerpt: String,

    /// Link to the post, relative to the site root
    pub url: String,

    /// Ordering key derived from `date`
    #[serde(rename = "sortkey")]
    pub sort_key: String,
}

/// Extract metadata from a post using the default excerpt length.
pub fn extract(html: &str, filename: &str) -> PostMetadata {
    extract_with_limit(html, filename, DEFAULT_EXCERPT_CHARS)
}

/// Extract metadata from a post, cutting the excerpt at `max_chars`.
pub fn extract_with_limit(html: &str, filename: &str, max_chars: usize) -> PostMetadata {
    let title = resolve_title(html, filename);
    let date = resolve_date(html, filename);
    let body_text = strip_tags(select_body(html));
    let excerpt = make_excerpt(&body_text, max_chars);
    let sort_key = sort_key(&date);

    tracing::debug!(filename, %title, %date, "extracted post metadata");

    PostMetadata {
        title,
        date,
        excerpt,
        url: format!("posts/{}", filename),
        sort_key,
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with an ellipsis.
pub fn make_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut excerpt = text[..cut].to_string();
            excerpt.push(ELLIPSIS);
            excerpt
        }
        None => text.to_string(),
    }
}
