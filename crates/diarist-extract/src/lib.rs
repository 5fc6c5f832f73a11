//! Metadata extraction for hand-written HTML blog posts.
//!
//! Locates a post's title, publish date and body inside loosely structured
//! markup using ordered pattern matchers, and reduces the body to a plain-text
//! excerpt. Extraction never fails: every rule falls back to the next one.

pub mod attrs;
pub mod body;
pub mod date;
pub mod metadata;
pub mod sanitize;
pub mod title;

pub use date::{sort_key, SENTINEL_DATE};
pub use metadata::{extract, extract_with_limit, make_excerpt, PostMetadata, DEFAULT_EXCERPT_CHARS};
pub use sanitize::strip_tags;
