//! Landing page assembler for diarist.
//!
//! Scans a directory of HTML posts, extracts their metadata and substitutes
//! the rendered post list into an index template.

pub mod builder;
pub mod config;
pub mod render;

pub use builder::{collect_posts, discover_posts, BuildError, BuildResult, IndexBuilder};
pub use config::{BuildConfig, SiteConfig};
pub use render::{escape_html, render_index, sort_posts, substitute, Placeholder};
