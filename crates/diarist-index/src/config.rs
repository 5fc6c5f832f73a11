//! Build configuration.

use std::path::PathBuf;

use diarist_extract::DEFAULT_EXCERPT_CHARS;

/// Site identity strings substituted into the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Site title
    pub title: String,

    /// One-line site description
    pub description: String,

    /// Subtitle shown under the title
    pub subtitle: String,

    /// Site owner
    pub owner: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "日記ブログ — katurin".to_string(),
            description: "日々の記録を綴るシンプルな日記ブログ".to_string(),
            subtitle: "katurin.github.io".to_string(),
            owner: "katurin".to_string(),
        }
    }
}

/// Configuration for building the index page.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding `*.html` posts
    pub posts_dir: PathBuf,

    /// Index template
    pub template_path: PathBuf,

    /// Rendered index page
    pub output_path: PathBuf,

    /// Maximum excerpt length, in characters
    pub excerpt_length: usize,

    /// Site identity
    pub site: SiteConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("posts"),
            template_path: PathBuf::from("build/index_template.html"),
            output_path: PathBuf::from("index.html"),
            excerpt_length: DEFAULT_EXCERPT_CHARS,
            site: SiteConfig::default(),
        }
    }
}
