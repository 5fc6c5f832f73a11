//! Index page builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use diarist_extract::{extract_with_limit, PostMetadata};

use crate::config::BuildConfig;
use crate::render::render_index;

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of posts rendered
    pub posts: usize,

    /// Number of post files that could not be read
    pub skipped: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Written index page
    pub output_path: PathBuf,
}

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cannot read template at {path}: {source}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Builds the index page from a posts directory.
pub struct IndexBuilder {
    config: BuildConfig,
}

impl IndexBuilder {
    /// Create a new index builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder runs with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the index page.
    ///
    /// Unreadable posts are skipped with a warning. A missing template or a
    /// failed write aborts the build; the template is read before anything is
    /// written, so a missing template leaves the previous output untouched.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let files = discover_posts(&self.config.posts_dir);
        let posts = collect_posts(&files, self.config.excerpt_length);
        let skipped = files.len() - posts.len();
        let count = posts.len();

        let template =
            fs::read_to_string(&self.config.template_path).map_err(|source| BuildError::Template {
                path: self.config.template_path.clone(),
                source,
            })?;

        let html = render_index(posts, &template, &self.config.site);

        write_atomically(&self.config.output_path, &html).map_err(|source| BuildError::Write {
            path: self.config.output_path.clone(),
            source,
        })?;

        let duration = start.elapsed();

        Ok(BuildResult {
            posts: count,
            skipped,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            output_path: self.config.output_path.clone(),
        })
    }
}

/// Find `*.html` files directly inside `posts_dir`, ordered by filename.
///
/// A missing directory is treated as holding no posts.
pub fn discover_posts(posts_dir: &Path) -> Vec<PathBuf> {
    if !posts_dir.is_dir() {
        tracing::warn!("Posts directory not found: {}", posts_dir.display());
        return Vec::new();
    }

    // Entries that fail to resolve (dangling links) stay in the list so the
    // read step warns about them and counts them as skipped.
    let mut files: Vec<PathBuf> = WalkDir::new(posts_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(e.into_path()),
            Ok(_) => None,
            Err(e) => match e.path() {
                Some(path) => Some(path.to_path_buf()),
                None => {
                    tracing::warn!("Failed to list {}: {}", posts_dir.display(), e);
                    None
                }
            },
        })
        .filter(|path| is_post_file(path))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

/// `*.html` names, excluding hidden files as a shell glob would.
fn is_post_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.starts_with('.') && path.extension().and_then(|e| e.to_str()) == Some("html")
}

/// Read and extract every post, skipping files that cannot be read.
pub fn collect_posts(files: &[PathBuf], excerpt_length: usize) -> Vec<PostMetadata> {
    let mut posts = Vec::with_capacity(files.len());

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                continue;
            }
        };

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        posts.push(extract_with_limit(&content, &filename, excerpt_length));
    }

    posts
}

/// Write `contents` to a sibling temporary file, then rename it over `path`.
fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index.html".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    if let Err(e) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}
