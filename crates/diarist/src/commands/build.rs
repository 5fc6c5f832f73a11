//! Index build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use diarist_index::IndexBuilder;

use crate::config::load_config;

/// Run the build command.
pub fn run(
    config_path: &Path,
    output: Option<PathBuf>,
    posts: Option<PathBuf>,
    template: Option<PathBuf>,
) -> Result<()> {
    let file_config = load_config(config_path)?;

    let mut config = file_config.build_config();
    if let Some(output) = output {
        config.output_path = output;
    }
    if let Some(posts) = posts {
        config.posts_dir = posts;
    }
    if let Some(template) = template {
        config.template_path = template;
    }

    let result = IndexBuilder::new(config).build()?;

    tracing::info!(
        "Built index from {} posts ({} skipped) in {}ms",
        result.posts,
        result.skipped,
        result.duration_ms
    );
    tracing::info!("Wrote {}", result.output_path.display());

    Ok(())
}
