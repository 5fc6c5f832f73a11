//! Metadata inspection command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use diarist_extract::{extract_with_limit, PostMetadata};

use crate::config::load_config;

/// Run the inspect command.
pub fn run(config_path: &Path, files: &[PathBuf]) -> Result<()> {
    let excerpt_length = load_config(config_path)?.build_config().excerpt_length;
    let posts = inspect(files, excerpt_length)?;

    println!("{}", serde_json::to_string_pretty(&posts)?);

    Ok(())
}

/// Extract metadata from each file. Unlike a build, an unreadable file is an
/// error here since it was named explicitly.
fn inspect(files: &[PathBuf], excerpt_length: usize) -> Result<Vec<PostMetadata>> {
    files
        .iter()
        .map(|path| {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(extract_with_limit(&content, &filename, excerpt_length))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn serializes_metadata() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("2024-03-05-hello.html");
        fs::write(&path, "<title>Hello Post</title><body>Hi</body>").unwrap();

        let posts = inspect(&[path], 200).unwrap();
        let json = serde_json::to_value(&posts).unwrap();

        assert_eq!(json[0]["title"], "Hello Post");
        assert_eq!(json[0]["date"], "2024-03-05");
        assert_eq!(json[0]["url"], "posts/2024-03-05-hello.html");
        assert_eq!(json[0]["sortkey"], "2024-03-05T00:00:00");
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let temp = tempdir().unwrap();

        assert!(inspect(&[temp.path().join("missing.html")], 200).is_err());
    }
}
