//! Configuration file (diarist.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use diarist_index::BuildConfig;
use serde::Deserialize;

/// Configuration file structure. Every key is optional; missing keys keep the
/// built-in defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub dev: DevSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subtitle: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    pub posts: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    pub excerpt_length: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevSection {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Stylesheets that trigger a browser reload when changed
    #[serde(default = "default_styles")]
    pub styles: Vec<PathBuf>,
}

impl Default for DevSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            styles: default_styles(),
        }
    }
}

fn default_port() -> u16 {
    5510
}
fn default_styles() -> Vec<PathBuf> {
    vec![PathBuf::from("style.css")]
}

impl ConfigFile {
    /// Overlay the file's settings onto the built-in build configuration.
    pub fn build_config(&self) -> BuildConfig {
        let mut config = BuildConfig::default();

        if let Some(title) = &self.site.title {
            config.site.title = title.clone();
        }
        if let Some(description) = &self.site.description {
            config.site.description = description.clone();
        }
        if let Some(subtitle) = &self.site.subtitle {
            config.site.subtitle = subtitle.clone();
        }
        if let Some(owner) = &self.site.owner {
            config.site.owner = owner.clone();
        }
        if let Some(posts) = &self.paths.posts {
            config.posts_dir = posts.clone();
        }
        if let Some(template) = &self.paths.template {
            config.template_path = template.clone();
        }
        if let Some(output) = &self.paths.output {
            config.output_path = output.clone();
        }
        if let Some(excerpt_length) = self.build.excerpt_length {
            config.excerpt_length = excerpt_length;
        }

        config
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = load_config(&temp.path().join("diarist.toml")).unwrap();

        assert_eq!(config.dev.port, 5510);
        assert_eq!(config.build_config().excerpt_length, 200);
        assert_eq!(config.build_config().posts_dir, PathBuf::from("posts"));
    }

    #[test]
    fn overlays_present_keys() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("diarist.toml");
        fs::write(
            &path,
            r#"
[site]
title = "Field Notes"

[paths]
output = "public/index.html"

[build]
excerpt_length = 80

[dev]
port = 8080
"#,
        )
        .unwrap();

        let file = load_config(&path).unwrap();
        let config = file.build_config();

        assert_eq!(config.site.title, "Field Notes");
        assert_eq!(config.site.owner, "katurin");
        assert_eq!(config.output_path, PathBuf::from("public/index.html"));
        assert_eq!(config.template_path, PathBuf::from("build/index_template.html"));
        assert_eq!(config.excerpt_length, 80);
        assert_eq!(file.dev.port, 8080);
        assert_eq!(file.dev.styles, vec![PathBuf::from("style.css")]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("diarist.toml");
        fs::write(&path, "[site\ntitle = ").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("diarist.toml");
        fs::write(&path, "[site]\nheadline = \"typo\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }
}
