//! Scaffold a new diary in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing diarist...");

    scaffold(Path::new("."), yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'diarist dev' to start the development server.");

    Ok(())
}

/// Write the starter files under `root`, keeping existing files unless
/// `overwrite` is set.
fn scaffold(root: &Path, overwrite: bool) -> Result<()> {
    let posts_dir = root.join("posts");
    let build_dir = root.join("build");
    fs::create_dir_all(&posts_dir).context("Failed to create posts directory")?;
    fs::create_dir_all(&build_dir).context("Failed to create build directory")?;

    let files = [
        (root.join("diarist.toml"), DEFAULT_CONFIG),
        (build_dir.join("index_template.html"), DEFAULT_TEMPLATE),
        (root.join("style.css"), DEFAULT_STYLE),
        (posts_dir.join("2024-01-01-first-entry.html"), DEFAULT_POST),
    ];

    for (path, contents) in files {
        if path.exists() && !overwrite {
            tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
            continue;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Created {}", path.display());
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# diarist configuration

[site]
title = "My Diary"
description = "A simple diary, one page per day"
subtitle = "diary.example.com"
owner = "me"

[paths]
# Hand-written posts, one HTML file each
posts = "posts"
# Template with {{ posts_block }}, {{ recent_links }} and site placeholders
template = "build/index_template.html"
# Generated landing page
output = "index.html"

[build]
# Excerpt length in characters
excerpt_length = 200

[dev]
port = 5510
styles = ["style.css"]
"#;

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ site_title }}</title>
  <meta name="description" content="{{ site_description }}">
  <link rel="stylesheet" href="style.css">
</head>
<body>
  <header class="site-header">
    <h1 class="site-title">{{ site_title }}</h1>
    <p class="site-sub">{{ site_sub }}</p>
  </header>
  <div class="layout">
    <main class="posts">
{{ posts_block }}
    </main>
    <aside class="sidebar">
      <nav>
        <h2>Recent posts</h2>
        <ul class="recent">
{{ recent_links }}
        </ul>
      </nav>
    </aside>
  </div>
  <footer class="site-footer">&copy; {{ site_owner }}</footer>
</body>
</html>
"#;

const DEFAULT_STYLE: &str = r#"body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; line-height: 1.7; }
.layout { display: flex; gap: 2rem; }
.posts { flex: 1; }
.sidebar { width: 16rem; }
.post { margin-bottom: 2rem; }
.post-date { color: #666; font-size: 0.9rem; }
.post-title { margin: 0.2rem 0; }
"#;

const DEFAULT_POST: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="utf-8">
  <title>First entry</title>
  <link rel="stylesheet" href="../style.css">
</head>
<body>
  <main>
    <article class="post">
      <time class="post-date" datetime="2024-01-01">2024-01-01</time>
      <h1>First entry</h1>
      <p>This is the first page of the diary. Write each entry as its own HTML
      file in posts/, then run <code>diarist build</code>.</p>
    </article>
  </main>
</body>
</html>
"#;
