//! Development server command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use diarist_server::{ConfigLoader, DevServer, DevServerConfig};

use crate::config::load_config;

/// Run the dev server.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let file_config = load_config(config_path)?;
    let build = file_config.build_config();
    let port = port.unwrap_or(file_config.dev.port);

    // Serve the directory the index is written into, so posts/ and assets
    // resolve next to it.
    let root = build
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    tracing::info!("Starting development server on port {}", port);

    let config = DevServerConfig {
        build,
        root,
        config_file: Some(config_path.to_path_buf()),
        reload_config: Some(config_loader(config_path)),
        styles: file_config.dev.styles,
        port,
        open,
        ..Default::default()
    };

    DevServer::new(config).start().await?;

    Ok(())
}

/// Re-read `diarist.toml` on each rebuild.
fn config_loader(config_path: &Path) -> ConfigLoader {
    let config_path = config_path.to_path_buf();
    Arc::new(move || {
        load_config(&config_path)
            .map(|file| file.build_config())
            .map_err(|e| format!("{:#}", e))
    })
}
