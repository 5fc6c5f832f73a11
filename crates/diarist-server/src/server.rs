//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use diarist_index::{BuildConfig, BuildResult, IndexBuilder};

use crate::livereload::{client_script, inject_script, ReloadHub, ReloadMessage, SCRIPT_PATH, SOCKET_PATH};
use crate::watcher::{FileWatcher, WatchEvent, WatchSet};

/// Produces a fresh build configuration, or a message describing why it
/// could not be loaded.
pub type ConfigLoader = Arc<dyn Fn() -> Result<BuildConfig, String> + Send + Sync>;

/// Configuration for the development server.
#[derive(Clone)]
pub struct DevServerConfig {
    /// Index build settings
    pub build: BuildConfig,

    /// Directory served as the site root
    pub root: PathBuf,

    /// Config file whose changes trigger a rebuild
    pub config_file: Option<PathBuf>,

    /// Re-reads the build configuration before every rebuild, so edits to
    /// `config_file` take effect. Watched paths stay as they were at startup.
    pub reload_config: Option<ConfigLoader>,

    /// Stylesheets whose changes trigger a browser reload
    pub styles: Vec<PathBuf>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            root: PathBuf::from("."),
            config_file: None,
            reload_config: None,
            styles: vec![PathBuf::from("style.css")],
            port: 5510,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    AddressError(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Build error: {0}")]
    BuildError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Shared server state.
struct ServerState {
    hub: ReloadHub,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Run an initial build, then watch, rebuild and serve until shut down.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::AddressError(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let mut rebuilder = Rebuilder {
            builder: Arc::new(IndexBuilder::new(self.config.build.clone())),
            reload_config: self.config.reload_config.clone(),
        };
        let state = Arc::new(ServerState {
            hub: ReloadHub::new(),
        });

        tracing::info!("Running initial build...");
        report_build(&rebuild(&rebuilder.builder).await);

        let mut rebuild_files = vec![self.config.build.template_path.clone()];
        rebuild_files.extend(self.config.config_file.iter().cloned());
        let set = WatchSet::new(&self.config.build.posts_dir, &rebuild_files, &self.config.styles);

        let (watcher, mut rx) =
            FileWatcher::new(set).map_err(|e| ServerError::WatchError(e.to_string()))?;

        // Events are handled one at a time, so rebuilds never overlap
        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, &mut rebuilder, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = Router::new()
            .route(SOCKET_PATH, get(ws_handler))
            .route(SCRIPT_PATH, get(script_handler))
            .fallback_service(ServeDir::new(&self.config.root))
            .layer(middleware::map_response(inject_reload_script))
            .with_state(state);

        tracing::info!(
            "Serving {} at http://{}",
            self.config.root.display(),
            addr
        );

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Owns the current builder, replacing it when the configuration is reloaded.
struct Rebuilder {
    builder: Arc<IndexBuilder>,
    reload_config: Option<ConfigLoader>,
}

impl Rebuilder {
    /// Reload the configuration if a loader is set, then build.
    async fn run(&mut self) -> Result<BuildResult, ServerError> {
        if let Some(load) = &self.reload_config {
            let config = load().map_err(ServerError::ConfigError)?;
            self.builder = Arc::new(IndexBuilder::new(config));
        }
        rebuild(&self.builder).await
    }
}

/// Run one build off the async runtime.
async fn rebuild(builder: &Arc<IndexBuilder>) -> Result<BuildResult, ServerError> {
    let builder = Arc::clone(builder);
    tokio::task::spawn_blocking(move || builder.build())
        .await
        .map_err(|e| ServerError::BuildError(e.to_string()))?
        .map_err(|e| ServerError::BuildError(e.to_string()))
}

fn report_build(result: &Result<BuildResult, ServerError>) {
    match result {
        Ok(result) => tracing::info!(
            "Wrote {} ({} posts, {} skipped) in {}ms",
            result.output_path.display(),
            result.posts,
            result.skipped,
            result.duration_ms
        ),
        Err(e) => tracing::error!("{}", e),
    }
}

/// Handle file watch events.
async fn handle_watch_event(state: &ServerState, rebuilder: &mut Rebuilder, event: WatchEvent) {
    match event {
        WatchEvent::Rebuild(path) => {
            tracing::info!("Changed: {}", path.display());

            let result = rebuilder.run().await;
            report_build(&result);
            match result {
                Ok(_) => state.hub.send(ReloadMessage::Reload),
                Err(e) => state.hub.send(ReloadMessage::BuildFailed {
                    message: e.to_string(),
                }),
            }
        }

        WatchEvent::Reload(path) => {
            tracing::info!("Changed: {}", path.display());
            state.hub.send(ReloadMessage::Reload);
        }
    }
}

/// Inject the live reload client into successful HTML responses.
async fn inject_reload_script(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"));

    if response.status() != StatusCode::OK || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to buffer response body: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, Body::from(html))
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    // Forward reload messages to the browser
    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the live reload client script.
async fn script_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], client_script())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());

        assert_eq!(server.config.port, 5510);
        assert_eq!(server.config.host, "127.0.0.1");
    }

    #[tokio::test]
    async fn injects_into_html_responses() {
        let mut response = Response::new(Body::from("<html><body>hi</body></html>"));
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from_static("28"));

        let response = inject_reload_script(response).await;

        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains(r#"<script src="/__livereload.js"></script>"#));
        assert!(body.ends_with("</body></html>"));
    }

    #[tokio::test]
    async fn leaves_other_responses_alone() {
        let mut response = Response::new(Body::from("body { color: red }"));
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/css"));

        let response = inject_reload_script(response).await;

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"body { color: red }");
    }

    #[tokio::test]
    async fn rebuild_reports_missing_template() {
        let temp = tempfile::tempdir().unwrap();
        let builder = Arc::new(IndexBuilder::new(BuildConfig {
            posts_dir: temp.path().join("posts"),
            template_path: temp.path().join("missing.html"),
            output_path: temp.path().join("index.html"),
            ..Default::default()
        }));

        let result = rebuild(&builder).await;

        assert!(matches!(result, Err(ServerError::BuildError(_))));
        assert!(!temp.path().join("index.html").exists());
    }

    #[tokio::test]
    async fn failed_rebuild_is_broadcast() {
        let temp = tempfile::tempdir().unwrap();
        let mut rebuilder = Rebuilder {
            builder: Arc::new(IndexBuilder::new(BuildConfig {
                posts_dir: temp.path().join("posts"),
                template_path: temp.path().join("missing.html"),
                output_path: temp.path().join("index.html"),
                ..Default::default()
            })),
            reload_config: None,
        };
        let state = ServerState {
            hub: ReloadHub::new(),
        };
        let mut rx = state.hub.subscribe();

        handle_watch_event(&state, &mut rebuilder, WatchEvent::Rebuild(temp.path().join("x.html"))).await;

        assert!(matches!(rx.try_recv(), Ok(ReloadMessage::BuildFailed { .. })));
    }

    /// A loader that takes the site title from a plain file, failing when the
    /// file is empty.
    fn title_loader(dir: &std::path::Path) -> ConfigLoader {
        let dir = dir.to_path_buf();
        Arc::new(move || {
            let title = std::fs::read_to_string(dir.join("title.txt")).map_err(|e| e.to_string())?;
            if title.trim().is_empty() {
                return Err("empty title".to_string());
            }
            let mut config = BuildConfig {
                posts_dir: dir.join("posts"),
                template_path: dir.join("template.html"),
                output_path: dir.join("index.html"),
                ..Default::default()
            };
            config.site.title = title.trim().to_string();
            Ok(config)
        })
    }

    #[tokio::test]
    async fn config_changes_apply_on_rebuild() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("template.html"), "<h1>{{ site_title }}</h1>").unwrap();
        std::fs::write(temp.path().join("title.txt"), "Old Title").unwrap();
        let load = title_loader(temp.path());
        let mut rebuilder = Rebuilder {
            builder: Arc::new(IndexBuilder::new(load().unwrap())),
            reload_config: Some(load),
        };
        let state = ServerState {
            hub: ReloadHub::new(),
        };
        let mut rx = state.hub.subscribe();
        rebuild(&rebuilder.builder).await.unwrap();

        std::fs::write(temp.path().join("title.txt"), "New Title").unwrap();
        handle_watch_event(&state, &mut rebuilder, WatchEvent::Rebuild(temp.path().join("title.txt"))).await;

        let html = std::fs::read_to_string(temp.path().join("index.html")).unwrap();
        assert_eq!(html, "<h1>New Title</h1>");
        assert!(matches!(rx.try_recv(), Ok(ReloadMessage::Reload)));
    }

    #[tokio::test]
    async fn bad_config_is_broadcast_and_keeps_output() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("template.html"), "<h1>{{ site_title }}</h1>").unwrap();
        std::fs::write(temp.path().join("title.txt"), "Old Title").unwrap();
        let load = title_loader(temp.path());
        let mut rebuilder = Rebuilder {
            builder: Arc::new(IndexBuilder::new(load().unwrap())),
            reload_config: Some(load),
        };
        let state = ServerState {
            hub: ReloadHub::new(),
        };
        let mut rx = state.hub.subscribe();
        rebuild(&rebuilder.builder).await.unwrap();

        std::fs::write(temp.path().join("title.txt"), "").unwrap();
        handle_watch_event(&state, &mut rebuilder, WatchEvent::Rebuild(temp.path().join("title.txt"))).await;

        match rx.try_recv() {
            Ok(ReloadMessage::BuildFailed { message }) => assert!(message.contains("empty title")),
            other => panic!("unexpected message: {:?}", other),
        }
        let html = std::fs::read_to_string(temp.path().join("index.html")).unwrap();
        assert_eq!(html, "<h1>Old Title</h1>");
    }
}
