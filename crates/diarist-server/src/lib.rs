//! Development server for diarist.
//!
//! Rebuilds the index page when posts, the template or the config change,
//! serves the site root, and reloads connected browsers over a WebSocket.

pub mod livereload;
pub mod server;
pub mod watcher;

pub use livereload::{ReloadHub, ReloadMessage};
pub use server::{ConfigLoader, DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent, WatchSet};
