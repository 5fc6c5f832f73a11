//! File watching for rebuilds and live reload.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period used to coalesce bursts of file system events.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A post, the template or the config changed; the index must be rebuilt
    Rebuild(PathBuf),

    /// A stylesheet changed; browsers only need to reload
    Reload(PathBuf),
}

/// The files whose changes matter, and what each change triggers.
#[derive(Debug, Clone)]
pub struct WatchSet {
    posts_dir: PathBuf,
    rebuild_files: Vec<PathBuf>,
    reload_files: Vec<PathBuf>,
}

impl WatchSet {
    /// Create a watch set.
    ///
    /// `rebuild_files` are individual files (template, config) that trigger a
    /// rebuild; `reload_files` only trigger a browser reload.
    pub fn new(posts_dir: &Path, rebuild_files: &[PathBuf], reload_files: &[PathBuf]) -> Self {
        Self {
            posts_dir: normalize(posts_dir),
            rebuild_files: rebuild_files.iter().map(|p| normalize(p)).collect(),
            reload_files: reload_files.iter().map(|p| normalize(p)).collect(),
        }
    }

    /// Decide what a change to `path` triggers, if anything.
    pub fn classify(&self, path: &Path) -> Option<WatchEvent> {
        let path = normalize(path);

        let is_post = path.parent() == Some(self.posts_dir.as_path())
            && path.extension().and_then(|e| e.to_str()) == Some("html");

        if is_post || self.rebuild_files.contains(&path) {
            Some(WatchEvent::Rebuild(path))
        } else if self.reload_files.contains(&path) {
            Some(WatchEvent::Reload(path))
        } else {
            None
        }
    }

    /// Directories that must be watched to observe every file in the set.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots = BTreeSet::new();
        roots.insert(self.posts_dir.clone());
        for file in self.rebuild_files.iter().chain(&self.reload_files) {
            if let Some(parent) = file.parent() {
                roots.insert(parent.to_path_buf());
            }
        }
        roots.into_iter().collect()
    }
}

/// Resolve `path` to an absolute form comparable with watcher event paths,
/// even when the file itself does not exist yet.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize().ok().map(|p| p.join(name)),
        _ => None,
    };
    resolved.unwrap_or(absolute)
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given watch set.
    ///
    /// Returns the watcher and a channel to receive events. Each burst of file
    /// system activity yields at most one event, a rebuild taking precedence
    /// over a reload.
    pub fn new(
        set: WatchSet,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for root in set.watch_roots() {
            if root.is_dir() {
                watcher
                    .watch(&root, RecursiveMode::NonRecursive)
                    .map_err(std::io::Error::other)?;
            } else {
                tracing::warn!("Not watching missing directory: {}", root.display());
            }
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                let mut batch = vec![first];
                while let Ok(next) = sync_rx.recv_timeout(DEBOUNCE) {
                    batch.push(next);
                }

                if let Some(event) = coalesce(&set, &batch) {
                    if async_tx.blocking_send(event).is_err() {
                        break;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Reduce a burst of notify events to the single most significant event.
fn coalesce(set: &WatchSet, batch: &[notify::Event]) -> Option<WatchEvent> {
    let mut reload = None;

    for event in batch {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            continue;
        }
        for path in &event.paths {
            match set.classify(path) {
                Some(rebuild @ WatchEvent::Rebuild(_)) => return Some(rebuild),
                Some(e @ WatchEvent::Reload(_)) => {
                    reload.get_or_insert(e);
                }
                None => {}
            }
        }
    }

    reload
}
