//! Routing document watcher for hot reload.
//!
//! Only used with the file source: edits invalidate the cached snapshot so
//! the next request refetches instead of waiting out the TTL.
//!
//! The parent directory is watched, not the file, so the document may be
//! created after startup or replaced by a rename.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use crate::routing::cache::ConfigCache;

/// A watcher that monitors the routing document for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    cache: Arc<ConfigCache>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher bound to the cache it invalidates.
    pub fn new(path: &Path, cache: Arc<ConfigCache>) -> Self {
        Self {
            path: path.to_path_buf(),
            cache,
        }
    }

    /// Directory holding the document; `.` for bare file names.
    fn watch_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let cache = self.cache.clone();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && ours {
                        tracing::info!("Routing document change detected, invalidating cache");
                        cache.invalidate();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        let dir = self.watch_dir();
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Routing document watcher started");
        Ok(watcher)
    }
}
