//! Route source watcher for hot reload.
//!
//! Watches the parent directory and filters events by file name, so a route
//! source replaced by rename (editors, `normalize-routes`) keeps reloading.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_route_source;
use crate::observability::metrics;
use crate::routing::RouteTable;

/// A watcher that rebuilds the route table when the route source changes.
pub struct RouteSourceWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouteTable>,
}

impl RouteSourceWatcher {
    /// Create a new RouteSourceWatcher.
    ///
    /// Returns the watcher and a receiver for validated route tables.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouteTable>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned handle must be kept alive for events to be delivered.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let file_name = self.path.file_name().map(OsStr::to_os_string).unwrap_or_default();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_route_source_event(&event, &file_name) {
                        tracing::info!(path = ?path, "Route source change detected, rebuilding table");
                        match rebuild(&path) {
                            Ok(table) => {
                                metrics::record_route_reload("ok");
                                let _ = tx.send(table);
                            }
                            Err(e) => {
                                metrics::record_route_reload("rejected");
                                tracing::error!(
                                    "Failed to rebuild route table: {}. Keeping current routes.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Route source watcher started");
        Ok(watcher)
    }
}

/// A create or modify event (renames included) touching the route source.
fn is_route_source_event(event: &Event, file_name: &OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}

/// Load and validate a fresh table from the route source.
pub fn rebuild(path: &Path) -> Result<RouteTable, Box<dyn std::error::Error + Send + Sync>> {
    let source = load_route_source(path)?;
    Ok(RouteTable::from_source(&source)?)
}
