//! Configuration file watcher for hot reload.
//!
//! # Responsibilities
//! - Detect writes to the config file, including editors that replace it
//! - Reload and validate the file, forwarding only accepted configs
//!
//! # Design Decisions
//! - Watches the parent directory and filters by file name, so an atomic
//!   rename over the config file is still seen
//! - A reload whose text equals the last accepted text is dropped
//! - Invalid files are logged and counted; the receiver never sees them

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::RouterConfig;
use crate::observability::metrics;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        // Seeded with the current text so the first no-op save is ignored.
        let last_text = Mutex::new(std::fs::read_to_string(&path).ok());
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, &watched) => {
                    reload(&watched, &last_text, &update_tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Returns true if the event writes or replaces `path`.
fn touches(event: &Event, path: &Path) -> bool {
    let writes = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_));
    writes
        && event
            .paths
            .iter()
            .any(|changed| changed.file_name() == path.file_name())
}

fn reload(
    path: &Path,
    last_text: &Mutex<Option<String>>,
    tx: &mpsc::UnboundedSender<RouterConfig>,
) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            metrics::record_reload("invalid");
            tracing::error!(path = ?path, error = %e, "Failed to read config, keeping current route table");
            return;
        }
    };

    let mut last = last_text.lock().unwrap_or_else(|e| e.into_inner());
    if last.as_deref() == Some(text.as_str()) {
        tracing::debug!(path = ?path, "Config unchanged, skipping reload");
        return;
    }

    match parse_config(&text) {
        Ok(config) => {
            tracing::info!(
                path = ?path,
                entry_points = config.entry_points.len(),
                "Config file change detected, reloading"
            );
            *last = Some(text);
            let _ = tx.send(config);
        }
        Err(e) => {
            metrics::record_reload("invalid");
            tracing::error!(path = ?path, error = %e, "Failed to reload config, keeping current route table");
        }
    }
}
