//! Filesystem watch source backed by `notify`.
//!
//! Change notifications are split per path, mapped to [`WatchEvent`]s and
//! pushed into a bounded channel sized by `watch.buffer_size`. When the
//! channel is full the notify callback blocks, so a slow pool throttles the
//! watcher instead of growing memory. Both channels close once the source is
//! dropped.

use crossbeam_channel::Receiver;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

use crate::config::WatchConfig;
use crate::error::WatchError;
use crate::types::WatchEvent;

/// A running directory watcher and the streams it feeds.
pub struct WatchSource {
    root: PathBuf,
    events: Receiver<WatchEvent>,
    errors: Receiver<WatchError>,
    _watcher: RecommendedWatcher,
}

impl WatchSource {
    /// Start watching `dir`.
    pub fn start(dir: &Path, config: &WatchConfig) -> Result<Self, WatchError> {
        let init_err = |message: String| WatchError::Init {
            path: dir.to_path_buf(),
            message,
        };

        let (event_tx, event_rx) = crossbeam_channel::bounded(config.buffer_size);
        let (error_tx, error_rx) = crossbeam_channel::bounded(config.buffer_size);

        let mut watcher = notify::recommended_watcher(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for event in WatchEvent::from_notify(event) {
                        if event_tx.send(event).is_err() {
                            // All receivers are gone; nothing left to feed.
                            return;
                        }
                    }
                }
                Err(e) => {
                    if error_tx.try_send(WatchError::Source(e.to_string())).is_err() {
                        tracing::warn!(error = %e, "dropping watcher error: error queue full");
                    }
                }
            },
        )
        .map_err(|e| init_err(format!("Failed to create file watcher: {e}")))?;

        let mode = if config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(dir, mode)
            .map_err(|e| init_err(e.to_string()))?;

        tracing::info!(path = %dir.display(), recursive = config.recursive, "watching directory");

        Ok(Self {
            root: dir.to_path_buf(),
            events: event_rx,
            errors: error_rx,
            _watcher: watcher,
        })
    }

    /// Directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stream of change events (shared by all consumers).
    pub fn events(&self) -> Receiver<WatchEvent> {
        self.events.clone()
    }

    /// Stream of transient watcher errors.
    pub fn errors(&self) -> Receiver<WatchError> {
        self.errors.clone()
    }
}
