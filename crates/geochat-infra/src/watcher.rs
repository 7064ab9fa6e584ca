//! Configuration file watcher using the `notify` crate.
//!
//! Provides:
//! - `start_config_watcher()` -- Starts a debounced watcher on the config file
//! - `ConfigWatcherHandle` -- RAII handle that keeps the watcher alive
//!
//! The parent directory is watched rather than the file itself so editors that
//! replace the file on save are still picked up.

use std::path::{Path, PathBuf};
use std::time::Duration;

// Use notify types re-exported through notify-debouncer-mini to avoid version conflicts.
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, DebouncedEvent, Debouncer, new_debouncer};
use tokio::sync::mpsc;

use geochat_types::config::ChatConfig;

use crate::config::load_chat_config_blocking;

/// Errors that can occur while setting up the config watcher.
#[derive(Debug, thiserror::Error)]
pub enum ConfigWatchError {
    #[error("watcher creation failed: {0}")]
    WatcherCreation(String),

    #[error("failed to watch path '{path}': {reason}")]
    WatchPath { path: String, reason: String },
}

/// RAII handle that keeps the config watcher alive.
///
/// When dropped, the watcher is stopped.
pub struct ConfigWatcherHandle {
    _debouncer: Debouncer<RecommendedWatcher>,
    config_path: PathBuf,
}

impl ConfigWatcherHandle {
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl Drop for ConfigWatcherHandle {
    fn drop(&mut self) {
        tracing::debug!(path = %self.config_path.display(), "config watcher dropped");
    }
}

/// Whether any of `events` touches `config_path`.
pub fn touches_config(events: &[DebouncedEvent], config_path: &Path) -> bool {
    let Some(file_name) = config_path.file_name() else {
        return false;
    };
    events
        .iter()
        .any(|event| event.path == config_path || event.path.file_name() == Some(file_name))
}

/// Start watching `config_path` and deliver a freshly loaded `ChatConfig`
/// whenever it changes.
///
/// Returns a `ConfigWatcherHandle` (keep alive to maintain the watch) and the
/// receiving end of the reload channel.
pub fn start_config_watcher(
    config_path: &Path,
    debounce_ms: Option<u64>,
) -> Result<(ConfigWatcherHandle, mpsc::Receiver<ChatConfig>), ConfigWatchError> {
    let debounce_duration = Duration::from_millis(debounce_ms.unwrap_or(500));
    let (tx, rx) = mpsc::channel::<ChatConfig>(8);

    let watched_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let path = config_path.to_path_buf();

    let mut debouncer = new_debouncer(debounce_duration, move |result: DebounceEventResult| {
        match result {
            Ok(events) => {
                if !touches_config(&events, &path) {
                    return;
                }
                tracing::debug!(path = %path.display(), "config file changed");
                let config = load_chat_config_blocking(&path);
                // Only the latest config matters; a full channel already has a reload queued.
                let _ = tx.try_send(config);
            }
            Err(err) => {
                tracing::warn!(error = %err, "config watcher error");
            }
        }
    })
    .map_err(|e| ConfigWatchError::WatcherCreation(e.to_string()))?;

    debouncer
        .watcher()
        .watch(&watched_dir, RecursiveMode::NonRecursive)
        .map_err(|e| ConfigWatchError::WatchPath {
            path: watched_dir.display().to_string(),
            reason: e.to_string(),
        })?;

    tracing::info!(path = %config_path.display(), "config watcher started");

    let handle = ConfigWatcherHandle {
        _debouncer: debouncer,
        config_path: config_path.to_path_buf(),
    };

    Ok((handle, rx))
}
