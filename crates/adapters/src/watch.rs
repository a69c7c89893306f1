// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vault file watcher.
//!
//! Bridges the notify callback thread into an async channel. Filtering
//! happens at the source: directory events, non-Markdown files, paths
//! outside the vault, and the orchestrator's own output tree are all
//! dropped before they reach the event loop. No deduplication — a single
//! editor save may surface as several events and the matching layer
//! tolerates that.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::mpsc;
use vo_core::{FileEvent, FileEventKind};

/// Errors from starting the watcher
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },
}

/// Running watcher handle. Dropping it stops the underlying OS watcher.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl VaultWatcher {
    /// Watch `vault_root` recursively. `excluded` paths are vault-relative
    /// directory prefixes whose events are dropped at the source.
    pub fn start(vault_root: &Path, excluded: Vec<PathBuf>) -> Result<Self, WatchError> {
        // Canonicalize so event paths (which the OS reports canonically on
        // some platforms) strip cleanly against the root.
        let root = std::fs::canonicalize(vault_root).unwrap_or_else(|_| vault_root.to_path_buf());
        let (tx, rx) = mpsc::channel(256);

        let callback_root = root.clone();
        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            match res {
                Ok(event) => {
                    let Some(kind) = translate_kind(&event.kind) else {
                        return;
                    };
                    for path in event.paths {
                        if let Some(file_event) =
                            admit_event(&callback_root, &excluded, &path, kind)
                        {
                            if tx.blocking_send(file_event).is_err() {
                                // Receiver gone: the loop is shutting down.
                                return;
                            }
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "vault watcher error"),
            }
        })
        .map_err(|e| WatchError::Watch {
            path: root.clone(),
            source: e,
        })?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::Watch {
                path: root.clone(),
                source: e,
            })?;

        tracing::debug!(root = %root.display(), "vault watcher started");
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Wait up to `timeout` for the next event. `None` on timeout or when
    /// the watcher has stopped.
    pub async fn next(&mut self, timeout: Duration) -> Option<FileEvent> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Drain without waiting. Used during shutdown to discard buffered work.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

fn translate_kind(kind: &notify::EventKind) -> Option<FileEventKind> {
    use notify::EventKind;
    match kind {
        EventKind::Create(_) => Some(FileEventKind::Created),
        EventKind::Modify(_) => Some(FileEventKind::Modified),
        EventKind::Remove(_) => Some(FileEventKind::Deleted),
        _ => None,
    }
}

/// Apply the source-level filters; returns the vault-relative event for
/// paths that survive.
fn admit_event(
    root: &Path,
    excluded: &[PathBuf],
    path: &Path,
    kind: FileEventKind,
) -> Option<FileEvent> {
    let rel = path.strip_prefix(root).ok()?;
    if !rel.extension().is_some_and(|ext| ext == "md") {
        return None;
    }
    if excluded.iter().any(|prefix| rel.starts_with(prefix)) {
        return None;
    }
    // Directories named *.md are unusual but possible; removals cannot be
    // stat'ed, so only live paths get the check.
    if kind != FileEventKind::Deleted {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => return None,
            _ => {}
        }
    }
    Some(FileEvent::new(rel, kind, epoch_ms()))
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
