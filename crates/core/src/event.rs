// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-system events flowing from the vault watcher to the engine.
//!
//! Paths are vault-relative so an event serialized into a queued task file
//! stays valid no matter where the vault is mounted when it is picked up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of change observed on a vault file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileEventKind {
    Created,
    Modified,
    Deleted,
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEventKind::Created => write!(f, "created"),
            FileEventKind::Modified => write!(f, "modified"),
            FileEventKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// A single observed change to a Markdown file under the vault root.
///
/// Serializes to JSON for persistence inside queued task files; the stored
/// form must deserialize back to an equivalent event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    /// Vault-relative path of the affected file
    pub path: PathBuf,
    pub kind: FileEventKind,
    /// Milliseconds since the Unix epoch at observation time
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub is_directory: bool,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>, kind: FileEventKind, timestamp_ms: u64) -> Self {
        Self {
            path: path.into(),
            kind,
            timestamp_ms,
            is_directory: false,
        }
    }

    /// One-line summary for console and process logs.
    pub fn log_summary(&self) -> String {
        format!("{} {}", self.kind, self.path.display())
    }

    /// File name without the `.md` extension, used in task titles.
    pub fn source_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
