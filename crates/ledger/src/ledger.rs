// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task ledger operations: create, update, scan.
//!
//! Every write of an existing file goes through a temp file plus atomic
//! rename so the event loop's scans never observe a torn frontmatter block.
//! Status transitions are validated against the one-way state machine; a
//! terminal status on disk is never downgraded.

use crate::task::{self, TaskFrontmatter, TaskRecord};
use chrono::{Local, SecondsFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vo_config::registry::{AgentDefinition, DuplicateProbe};
use vo_config::frontmatter;
use vo_core::{FileEvent, TaskStatus, TransitionError};

/// Errors from ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("task file {path} has no parseable frontmatter: {reason}")]
    BadFrontmatter { path: PathBuf, reason: String },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// A queued task ready for dispatch
#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub path: PathBuf,
    /// Agent abbreviation
    pub task_type: String,
    pub event: FileEvent,
}

/// File-backed task ledger rooted at the vault's tasks directory
#[derive(Debug, Clone)]
pub struct TaskLedger {
    tasks_dir: PathBuf,
    /// Vault-relative logs directory, used to build execution log links
    logs_dir_rel: PathBuf,
}

impl TaskLedger {
    pub fn new(vault_root: &Path, tasks_dir_rel: &Path, logs_dir_rel: &Path) -> Self {
        Self {
            tasks_dir: vault_root.join(tasks_dir_rel),
            logs_dir_rel: logs_dir_rel.to_path_buf(),
        }
    }

    pub fn tasks_dir(&self) -> &Path {
        &self.tasks_dir
    }

    /// Create a task file for one attempted execution.
    ///
    /// Fails only if the tasks directory is unwritable. A same-day collision
    /// for the same agent and source overwrites the earlier file; this is a
    /// documented limitation.
    pub fn create(
        &self,
        agent: &AgentDefinition,
        event: &FileEvent,
        status: TaskStatus,
        log_filename: Option<&str>,
    ) -> Result<PathBuf, LedgerError> {
        std::fs::create_dir_all(&self.tasks_dir).map_err(|e| LedgerError::Io {
            path: self.tasks_dir.clone(),
            source: e,
        })?;

        let path = self.task_path(&agent.abbreviation, event, Local::now().date_naive());
        if path.exists() {
            tracing::warn!(path = %path.display(), "overwriting existing task file for the same agent, source, and day");
        }

        let created = now_stamp();
        let trigger_data_json = if status == TaskStatus::Queued {
            match serde_json::to_string(event) {
                Ok(json) => Some(json),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize trigger event");
                    None
                }
            }
        } else {
            None
        };

        let frontmatter = TaskFrontmatter {
            title: format!("{} - {}", agent.abbreviation, event.source_stem()),
            created: created.clone(),
            completed: None,
            status,
            worker: agent.executor.as_str().to_string(),
            priority: agent.priority.clone(),
            task_type: agent.abbreviation.clone(),
            trigger_data_json,
            execution_log: log_filename.map(|name| self.log_link(name)),
        };
        let body = task::initial_body(event, &agent.prompt_body, &created, status);
        let text = task::render(&frontmatter, &body)?;

        std::fs::write(&path, text).map_err(|e| LedgerError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Move a task to a new status.
    ///
    /// Terminal statuses set `completed`; an optional message is appended to
    /// the Process Log, and a dispatch can record its execution log link in
    /// the same write. A task file therefore sees at most three writes over
    /// its lifetime: creation, dispatch (QUEUED → IN_PROGRESS), and terminal
    /// status. The write is temp-file + rename so concurrent scans see
    /// either the old or the new file, never a torn one.
    pub fn update_status(
        &self,
        task_path: &Path,
        new_status: TaskStatus,
        message: Option<&str>,
        execution_log: Option<&str>,
    ) -> Result<(), LedgerError> {
        let mut record = self.read_task(task_path)?;
        record.frontmatter.status.check_transition(new_status)?;
        record.frontmatter.status = new_status;
        if new_status.is_terminal() {
            record.frontmatter.completed = Some(now_stamp());
        }
        if let Some(log_filename) = execution_log {
            record.frontmatter.execution_log = Some(self.log_link(log_filename));
        }

        let mut body = task::append_process_entry(
            &record.body,
            &format!("{} status {}", now_stamp(), new_status),
        );
        if let Some(message) = message {
            body = task::append_process_entry(&body, &format!("{} {}", now_stamp(), message));
        }

        self.write_atomic(task_path, &record.frontmatter, &body)
    }

    /// Append a line to a task's Process Log without touching its status.
    pub fn append_process_log(&self, task_path: &Path, message: &str) -> Result<(), LedgerError> {
        let record = self.read_task(task_path)?;
        let body =
            task::append_process_entry(&record.body, &format!("{} {}", now_stamp(), message));
        self.write_atomic(task_path, &record.frontmatter, &body)
    }

    /// Queued tasks in FIFO order (lexicographic by filename, which leads
    /// with the creation date). Every record is re-parsed from disk.
    pub fn scan_queued(&self) -> Vec<QueuedTask> {
        let mut queued = Vec::new();
        for path in self.task_files() {
            let record = match self.read_task(&path) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable task file");
                    continue;
                }
            };
            if record.frontmatter.status != TaskStatus::Queued {
                continue;
            }
            let Some(event) = record.frontmatter.trigger_event() else {
                tracing::warn!(path = %path.display(), "queued task has no usable trigger data, skipping");
                continue;
            };
            queued.push(QueuedTask {
                path,
                task_type: record.frontmatter.task_type,
                event,
            });
        }
        queued
    }

    /// Tasks stranded in IN_PROGRESS, surfaced at startup. The ledger never
    /// resurrects them; that call belongs to the operator.
    pub fn scan_in_progress(&self) -> Vec<PathBuf> {
        self.task_files()
            .into_iter()
            .filter(|path| {
                self.read_task(path)
                    .map(|r| r.frontmatter.status == TaskStatus::InProgress)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Parse one task file.
    pub fn read_task(&self, path: &Path) -> Result<TaskRecord, LedgerError> {
        let text = std::fs::read_to_string(path).map_err(|e| LedgerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let fm = frontmatter::parse(&text);
        if fm.is_empty() {
            return Err(LedgerError::BadFrontmatter {
                path: path.to_path_buf(),
                reason: "no frontmatter block".to_string(),
            });
        }
        let value = serde_yaml::to_value(&fm.fields)?;
        let frontmatter: TaskFrontmatter =
            serde_yaml::from_value(value).map_err(|e| LedgerError::BadFrontmatter {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(TaskRecord {
            path: path.to_path_buf(),
            frontmatter,
            body: fm.body,
        })
    }

    fn task_path(&self, abbreviation: &str, event: &FileEvent, date: chrono::NaiveDate) -> PathBuf {
        self.tasks_dir.join(format!(
            "{} {} - {}.md",
            date.format("%Y-%m-%d"),
            abbreviation,
            event.source_stem(),
        ))
    }

    fn log_link(&self, log_filename: &str) -> String {
        format!(
            "[[{}/{}]]",
            self.logs_dir_rel.to_string_lossy().replace('\\', "/"),
            log_filename
        )
    }

    fn task_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.tasks_dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|x| x == "md"))
            .collect();
        files.sort();
        files
    }

    fn write_atomic(
        &self,
        path: &Path,
        frontmatter: &TaskFrontmatter,
        body: &str,
    ) -> Result<(), LedgerError> {
        let text = task::render(frontmatter, body)?;
        let tmp = path.with_extension("md.tmp");
        std::fs::write(&tmp, text).map_err(|e| LedgerError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, path).map_err(|e| LedgerError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl DuplicateProbe for TaskLedger {
    fn has_task_today(&self, abbreviation: &str, source: &Path) -> bool {
        let event = FileEvent::new(source, vo_core::FileEventKind::Modified, 0);
        let path = self.task_path(abbreviation, &event, Local::now().date_naive());
        match self.read_task(&path) {
            Ok(record) => matches!(
                record.frontmatter.status,
                TaskStatus::InProgress | TaskStatus::Processed
            ),
            Err(_) => false,
        }
    }
}

fn now_stamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
