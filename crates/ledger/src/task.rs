// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk task file format: frontmatter schema and body sections.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vo_core::{FileEvent, TaskStatus};

/// Frontmatter of a task file. Field order is the on-disk order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFrontmatter {
    pub title: String,
    /// ISO-8601 local timestamp at creation
    pub created: String,
    /// Set only when the task reaches a terminal status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    pub status: TaskStatus,
    /// Executor identifier that runs (or will run) this task
    pub worker: String,
    pub priority: String,
    /// Agent abbreviation
    pub task_type: String,
    /// JSON of the originating event; written for queued tasks so they can
    /// be dispatched after a restart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_data_json: Option<String>,
    /// Wiki link to the execution log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_log: Option<String>,
}

impl TaskFrontmatter {
    /// Recover the originating event from `trigger_data_json`.
    pub fn trigger_event(&self) -> Option<FileEvent> {
        let json = self.trigger_data_json.as_deref()?;
        match serde_json::from_str(json) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(task_type = %self.task_type, error = %e, "unreadable trigger data");
                None
            }
        }
    }
}

/// A task file parsed back from disk
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub path: PathBuf,
    pub frontmatter: TaskFrontmatter,
    pub body: String,
}

/// Render the full task file: frontmatter block plus body sections.
pub fn render(frontmatter: &TaskFrontmatter, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    Ok(format!("---\n{}---\n{}", yaml, body))
}

/// Build the initial body for a freshly created task.
///
/// Sections, in order: Input (wiki link + event description), Output,
/// Instructions (verbatim prompt), Process Log (append-only), Evaluation
/// Log (reserved).
pub fn initial_body(event: &FileEvent, prompt_body: &str, created: &str, status: TaskStatus) -> String {
    format!(
        "\n## Input\n\n[[{}]]\n\nTriggered by: {}\n\n## Output\n\n_Pending._\n\n## Instructions\n\n{}\n\n## Process Log\n\n- {} created as {}\n\n## Evaluation Log\n",
        wiki_target(&event.path),
        event.log_summary(),
        prompt_body,
        created,
        status,
    )
}

/// Append one entry to the Process Log section, keeping everything after the
/// Evaluation Log heading intact.
pub fn append_process_entry(body: &str, entry: &str) -> String {
    const EVAL_HEADING: &str = "## Evaluation Log";
    match body.find(EVAL_HEADING) {
        Some(pos) => {
            let (head, tail) = body.split_at(pos);
            format!("{}- {}\n\n{}", head, entry, tail)
        }
        None => format!("{}\n- {}\n", body.trim_end_matches('\n'), entry),
    }
}

/// Wiki-link target for a vault-relative path: the path without its `.md`
/// extension, forward slashes.
fn wiki_target(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    s.strip_suffix(".md").map(str::to_string).unwrap_or(s)
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
