// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution runner: runs one admitted dispatch end to end.
//!
//! Owns the per-execution lifecycle: log file, task file, prompt payload,
//! subprocess invocation, terminal status, and post-processing. The slot
//! reservation passed in is held for the whole run and released by its
//! guard on every exit path.

use crate::slots::SlotReservation;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use vo_adapters::{ExecRequest, ExecutorAdapter};
use vo_config::registry::{AgentDefinition, PostProcess};
use vo_config::frontmatter;
use vo_core::{format_elapsed, ExecutionId, FileEvent, IdGen, TaskStatus, UuidIdGen};
use vo_ledger::TaskLedger;

/// How many trailing output lines go into a failure summary.
const FAILURE_TAIL_LINES: usize = 20;

/// In-memory context for one attempted execution; the task file is its
/// durable projection.
///
/// Minted once per dispatch so the start time recorded in the log header,
/// the log filename's timestamp token, and the dispatch bookkeeping all
/// agree on the same instant.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub id: ExecutionId,
    pub started_at: DateTime<Local>,
    pub log_filename: String,
}

/// Runs executions against the vault
pub struct Runner<E> {
    vault_root: PathBuf,
    logs_dir: PathBuf,
    logs_dir_rel: PathBuf,
    ledger: Arc<TaskLedger>,
    adapter: E,
    ids: UuidIdGen,
}

impl<E: ExecutorAdapter> Runner<E> {
    pub fn new(
        vault_root: &Path,
        logs_dir_rel: &Path,
        ledger: Arc<TaskLedger>,
        adapter: E,
    ) -> Self {
        Self {
            vault_root: vault_root.to_path_buf(),
            logs_dir: vault_root.join(logs_dir_rel),
            logs_dir_rel: logs_dir_rel.to_path_buf(),
            ledger,
            adapter,
            ids: UuidIdGen,
        }
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Mint the context for one dispatch: execution id, start time, and the
    /// log filename rendered from the agent's template. The event loop calls
    /// this before reserving any ledger write so a queued dispatch can record
    /// the log link inside its single QUEUED → IN_PROGRESS update.
    pub fn begin(&self, agent: &AgentDefinition) -> ExecutionContext {
        let id = ExecutionId::new(self.ids.next());
        let started_at = Local::now();
        let log_filename =
            render_log_filename(&agent.log_template, &agent.abbreviation, &id, started_at);
        ExecutionContext {
            id,
            started_at,
            log_filename,
        }
    }

    /// Execute one dispatch to completion and return its terminal status.
    ///
    /// `existing_task` carries the task file of a queued dispatch that the
    /// event loop already moved to IN_PROGRESS (recording the log link in
    /// that same write); when absent a fresh IN_PROGRESS task is created.
    /// Ledger write failures are logged and do not abort the execution.
    pub async fn execute(
        &self,
        agent: &AgentDefinition,
        event: FileEvent,
        existing_task: Option<PathBuf>,
        execution: ExecutionContext,
        reservation: SlotReservation,
    ) -> TaskStatus {
        let _reservation = reservation;
        let started = Instant::now();

        let task_path =
            self.prepare_task(agent, &event, existing_task, &execution.log_filename);

        let payload = self.build_payload(agent, &event);
        let mut log = ExecutionLog::create(&self.logs_dir, &execution.log_filename);
        log.header(&agent.abbreviation, &execution.id, execution.started_at);
        log.section("Prompt", &payload);

        tracing::info!(
            agent = %agent.abbreviation,
            execution = %execution.id,
            source = %event.path.display(),
            log = %self.logs_dir_rel.join(&execution.log_filename).display(),
            "execution started"
        );

        let request = ExecRequest {
            agent: agent.abbreviation.clone(),
            executor: agent.executor,
            params: agent.executor_params.clone(),
            payload,
            timeout: agent.timeout,
            cwd: self.vault_root.clone(),
        };

        let (status, summary) = match self.adapter.run(request).await {
            Err(e) => {
                log.section("Response", &format!("Executor did not start: {e}"));
                (TaskStatus::Failed, Some(e.to_string()))
            }
            Ok(outcome) if outcome.timed_out => {
                let note = format!("timeout after {} s", agent.timeout.as_secs().max(1));
                log.section(
                    "Response",
                    &format!("{}\n{}\n\n[{}]", outcome.stdout, outcome.stderr, note),
                );
                (TaskStatus::Failed, Some(note))
            }
            Ok(outcome) => {
                log.section(
                    "Response",
                    &format!("{}\n{}", outcome.stdout, outcome.stderr),
                );
                if outcome.success() {
                    (TaskStatus::Processed, None)
                } else {
                    let summary = format!(
                        "exit code {}; last output:\n{}",
                        outcome
                            .exit_code
                            .map(|c| c.to_string())
                            .unwrap_or_else(|| "none".to_string()),
                        outcome.output_tail(FAILURE_TAIL_LINES),
                    );
                    (TaskStatus::Failed, Some(summary))
                }
            }
        };

        if let Some(task_path) = &task_path {
            if let Err(e) = self
                .ledger
                .update_status(task_path, status, summary.as_deref(), None)
            {
                tracing::warn!(task = %task_path.display(), error = %e, "failed to record terminal status");
            }
        }

        if status == TaskStatus::Processed && agent.post_process == PostProcess::RemoveTriggerContent
        {
            self.remove_trigger_content(agent, &event, task_path.as_deref());
        }

        tracing::info!(
            agent = %agent.abbreviation,
            execution = %execution.id,
            status = %status,
            elapsed = %format_elapsed(started.elapsed().as_secs()),
            "execution finished"
        );

        status
    }

    /// Create or adopt the task file for this execution.
    ///
    /// An adopted task needs no write here: the event loop's dispatch update
    /// already moved it to IN_PROGRESS and recorded the log link.
    fn prepare_task(
        &self,
        agent: &AgentDefinition,
        event: &FileEvent,
        existing_task: Option<PathBuf>,
        log_filename: &str,
    ) -> Option<PathBuf> {
        match existing_task {
            Some(path) => Some(path),
            None => match self
                .ledger
                .create(agent, event, TaskStatus::InProgress, Some(log_filename))
            {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(agent = %agent.abbreviation, error = %e, "failed to create task file, continuing without one");
                    None
                }
            },
        }
    }

    /// Prompt payload: the agent's prompt followed by a framing block
    /// describing the trigger.
    fn build_payload(&self, agent: &AgentDefinition, event: &FileEvent) -> String {
        let source = self.vault_root.join(&event.path);
        let fm = frontmatter::read_file(&source);
        let snapshot = if fm.is_empty() {
            "(none)".to_string()
        } else {
            serde_yaml::to_string(&fm.fields)
                .unwrap_or_else(|_| "(unavailable)".to_string())
                .trim_end()
                .to_string()
        };

        format!(
            "{}\n\n---\nTrigger:\n- File: {}\n- Event: {}\n- Frontmatter:\n{}\n",
            agent.prompt_body,
            event.path.display(),
            event.kind,
            snapshot,
        )
    }

    /// Strip every content-regex match from the source file. Failures are
    /// logged and never alter the task status.
    fn remove_trigger_content(
        &self,
        agent: &AgentDefinition,
        event: &FileEvent,
        task_path: Option<&Path>,
    ) {
        let Some(regex) = &agent.content_regex else {
            return;
        };
        let source = self.vault_root.join(&event.path);
        let result = std::fs::read_to_string(&source).and_then(|text| {
            let cleaned = regex.replace_all(&text, "");
            std::fs::write(&source, cleaned.as_bytes())
        });
        match result {
            Ok(()) => {
                tracing::debug!(agent = %agent.abbreviation, source = %event.path.display(), "trigger content removed");
            }
            Err(e) => {
                tracing::warn!(agent = %agent.abbreviation, source = %event.path.display(), error = %e, "post-processing failed");
                if let Some(task_path) = task_path {
                    let _ = self
                        .ledger
                        .append_process_log(task_path, &format!("post-processing failed: {e}"));
                }
            }
        }
    }
}

/// Fill the per-agent log filename template from the execution's captured
/// start time.
fn render_log_filename(
    template: &str,
    abbreviation: &str,
    execution_id: &ExecutionId,
    started_at: DateTime<Local>,
) -> String {
    template
        .replace("{timestamp}", &started_at.format("%Y%m%d-%H%M%S").to_string())
        .replace("{agent}", abbreviation)
        .replace("{execution_id}", execution_id.as_str())
}

/// Execution log file with fixed sections, flushed as each lands.
struct ExecutionLog {
    file: Option<std::fs::File>,
    path: PathBuf,
}

impl ExecutionLog {
    fn create(logs_dir: &Path, filename: &str) -> Self {
        let path = logs_dir.join(filename);
        let file = std::fs::create_dir_all(logs_dir)
            .and_then(|()| std::fs::File::create(&path))
            .map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "cannot create execution log");
                e
            })
            .ok();
        Self { file, path }
    }

    fn header(
        &mut self,
        abbreviation: &str,
        execution_id: &ExecutionId,
        started_at: DateTime<Local>,
    ) {
        let text = format!(
            "# Execution {}\n\n- Agent: {}\n- Started: {}\n",
            execution_id,
            abbreviation,
            started_at.to_rfc3339(),
        );
        self.write(&text);
    }

    fn section(&mut self, heading: &str, text: &str) {
        self.write(&format!("\n## {}\n\n{}\n", heading, text.trim_end()));
    }

    fn write(&mut self, text: &str) {
        let Some(file) = &mut self.file else {
            return;
        };
        if let Err(e) = file.write_all(text.as_bytes()).and_then(|()| file.flush()) {
            tracing::warn!(path = %self.path.display(), error = %e, "execution log write failed");
            self.file = None;
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
