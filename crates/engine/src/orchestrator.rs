// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator core: the event loop and its dispatch policy.
//!
//! Single-flow loop: pop one watcher event (bounded wait), match it, reserve
//! capacity, hand off to a worker. Denied reservations become QUEUED task
//! files; after every pass one queued task at most is re-dispatched, FIFO.
//! Workers run concurrently up to the configured limits and all durable
//! coordination goes through the task ledger on disk.

use crate::runner::Runner;
use crate::slots::SlotController;
use crate::RuntimeError;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use vo_adapters::{ExecutorAdapter, VaultWatcher};
use vo_config::registry::AgentRegistry;
use vo_config::VaultConfig;
use vo_core::{FileEvent, TaskStatus};
use vo_ledger::TaskLedger;

const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// The running engine: registry, ledger, slots, and in-flight workers
pub struct Orchestrator<E: ExecutorAdapter> {
    vault_root: PathBuf,
    registry: Arc<AgentRegistry>,
    ledger: Arc<TaskLedger>,
    slots: Arc<SlotController>,
    runner: Arc<Runner<E>>,
    tasks_dir_rel: PathBuf,
    logs_dir_rel: PathBuf,
    prompts_dir_rel: PathBuf,
    poll_interval: Duration,
    shutdown_grace: Duration,
    workers: JoinSet<TaskStatus>,
}

impl<E: ExecutorAdapter> Orchestrator<E> {
    pub fn new(
        vault_root: &Path,
        config: &VaultConfig,
        registry: AgentRegistry,
        adapter: E,
        max_concurrent_override: Option<u32>,
    ) -> Self {
        let orchestrator = &config.orchestrator;
        let ledger = Arc::new(TaskLedger::new(
            vault_root,
            &orchestrator.tasks_dir,
            &orchestrator.logs_dir,
        ));
        let max_concurrent = max_concurrent_override.unwrap_or(orchestrator.max_concurrent);
        Self {
            vault_root: vault_root.to_path_buf(),
            registry: Arc::new(registry),
            runner: Arc::new(Runner::new(
                vault_root,
                &orchestrator.logs_dir,
                Arc::clone(&ledger),
                adapter,
            )),
            ledger,
            slots: Arc::new(SlotController::new(max_concurrent)),
            tasks_dir_rel: orchestrator.tasks_dir.clone(),
            logs_dir_rel: orchestrator.logs_dir.clone(),
            prompts_dir_rel: orchestrator.prompts_dir.clone(),
            poll_interval: orchestrator.poll_duration(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            workers: JoinSet::new(),
        }
    }

    pub fn ledger(&self) -> &TaskLedger {
        &self.ledger
    }

    pub fn slots(&self) -> &Arc<SlotController> {
        &self.slots
    }

    #[cfg(test)]
    fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Create the output directories, surface stranded work, and log the
    /// loaded catalog.
    pub fn prepare(&self) -> Result<(), RuntimeError> {
        for dir in [&self.tasks_dir_rel, &self.logs_dir_rel] {
            let path = self.vault_root.join(dir);
            std::fs::create_dir_all(&path)
                .map_err(|e| RuntimeError::Prepare { path, source: e })?;
        }

        for stranded in self.ledger.scan_in_progress() {
            tracing::warn!(
                task = %stranded.display(),
                "task was IN_PROGRESS when a previous run stopped; leaving it for the operator"
            );
        }

        tracing::info!(
            vault = %self.vault_root.display(),
            agents = self.registry.len(),
            max_concurrent = self.slots.max_concurrent(),
            "orchestrator ready"
        );
        for agent in self.registry.iter() {
            tracing::info!(
                agent = %agent.abbreviation,
                name = %agent.display_name,
                trigger = %agent.trigger_event,
                glob = agent.trigger_glob.as_deref().unwrap_or("-"),
                executor = %agent.executor,
                "agent registered"
            );
        }
        Ok(())
    }

    /// Start the vault watcher with the orchestrator's own output tree
    /// excluded at the source.
    pub fn start_watcher(&self) -> Result<VaultWatcher, RuntimeError> {
        let excluded = vec![
            self.tasks_dir_rel.clone(),
            self.logs_dir_rel.clone(),
            self.prompts_dir_rel.clone(),
        ];
        Ok(VaultWatcher::start(&self.vault_root, excluded)?)
    }

    /// Run the event loop until `shutdown` resolves, then drain and wait
    /// for in-flight workers within the grace period.
    pub async fn run(
        mut self,
        mut watcher: VaultWatcher,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), RuntimeError> {
        tokio::pin!(shutdown);

        let mut running = true;
        while running {
            tokio::select! {
                _ = &mut shutdown => {
                    running = false;
                }
                maybe_event = watcher.next(self.poll_interval) => {
                    if let Some(event) = maybe_event {
                        self.process_event(event);
                    }
                }
            }
            // Reap finished workers so the set does not grow unbounded.
            while self.workers.try_join_next().is_some() {}
            if running {
                self.process_queued_tasks();
            }
        }

        let dropped = watcher.drain();
        if dropped > 0 {
            tracing::info!(dropped, "discarded buffered events on shutdown");
        }
        drop(watcher);

        tracing::info!(in_flight = self.workers.len(), "shutting down");
        let all_done = tokio::time::timeout(self.shutdown_grace, async {
            while self.workers.join_next().await.is_some() {}
        })
        .await;
        if all_done.is_err() {
            tracing::warn!(
                in_flight = self.workers.len(),
                "shutdown grace expired; interrupted tasks remain IN_PROGRESS on disk"
            );
            self.workers.abort_all();
        }
        Ok(())
    }

    /// Match one event and dispatch or queue every admitted agent.
    pub fn process_event(&mut self, event: FileEvent) {
        let agents = self
            .registry
            .matching(&self.vault_root, &event, self.ledger.as_ref());
        if agents.is_empty() {
            return;
        }

        let mut saturated = false;
        for agent in agents {
            if !saturated {
                if let Some(reservation) =
                    self.slots.reserve(&agent.abbreviation, agent.max_parallel)
                {
                    let execution = self.runner.begin(agent);
                    let runner = Arc::clone(&self.runner);
                    let agent = agent.clone();
                    let event = event.clone();
                    self.workers.spawn(async move {
                        runner.execute(&agent, event, None, execution, reservation).await
                    });
                    continue;
                }
                // Once one reservation is denied, the rest of this pass
                // goes straight to the queue.
                saturated = true;
            }

            match self
                .ledger
                .create(agent, &event, TaskStatus::Queued, None)
            {
                Ok(path) => tracing::info!(
                    agent = %agent.abbreviation,
                    source = %event.path.display(),
                    task = %path.display(),
                    "no capacity, queued"
                ),
                Err(e) => tracing::warn!(
                    agent = %agent.abbreviation,
                    source = %event.path.display(),
                    error = %e,
                    "failed to persist queued task"
                ),
            }
        }
    }

    /// Dispatch at most one queued task, FIFO. Stops at the first denied
    /// reservation and leaves the rest for the next pass.
    pub fn process_queued_tasks(&mut self) {
        for task in self.ledger.scan_queued() {
            let Some(agent) = self.registry.get(&task.task_type) else {
                tracing::warn!(
                    task = %task.path.display(),
                    task_type = %task.task_type,
                    "queued task references an unknown agent, skipping"
                );
                continue;
            };

            let Some(reservation) = self.slots.reserve(&agent.abbreviation, agent.max_parallel)
            else {
                break;
            };

            // One write claims the task: status flip plus the log link.
            let execution = self.runner.begin(agent);
            if let Err(e) = self.ledger.update_status(
                &task.path,
                TaskStatus::InProgress,
                Some("dispatched from queue"),
                Some(&execution.log_filename),
            ) {
                tracing::warn!(task = %task.path.display(), error = %e, "cannot claim queued task");
                drop(reservation);
                continue;
            }

            tracing::info!(
                agent = %agent.abbreviation,
                task = %task.path.display(),
                "dispatching queued task"
            );
            let runner = Arc::clone(&self.runner);
            let agent = agent.clone();
            self.workers.spawn(async move {
                runner
                    .execute(&agent, task.event, Some(task.path), execution, reservation)
                    .await
            });
            // At most one dispatch per pass.
            break;
        }
    }

    /// Wait for every in-flight worker. Used by tests and shutdown.
    pub async fn join_workers(&mut self) -> Vec<TaskStatus> {
        let mut statuses = Vec::new();
        while let Some(result) = self.workers.join_next().await {
            if let Ok(status) = result {
                statuses.push(status);
            }
        }
        statuses
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
