// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor adapters.
//!
//! An executor is one of the five recognized external CLI programs. The
//! `ExecutorAdapter` trait hides subprocess mechanics from the engine so
//! the dispatch and ledger logic can be tested against a scripted fake.

mod cli;
mod command;

pub use cli::CliExecutorAdapter;
pub use command::{build_command, find_claude_binary, CommandSpec};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeExecutorAdapter, FakeOutcome};

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use vo_config::registry::ExecutorKind;

/// Errors from executor invocation
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("executor not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
}

/// One subprocess invocation
#[derive(Debug, Clone)]
pub struct ExecRequest {
    /// Agent abbreviation, for logging only
    pub agent: String,
    pub executor: ExecutorKind,
    /// Executor-specific options from the agent node
    pub params: HashMap<String, serde_yaml::Value>,
    /// Full prompt payload delivered to the CLI
    pub payload: String,
    /// Hard upper bound on wall-clock runtime
    pub timeout: Duration,
    /// Working directory (the vault root)
    pub cwd: PathBuf,
}

/// Captured result of a finished (or terminated) subprocess
#[derive(Debug, Clone, Default)]
pub struct ExecOutcome {
    /// None when the process was killed by a signal or timed out
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Last `n` lines of combined output, stderr after stdout. Used for
    /// failure summaries.
    pub fn output_tail(&self, n: usize) -> String {
        let combined: Vec<&str> = self
            .stdout
            .lines()
            .chain(self.stderr.lines())
            .collect();
        let start = combined.len().saturating_sub(n);
        combined[start..].join("\n")
    }
}

/// Adapter that runs executor subprocesses
#[async_trait]
pub trait ExecutorAdapter: Clone + Send + Sync + 'static {
    /// Run the CLI to completion, enforcing the request timeout.
    ///
    /// A timeout is not an `Err`: it comes back as an outcome with
    /// `timed_out` set and whatever output was captured before
    /// termination. Errors are reserved for failures to start at all.
    async fn run(&self, request: ExecRequest) -> Result<ExecOutcome, ExecError>;
}
