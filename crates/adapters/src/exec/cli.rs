// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real executor adapter: spawns the CLI subprocess with piped output and a
//! hard timeout. Termination is two-stage: a graceful signal first, then a
//! forced kill after a short grace period.

use super::command::{build_command, CommandSpec};
use super::{ExecError, ExecOutcome, ExecRequest, ExecutorAdapter};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

const KILL_GRACE: Duration = Duration::from_secs(2);

/// Production adapter running the configured CLI
#[derive(Debug, Clone)]
pub struct CliExecutorAdapter {
    kill_grace: Duration,
}

impl Default for CliExecutorAdapter {
    fn default() -> Self {
        Self {
            kill_grace: KILL_GRACE,
        }
    }
}

impl CliExecutorAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutorAdapter for CliExecutorAdapter {
    async fn run(&self, request: ExecRequest) -> Result<ExecOutcome, ExecError> {
        let spec = build_command(&request)?;
        self.run_spec(spec, &request).await
    }
}

impl CliExecutorAdapter {
    async fn run_spec(
        &self,
        spec: CommandSpec,
        request: &ExecRequest,
    ) -> Result<ExecOutcome, ExecError> {
        let mut cmd = if cfg!(windows) && spec.use_shell {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&spec.program).args(&spec.args);
            c
        } else {
            let mut c = Command::new(&spec.program);
            c.args(&spec.args);
            c
        };
        cmd.current_dir(&request.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecError::NotFound(spec.program.to_string_lossy().into_owned())
            } else {
                ExecError::SpawnFailed(format!("{}: {}", spec.program.display(), e))
            }
        })?;

        tracing::debug!(
            agent = %request.agent,
            program = %spec.program.display(),
            timeout_s = request.timeout.as_secs(),
            "executor spawned"
        );

        // Drain both pipes concurrently so a chatty child never blocks on a
        // full pipe buffer while we wait on it.
        let stdout_task = spawn_reader(child.stdout.take());
        let stderr_task = spawn_reader(child.stderr.take());

        let (exit_code, timed_out) =
            match tokio::time::timeout(request.timeout, child.wait()).await {
                Ok(Ok(status)) => (status.code(), false),
                Ok(Err(e)) => {
                    return Err(ExecError::SpawnFailed(format!(
                        "failed to wait on {}: {}",
                        spec.program.display(),
                        e
                    )))
                }
                Err(_elapsed) => {
                    tracing::warn!(
                        agent = %request.agent,
                        timeout_s = request.timeout.as_secs(),
                        "executor timed out, terminating"
                    );
                    terminate(&mut child, self.kill_grace).await;
                    (None, true)
                }
            };

        // After a kill, grandchildren may still hold the pipes open; bound
        // the drain instead of waiting for their EOF.
        let stdout = collect_output(stdout_task, timed_out).await;
        let stderr = collect_output(stderr_task, timed_out).await;

        Ok(ExecOutcome {
            exit_code,
            stdout,
            stderr,
            timed_out,
        })
    }
}

async fn collect_output(task: tokio::task::JoinHandle<String>, bounded: bool) -> String {
    if bounded {
        match tokio::time::timeout(Duration::from_secs(5), task).await {
            Ok(Ok(text)) => text,
            _ => String::new(),
        }
    } else {
        task.await.unwrap_or_default()
    }
}

fn spawn_reader<R>(source: Option<R>) -> tokio::task::JoinHandle<String>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut source) = source else {
            return String::new();
        };
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf).await;
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Graceful signal, bounded wait, then forced kill.
async fn terminate(child: &mut Child, grace: Duration) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        if tokio::time::timeout(grace, child.wait()).await.is_ok() {
            return;
        }
    }
    #[cfg(not(unix))]
    let _ = grace;
    let _ = child.kill().await;
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
