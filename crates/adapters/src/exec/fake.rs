// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted executor fake for engine and orchestrator tests.

use super::{ExecError, ExecOutcome, ExecRequest, ExecutorAdapter};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// One scripted subprocess result
#[derive(Debug, Clone)]
pub struct FakeOutcome {
    /// Simulated runtime. If this meets or exceeds the request timeout the
    /// fake reports a timeout, like the real adapter would.
    pub delay: Duration,
    pub exit_code: i32,
    pub stdout: String,
}

impl Default for FakeOutcome {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(10),
            exit_code: 0,
            stdout: "done".to_string(),
        }
    }
}

impl FakeOutcome {
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<String, VecDeque<FakeOutcome>>,
    calls: Vec<ExecRequest>,
}

/// Recording fake: scripted outcomes per agent, default success otherwise
#[derive(Clone, Default)]
pub struct FakeExecutorAdapter {
    inner: Arc<Mutex<Inner>>,
}

impl FakeExecutorAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next call from `agent`.
    pub fn script(&self, agent: &str, outcome: FakeOutcome) {
        self.inner
            .lock()
            .scripts
            .entry(agent.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// All requests seen so far, in call order.
    pub fn calls(&self) -> Vec<ExecRequest> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }
}

#[async_trait]
impl ExecutorAdapter for FakeExecutorAdapter {
    async fn run(&self, request: ExecRequest) -> Result<ExecOutcome, ExecError> {
        let outcome = {
            let mut inner = self.inner.lock();
            inner.calls.push(request.clone());
            inner
                .scripts
                .get_mut(&request.agent)
                .and_then(VecDeque::pop_front)
                .unwrap_or_default()
        };

        if outcome.delay >= request.timeout {
            tokio::time::sleep(request.timeout).await;
            return Ok(ExecOutcome {
                exit_code: None,
                stdout: outcome.stdout,
                stderr: String::new(),
                timed_out: true,
            });
        }

        tokio::time::sleep(outcome.delay).await;
        Ok(ExecOutcome {
            exit_code: Some(outcome.exit_code),
            stdout: outcome.stdout,
            stderr: String::new(),
            timed_out: false,
        })
    }
}
