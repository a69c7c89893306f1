// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the vault file watcher and the executor CLIs

pub mod exec;
pub mod watch;

pub use exec::{
    CliExecutorAdapter, CommandSpec, ExecError, ExecOutcome, ExecRequest, ExecutorAdapter,
};
pub use watch::{VaultWatcher, WatchError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use exec::{FakeExecutorAdapter, FakeOutcome};
