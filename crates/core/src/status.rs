// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task status state machine.
//!
//! Transitions are one-way: QUEUED → IN_PROGRESS → {PROCESSED | FAILED}.
//! A terminal status is never downgraded, including across restarts.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Durable status of one attempted execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "QUEUED")]
    Queued,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "PROCESSED")]
    Processed,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Rejected status transition
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Processed | TaskStatus::Failed)
    }

    /// Check whether moving to `next` respects the one-way state machine.
    pub fn check_transition(self, next: TaskStatus) -> Result<(), TransitionError> {
        let ok = matches!(
            (self, next),
            (TaskStatus::Queued, TaskStatus::InProgress)
                | (TaskStatus::Queued, TaskStatus::Processed)
                | (TaskStatus::Queued, TaskStatus::Failed)
                | (TaskStatus::InProgress, TaskStatus::Processed)
                | (TaskStatus::InProgress, TaskStatus::Failed)
        );
        if ok {
            Ok(())
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "QUEUED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Processed => "PROCESSED",
            TaskStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
