// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error wrapper that carries the process exit code to `main`.

use std::fmt;

/// Exit codes: 1 for configuration errors, 2 for unrecoverable runtime
/// errors. Graceful shutdown exits 0 without ever constructing this.
#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    message: String,
}

impl ExitError {
    pub fn new(code: i32, source: impl fmt::Display) -> Self {
        Self {
            code,
            message: source.to_string(),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
