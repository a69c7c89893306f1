// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine runtime

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while starting or running the engine
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] vo_config::ConfigError),
    #[error(transparent)]
    Watch(#[from] vo_adapters::WatchError),
    #[error("failed to prepare {path}: {source}")]
    Prepare {
        path: PathBuf,
        source: std::io::Error,
    },
}
