// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vo-config: vault configuration, frontmatter parsing, and the agent registry

pub mod config;
pub mod frontmatter;
pub mod registry;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod test_support;

pub use config::{
    ConfigError, DefaultsSection, NodeConfig, OrchestratorSection, VaultConfig, CONFIG_FILE_NAME,
};
pub use frontmatter::Frontmatter;
pub use registry::{
    AgentDefinition, AgentRegistry, DuplicateProbe, ExecutorKind, NoDuplicateProbe, PostProcess,
    TriggerEvent,
};
