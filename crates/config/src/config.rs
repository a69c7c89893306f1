// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orchestrator.yaml` loading and the defaults cascade.
//!
//! Three sections: `orchestrator` (runtime settings), `defaults` (fallback
//! values for agent fields), and `nodes` (the agent catalog). A missing file
//! is not an error — the orchestrator runs with an empty catalog. Broken
//! YAML is fatal at startup.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file name, resolved relative to the vault root.
pub const CONFIG_FILE_NAME: &str = "orchestrator.yaml";

/// Errors from configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

/// Runtime settings from the `orchestrator` section
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSection {
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,
    #[serde(default = "default_tasks_dir")]
    pub tasks_dir: PathBuf,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: f64,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            prompts_dir: default_prompts_dir(),
            tasks_dir: default_tasks_dir(),
            logs_dir: default_logs_dir(),
            max_concurrent: default_max_concurrent(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl OrchestratorSection {
    /// Bounded wait used by the event loop between queue polls.
    pub fn poll_duration(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval.max(0.05))
    }
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("_Settings_/Prompts")
}

fn default_tasks_dir() -> PathBuf {
    PathBuf::from("_Settings_/Tasks")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("_Settings_/Logs")
}

fn default_max_concurrent() -> u32 {
    3
}

fn default_poll_interval() -> f64 {
    1.0
}

/// Fallback values applied to agent nodes that omit a field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub executor: Option<String>,
    #[serde(default)]
    pub timeout_minutes: Option<f64>,
    #[serde(default)]
    pub max_parallel: Option<u32>,
    #[serde(default)]
    pub task_priority: Option<String>,
}

/// One entry of the `nodes` list.
///
/// Only `type: agent` nodes become agents; other types are skipped with a
/// warning. Unknown keys are ignored so vault configs can carry forward
/// fields this version does not act on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeConfig {
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    /// One or many vault-relative directories. Only the first entry derives
    /// the trigger; the rest are stored for forward compatibility.
    #[serde(default, deserialize_with = "one_or_many")]
    pub input_path: Vec<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    /// Verbatim trigger glob override
    #[serde(default)]
    pub input_pattern: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    /// `|`-separated exclusion globs
    #[serde(default)]
    pub exclude_pattern: Option<String>,
    #[serde(default)]
    pub content_pattern: Option<String>,
    #[serde(default)]
    pub executor: Option<String>,
    #[serde(default)]
    pub executor_params: HashMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub max_parallel: Option<u32>,
    #[serde(default)]
    pub timeout_minutes: Option<f64>,
    #[serde(default)]
    pub post_process: Option<String>,
    #[serde(default)]
    pub log_filename: Option<String>,
    #[serde(default)]
    pub task_priority: Option<String>,
    /// Accepted and stored, never evaluated
    #[serde(default)]
    pub cron: Option<String>,
    // Reserved surface: accepted so configs stay loadable, no behavior yet.
    #[serde(default)]
    pub skills: Option<serde_yaml::Value>,
    #[serde(default)]
    pub mcp: Option<serde_yaml::Value>,
}

/// Accept a string, a list of strings, or null.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        One(String),
        Many(Vec<String>),
    }

    match Option::<Helper>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(Helper::One(s)) => Ok(vec![s]),
        Some(Helper::Many(v)) => Ok(v),
    }
}

/// Load `orchestrator.yaml` from the vault root.
///
/// Missing file → default (empty) config with a warning. Unreadable file or
/// invalid YAML → error; the caller treats this as fatal.
pub fn load(vault_root: &Path) -> Result<VaultConfig, ConfigError> {
    let path = vault_root.join(CONFIG_FILE_NAME);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no orchestrator.yaml found, running with an empty agent catalog");
            return Ok(VaultConfig::default());
        }
        Err(e) => return Err(ConfigError::Read { path, source: e }),
    };
    serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse { path, source: e })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
