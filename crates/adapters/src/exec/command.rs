// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-executor command construction.
//!
//! The prompt payload is always delivered as a single argv entry, never
//! re-quoted through a shell. The one exception is Windows batch shims
//! (`.cmd`/`.bat`), which cannot be exec'd directly and are marked for
//! invocation through `cmd /C`.

use super::{ExecError, ExecRequest};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use vo_config::registry::ExecutorKind;

/// Resolved program plus argv
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Program is a Windows batch file and must run through the shell
    pub use_shell: bool,
}

/// Build the command line for a request.
pub fn build_command(request: &ExecRequest) -> Result<CommandSpec, ExecError> {
    let params = &request.params;
    let spec = match request.executor {
        ExecutorKind::ClaudeCode => {
            let program = find_claude_binary()
                .ok_or_else(|| ExecError::NotFound("claude".to_string()))?;
            CommandSpec {
                use_shell: is_batch_file(&program),
                program,
                args: vec![
                    "--timeout".to_string(),
                    request.timeout.as_secs().to_string(),
                    "--prompt".to_string(),
                    request.payload.clone(),
                ],
            }
        }
        ExecutorKind::GeminiCli => CommandSpec {
            program: PathBuf::from("gemini"),
            args: vec!["--prompt".to_string(), request.payload.clone()],
            use_shell: false,
        },
        ExecutorKind::CodexCli => CommandSpec {
            program: PathBuf::from("codex"),
            args: vec!["--prompt".to_string(), request.payload.clone()],
            use_shell: false,
        },
        ExecutorKind::CursorAgent => {
            let mut args = vec![
                "--print".to_string(),
                "--output-format".to_string(),
                "text".to_string(),
            ];
            if let Some(model) = param_str(params, "model") {
                args.push("--model".to_string());
                args.push(model);
            }
            if param_flag(params, "mcp") {
                args.push("--mcp".to_string());
            }
            if param_flag(params, "browser") {
                args.push("--browser".to_string());
            }
            args.push(request.payload.clone());
            CommandSpec {
                program: PathBuf::from("cursor-agent"),
                args,
                use_shell: false,
            }
        }
        ExecutorKind::ContinueCli => {
            let mut args = vec![
                "--print".to_string(),
                "--format".to_string(),
                "json".to_string(),
            ];
            if let Some(model) = param_str(params, "model") {
                args.push("--model".to_string());
                args.push(model);
            }
            for server in param_list(params, "mcp") {
                args.push("--mcp".to_string());
                args.push(server);
            }
            for rule in param_list(params, "rule") {
                args.push("--rule".to_string());
                args.push(rule);
            }
            if let Some(config) = param_str(params, "config") {
                args.push("--config".to_string());
                args.push(config);
            }
            for flag in ["auto", "readonly", "silent"] {
                if param_flag(params, flag) {
                    args.push(format!("--{flag}"));
                }
            }
            args.push(request.payload.clone());
            CommandSpec {
                program: PathBuf::from("cn"),
                args,
                use_shell: false,
            }
        }
    };
    Ok(spec)
}

/// Locate the Claude-family CLI.
///
/// Search order: the per-user install location, the process `PATH`, then a
/// short list of standard installation directories.
pub fn find_claude_binary() -> Option<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        let local = home.join(".claude/local/claude");
        if local.is_file() {
            return Some(local);
        }
    }

    if let Some(path_var) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path_var) {
            if let Some(hit) = candidate_in(&dir) {
                return Some(hit);
            }
        }
    }

    let standard = [
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/opt/homebrew/bin"),
        dirs::home_dir()
            .map(|h| h.join(".local/bin"))
            .unwrap_or_default(),
    ];
    standard.iter().find_map(|dir| candidate_in(dir))
}

fn candidate_in(dir: &Path) -> Option<PathBuf> {
    let names: &[&str] = if cfg!(windows) {
        &["claude.exe", "claude.cmd", "claude.bat", "claude"]
    } else {
        &["claude"]
    };
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Batch shims cannot be spawned directly on Windows.
pub fn is_batch_file(program: &Path) -> bool {
    program
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            ext == "cmd" || ext == "bat"
        })
        .unwrap_or(false)
}

fn param_str(params: &HashMap<String, Value>, key: &str) -> Option<String> {
    params.get(key)?.as_str().map(str::to_string)
}

fn param_flag(params: &HashMap<String, Value>, key: &str) -> bool {
    params.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn param_list(params: &HashMap<String, Value>, key: &str) -> Vec<String> {
    match params.get(key) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
