// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry: catalog loading and event matching.
//!
//! Each `type: agent` node is resolved against a prompt file in the prompts
//! directory and the defaults cascade (node value > `defaults` section >
//! built-in). Nodes that cannot be resolved are skipped with a warning so a
//! single bad entry never takes the orchestrator down.

use crate::config::{DefaultsSection, NodeConfig, VaultConfig};
use crate::frontmatter;
use glob::{MatchOptions, Pattern};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use vo_core::{FileEvent, FileEventKind};

/// Event class an agent listens for, derived from the node's `input_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Created,
    Modified,
    /// Accepted in config, never dispatched from file events
    Scheduled,
    Manual,
}

impl TriggerEvent {
    fn from_input_type(input_type: Option<&str>) -> Option<Self> {
        match input_type {
            None => Some(TriggerEvent::Manual),
            Some("new_file") => Some(TriggerEvent::Created),
            Some("updated_file") => Some(TriggerEvent::Modified),
            Some("daily_file") => Some(TriggerEvent::Scheduled),
            Some(_) => None,
        }
    }

    fn matches_kind(self, kind: FileEventKind) -> bool {
        matches!(
            (self, kind),
            (TriggerEvent::Created, FileEventKind::Created)
                | (TriggerEvent::Modified, FileEventKind::Modified)
        )
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::Created => write!(f, "created"),
            TriggerEvent::Modified => write!(f, "modified"),
            TriggerEvent::Scheduled => write!(f, "scheduled"),
            TriggerEvent::Manual => write!(f, "manual"),
        }
    }
}

/// The five recognized external CLI executors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    ClaudeCode,
    GeminiCli,
    CodexCli,
    CursorAgent,
    ContinueCli,
}

impl ExecutorKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "claude_code" => Some(ExecutorKind::ClaudeCode),
            "gemini_cli" => Some(ExecutorKind::GeminiCli),
            "codex_cli" => Some(ExecutorKind::CodexCli),
            "cursor_agent" => Some(ExecutorKind::CursorAgent),
            "continue_cli" => Some(ExecutorKind::ContinueCli),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutorKind::ClaudeCode => "claude_code",
            ExecutorKind::GeminiCli => "gemini_cli",
            ExecutorKind::CodexCli => "codex_cli",
            ExecutorKind::CursorAgent => "cursor_agent",
            ExecutorKind::ContinueCli => "continue_cli",
        }
    }
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source-file mutation applied after a successful execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostProcess {
    #[default]
    None,
    RemoveTriggerContent,
}

/// Suppression check for content-triggered agents: is there already a task
/// for this `{agent, source}` pair created today that is in progress or
/// done? Implemented over the task ledger; the registry stays free of task
/// I/O.
pub trait DuplicateProbe {
    fn has_task_today(&self, abbreviation: &str, source: &Path) -> bool;
}

/// Probe that never suppresses. Used where no ledger exists (status command,
/// registry-only tests).
pub struct NoDuplicateProbe;

impl DuplicateProbe for NoDuplicateProbe {
    fn has_task_today(&self, _abbreviation: &str, _source: &Path) -> bool {
        false
    }
}

/// Immutable definition of one agent, fully resolved at load time
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    /// 2–5 uppercase letters/digits, unique per vault
    pub abbreviation: String,
    pub display_name: String,
    pub category: String,
    /// Verbatim Markdown passed to the executor
    pub prompt_body: String,
    /// Ordered vault-relative directories. Only the first derives the
    /// trigger glob; the list is kept whole for forward compatibility.
    pub input_paths: Vec<String>,
    /// None when `input_paths` is empty — the agent is manual-only
    pub trigger_glob: Option<String>,
    pub trigger_event: TriggerEvent,
    pub exclude_globs: Vec<String>,
    pub content_regex: Option<Regex>,
    pub executor: ExecutorKind,
    pub executor_params: HashMap<String, serde_yaml::Value>,
    pub max_parallel: u32,
    pub timeout: Duration,
    pub post_process: PostProcess,
    pub log_template: String,
    pub priority: String,
    /// Stored verbatim, never evaluated
    pub cron: Option<String>,

    pub(crate) trigger_pattern: Option<Pattern>,
    pub(crate) exclude_patterns: Vec<Pattern>,
}

impl AgentDefinition {
    /// Whether the definition can be triggered by file events at all.
    pub fn is_watchable(&self) -> bool {
        self.trigger_pattern.is_some()
            && matches!(
                self.trigger_event,
                TriggerEvent::Created | TriggerEvent::Modified
            )
    }
}

/// Ordered collection of loaded agents
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: Vec<AgentDefinition>,
}

// Trigger globs: `*` stays within one path component, `**` spans components.
const TRIGGER_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

// Exclude globs intentionally let `*` cross separators so patterns like
// `*-EIC*` hit anywhere in the path.
const EXCLUDE_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

impl AgentRegistry {
    /// Build the registry from loaded config. Per-node failures warn and
    /// skip; they never abort the load.
    pub fn load(config: &VaultConfig, vault_root: &Path) -> Self {
        let prompts_dir = vault_root.join(&config.orchestrator.prompts_dir);
        let mut agents: Vec<AgentDefinition> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for node in &config.nodes {
            if node.node_type != "agent" {
                tracing::warn!(node_type = %node.node_type, name = %node.name, "skipping unknown node type");
                continue;
            }
            match build_agent(node, &config.defaults, &prompts_dir) {
                Some(agent) => {
                    if !seen.insert(agent.abbreviation.clone()) {
                        tracing::warn!(
                            abbreviation = %agent.abbreviation,
                            name = %node.name,
                            "duplicate abbreviation, skipping node"
                        );
                        continue;
                    }
                    tracing::debug!(
                        abbreviation = %agent.abbreviation,
                        trigger = %agent.trigger_event,
                        glob = agent.trigger_glob.as_deref().unwrap_or("-"),
                        "agent loaded"
                    );
                    agents.push(agent);
                }
                None => continue,
            }
        }

        Self { agents }
    }

    /// Build a registry straight from definitions, keeping their order.
    pub fn from_definitions(agents: Vec<AgentDefinition>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentDefinition> {
        self.agents.iter()
    }

    pub fn get(&self, abbreviation: &str) -> Option<&AgentDefinition> {
        self.agents
            .iter()
            .find(|a| a.abbreviation == abbreviation)
    }

    /// Return the agents admitting this event, in registration order.
    ///
    /// The checks short-circuit: watchable, event kind, trigger glob,
    /// exclusions, then (only if configured) content regex plus the
    /// same-day duplicate suppression. A file that fails the glob is never
    /// read for content.
    pub fn matching<'a>(
        &'a self,
        vault_root: &Path,
        event: &FileEvent,
        probe: &dyn DuplicateProbe,
    ) -> Vec<&'a AgentDefinition> {
        if event.is_directory {
            return Vec::new();
        }

        let mut matches = Vec::new();
        let mut content: Option<Option<String>> = None;

        for agent in &self.agents {
            if !agent.is_watchable() {
                continue;
            }
            if !agent.trigger_event.matches_kind(event.kind) {
                continue;
            }
            let path_str = event.path.to_string_lossy();
            let Some(pattern) = &agent.trigger_pattern else {
                continue;
            };
            if !pattern.matches_with(&path_str, TRIGGER_MATCH) {
                continue;
            }
            if agent
                .exclude_patterns
                .iter()
                .any(|p| p.matches_with(&path_str, EXCLUDE_MATCH))
            {
                continue;
            }
            if let Some(regex) = &agent.content_regex {
                // Read at most once per event, shared across agents.
                let text = content.get_or_insert_with(|| {
                    let abs = vault_root.join(&event.path);
                    match std::fs::read_to_string(&abs) {
                        Ok(t) => Some(t),
                        Err(e) => {
                            tracing::warn!(path = %abs.display(), error = %e, "cannot read file for content match");
                            None
                        }
                    }
                });
                let Some(text) = text.as_deref() else {
                    continue;
                };
                if !regex.is_match(text) {
                    continue;
                }
                if probe.has_task_today(&agent.abbreviation, &event.path) {
                    tracing::debug!(
                        abbreviation = %agent.abbreviation,
                        path = %event.path.display(),
                        "suppressing re-trigger, task already exists today"
                    );
                    continue;
                }
            }
            matches.push(agent);
        }

        matches
    }
}

/// Pull the final parenthesized all-caps token out of a node name:
/// `"Enrich Ingested Content (EIC)"` → `EIC`.
fn extract_abbreviation(name: &str) -> Option<String> {
    let trimmed = name.trim().strip_suffix(')')?;
    let open = trimmed.rfind('(')?;
    let abbr = &trimmed[open + 1..];
    let valid_len = (2..=5).contains(&abbr.len());
    let valid_chars = abbr
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    (valid_len && valid_chars).then(|| abbr.to_string())
}

/// Find the prompt file whose name contains `({ABBR})`, lexicographically
/// first on ties.
fn find_prompt_file(prompts_dir: &Path, abbreviation: &str) -> Option<std::path::PathBuf> {
    let needle = format!("({})", abbreviation);
    let mut candidates: Vec<_> = std::fs::read_dir(prompts_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().is_some_and(|x| x == "md")
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().contains(&needle))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn build_agent(
    node: &NodeConfig,
    defaults: &DefaultsSection,
    prompts_dir: &Path,
) -> Option<AgentDefinition> {
    let Some(abbreviation) = extract_abbreviation(&node.name) else {
        tracing::warn!(name = %node.name, "agent node has no (ABBR) suffix, skipping");
        return None;
    };

    let Some(prompt_path) = find_prompt_file(prompts_dir, &abbreviation) else {
        tracing::warn!(
            abbreviation = %abbreviation,
            prompts_dir = %prompts_dir.display(),
            "no prompt file found, skipping agent"
        );
        return None;
    };
    let prompt = frontmatter::read_file(&prompt_path);
    let category = prompt.get_str("category").unwrap_or_default();

    let Some(trigger_event) = TriggerEvent::from_input_type(node.input_type.as_deref()) else {
        tracing::warn!(
            abbreviation = %abbreviation,
            input_type = node.input_type.as_deref().unwrap_or(""),
            "unrecognized input_type, skipping agent"
        );
        return None;
    };

    let input_paths: Vec<String> = node
        .input_path
        .iter()
        .map(|p| p.trim_end_matches('/').to_string())
        .filter(|p| !p.is_empty())
        .collect();

    let trigger_glob = match &node.input_pattern {
        Some(pattern) => Some(pattern.clone()),
        None => input_paths.first().map(|dir| format!("{}/*.md", dir)),
    };
    let trigger_pattern = match &trigger_glob {
        Some(g) => match Pattern::new(g) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(abbreviation = %abbreviation, glob = %g, error = %e, "invalid trigger glob, skipping agent");
                return None;
            }
        },
        None => None,
    };

    let exclude_globs: Vec<String> = node
        .exclude_pattern
        .as_deref()
        .unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let mut exclude_patterns = Vec::with_capacity(exclude_globs.len());
    for g in &exclude_globs {
        match Pattern::new(g) {
            Ok(p) => exclude_patterns.push(p),
            Err(e) => {
                tracing::warn!(abbreviation = %abbreviation, glob = %g, error = %e, "invalid exclude glob, skipping agent");
                return None;
            }
        }
    }

    let content_regex = match &node.content_pattern {
        Some(pattern) => match RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
        {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::warn!(abbreviation = %abbreviation, pattern = %pattern, error = %e, "invalid content pattern, skipping agent");
                return None;
            }
        },
        None => None,
    };

    let executor_name = node
        .executor
        .clone()
        .or_else(|| defaults.executor.clone())
        .unwrap_or_else(|| "claude_code".to_string());
    let Some(executor) = ExecutorKind::parse(&executor_name) else {
        tracing::warn!(abbreviation = %abbreviation, executor = %executor_name, "unknown executor, skipping agent");
        return None;
    };

    let timeout_minutes = node
        .timeout_minutes
        .or(defaults.timeout_minutes)
        .unwrap_or(30.0);
    let timeout = Duration::from_secs((timeout_minutes * 60.0).max(1.0) as u64);

    let max_parallel = node
        .max_parallel
        .or(defaults.max_parallel)
        .unwrap_or(1)
        .max(1);

    let priority = node
        .task_priority
        .clone()
        .or_else(|| defaults.task_priority.clone())
        .unwrap_or_else(|| "medium".to_string());

    let post_process = match node.post_process.as_deref() {
        None | Some("none") => PostProcess::None,
        Some("remove_trigger_content") => PostProcess::RemoveTriggerContent,
        Some(other) => {
            tracing::warn!(abbreviation = %abbreviation, post_process = %other, "unknown post_process, using none");
            PostProcess::None
        }
    };

    let display_name = node
        .name
        .trim()
        .trim_end_matches(&format!("({})", abbreviation))
        .trim()
        .to_string();

    Some(AgentDefinition {
        abbreviation,
        display_name,
        category,
        prompt_body: prompt.body.trim().to_string(),
        input_paths,
        trigger_glob,
        trigger_event,
        exclude_globs,
        content_regex,
        executor,
        executor_params: node.executor_params.clone(),
        max_parallel,
        timeout,
        post_process,
        log_template: node
            .log_filename
            .clone()
            .unwrap_or_else(|| "{timestamp}-{agent}.log".to_string()),
        priority,
        cron: node.cron.clone(),
        trigger_pattern,
        exclude_patterns,
    })
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
