// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders for agent definitions, shared with other crates' tests.

#![allow(clippy::expect_used)]

use crate::registry::{AgentDefinition, ExecutorKind, PostProcess, TriggerEvent};
use glob::Pattern;
use regex::RegexBuilder;
use std::collections::HashMap;
use std::time::Duration;

impl AgentDefinition {
    /// A manual-only definition with sensible defaults. Chain the `with_*`
    /// methods to shape it.
    pub fn fixture(abbreviation: &str) -> Self {
        Self {
            abbreviation: abbreviation.to_string(),
            display_name: format!("Fixture {abbreviation}"),
            category: "test".to_string(),
            prompt_body: "Process the input file.".to_string(),
            input_paths: Vec::new(),
            trigger_glob: None,
            trigger_event: TriggerEvent::Manual,
            exclude_globs: Vec::new(),
            content_regex: None,
            executor: ExecutorKind::ClaudeCode,
            executor_params: HashMap::new(),
            max_parallel: 1,
            timeout: Duration::from_secs(60),
            post_process: PostProcess::None,
            log_template: "{timestamp}-{agent}.log".to_string(),
            priority: "medium".to_string(),
            cron: None,
            trigger_pattern: None,
            exclude_patterns: Vec::new(),
        }
    }

    pub fn with_trigger(mut self, glob: &str, event: TriggerEvent) -> Self {
        self.trigger_pattern = Some(Pattern::new(glob).expect("valid fixture glob"));
        self.trigger_glob = Some(glob.to_string());
        self.trigger_event = event;
        if let Some(dir) = glob.strip_suffix("/*.md") {
            self.input_paths = vec![dir.to_string()];
        }
        self
    }

    pub fn with_exclude(mut self, glob: &str) -> Self {
        self.exclude_patterns
            .push(Pattern::new(glob).expect("valid fixture glob"));
        self.exclude_globs.push(glob.to_string());
        self
    }

    pub fn with_content_pattern(mut self, pattern: &str) -> Self {
        self.content_regex = Some(
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .expect("valid fixture regex"),
        );
        self
    }

    pub fn with_executor(mut self, executor: ExecutorKind) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_max_parallel(mut self, max_parallel: u32) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_prompt(mut self, prompt_body: &str) -> Self {
        self.prompt_body = prompt_body.to_string();
        self
    }

    pub fn with_post_process(mut self, post_process: PostProcess) -> Self {
        self.post_process = post_process;
        self
    }
}
