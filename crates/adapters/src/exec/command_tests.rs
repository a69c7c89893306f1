// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::exec::ExecOutcome;
use std::time::Duration;
use vo_config::registry::ExecutorKind;

fn request(executor: ExecutorKind) -> ExecRequest {
    ExecRequest {
        agent: "TST".to_string(),
        executor,
        params: HashMap::new(),
        payload: "do the thing".to_string(),
        timeout: Duration::from_secs(90),
        cwd: std::env::temp_dir(),
    }
}

fn with_params(executor: ExecutorKind, yaml: &str) -> ExecRequest {
    let mut req = request(executor);
    req.params = serde_yaml::from_str(yaml).unwrap();
    req
}

#[test]
fn gemini_takes_prompt_flag() {
    let spec = build_command(&request(ExecutorKind::GeminiCli)).unwrap();
    assert_eq!(spec.program, PathBuf::from("gemini"));
    assert_eq!(spec.args, vec!["--prompt", "do the thing"]);
    assert!(!spec.use_shell);
}

#[test]
fn codex_takes_prompt_flag() {
    let spec = build_command(&request(ExecutorKind::CodexCli)).unwrap();
    assert_eq!(spec.program, PathBuf::from("codex"));
    assert_eq!(spec.args, vec!["--prompt", "do the thing"]);
}

#[test]
fn cursor_agent_base_flags_with_payload_last() {
    let spec = build_command(&request(ExecutorKind::CursorAgent)).unwrap();
    assert_eq!(spec.program, PathBuf::from("cursor-agent"));
    assert_eq!(
        spec.args,
        vec!["--print", "--output-format", "text", "do the thing"]
    );
}

#[test]
fn cursor_agent_optional_params() {
    let req = with_params(
        ExecutorKind::CursorAgent,
        "model: sonnet\nmcp: true\nbrowser: true\n",
    );
    let spec = build_command(&req).unwrap();
    assert_eq!(
        spec.args,
        vec![
            "--print",
            "--output-format",
            "text",
            "--model",
            "sonnet",
            "--mcp",
            "--browser",
            "do the thing"
        ]
    );
}

#[test]
fn continue_cli_repeats_list_params() {
    let req = with_params(
        ExecutorKind::ContinueCli,
        "model: gpt\nmcp: [alpha, beta]\nrule: solo\nconfig: team.yaml\nauto: true\nreadonly: true\nsilent: false\n",
    );
    let spec = build_command(&req).unwrap();
    assert_eq!(spec.program, PathBuf::from("cn"));
    assert_eq!(
        spec.args,
        vec![
            "--print", "--format", "json", "--model", "gpt", "--mcp", "alpha", "--mcp", "beta",
            "--rule", "solo", "--config", "team.yaml", "--auto", "--readonly", "do the thing"
        ]
    );
}

#[test]
fn payload_is_one_argv_entry_never_requoted() {
    let mut req = request(ExecutorKind::GeminiCli);
    req.payload = r#"has "quotes", $vars and `ticks`"#.to_string();
    let spec = build_command(&req).unwrap();
    assert_eq!(spec.args[1], r#"has "quotes", $vars and `ticks`"#);
}

#[yare::parameterized(
    cmd_ext = { "claude.CMD", true },
    bat_ext = { "runner.bat", true },
    plain = { "claude", false },
    exe = { "claude.exe", false },
)]
fn batch_file_detection(name: &str, expected: bool) {
    assert_eq!(is_batch_file(Path::new(name)), expected);
}

#[test]
fn output_tail_takes_last_lines() {
    let outcome = ExecOutcome {
        exit_code: Some(1),
        stdout: "one\ntwo\nthree".to_string(),
        stderr: "err".to_string(),
        timed_out: false,
    };
    assert_eq!(outcome.output_tail(2), "three\nerr");
    assert_eq!(outcome.output_tail(10), "one\ntwo\nthree\nerr");
}
