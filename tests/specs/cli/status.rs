//! `vo status` specs

use crate::prelude::*;

const CONFIG: &str = r#"
orchestrator:
  prompts_dir: _Settings_/Prompts
  tasks_dir: _Settings_/Tasks
  logs_dir: _Settings_/Logs

defaults:
  executor: claude_code

nodes:
  - type: agent
    name: Enrich Ingested Content (EIC)
    input_path: Ingest/Clippings
    input_type: new_file
"#;

#[test]
fn lists_vault_path_count_and_agents() {
    let vault = Vault::with_config(CONFIG);
    vault.add_prompt("Enrich Ingested Content (EIC).md", "enrichment");

    let output = vo(vault.root(), &["status"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Vault:"), "stdout: {stdout}");
    assert!(stdout.contains("Agents loaded: 1"), "stdout: {stdout}");
    assert!(
        stdout.contains("[EIC] Enrich Ingested Content (enrichment)"),
        "stdout: {stdout}"
    );
}

#[test]
fn running_twice_is_identical() {
    let vault = Vault::with_config(CONFIG);
    vault.add_prompt("Enrich Ingested Content (EIC).md", "enrichment");

    let first = vo(vault.root(), &["status"]);
    let second = vo(vault.root(), &["status"]);
    assert_eq!(stdout_of(&first), stdout_of(&second));
}

#[test]
fn missing_config_reports_zero_agents_without_crashing() {
    let vault = Vault::empty();
    let output = vo(vault.root(), &["status"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(stdout_of(&output).contains("Agents loaded: 0"));
}

#[test]
fn agent_without_prompt_file_is_skipped_with_warning() {
    let vault = Vault::with_config(CONFIG);
    // No prompt file written at all.
    let output = vo(vault.root(), &["status"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Agents loaded: 0"));
    assert!(
        stderr_of(&output).contains("no prompt file"),
        "stderr: {}",
        stderr_of(&output)
    );
}

#[test]
fn invalid_content_regex_skips_only_that_agent() {
    let vault = Vault::with_config(
        r#"
nodes:
  - type: agent
    name: Broken (BRK)
    input_path: In
    input_type: new_file
    content_pattern: "(unclosed"
  - type: agent
    name: Working (WRK)
    input_path: In
    input_type: new_file
"#,
    );
    vault.add_prompt("Broken (BRK).md", "x");
    vault.add_prompt("Working (WRK).md", "x");

    let output = vo(vault.root(), &["status"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Agents loaded: 1"), "stdout: {stdout}");
    assert!(stdout.contains("[WRK]"));
    assert!(!stdout.contains("[BRK]"));
}
