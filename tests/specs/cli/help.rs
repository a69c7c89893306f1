//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_both_subcommands() {
    let vault = Vault::empty();
    let output = vo(vault.root(), &["--help"]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("run"), "stdout: {stdout}");
    assert!(stdout.contains("status"), "stdout: {stdout}");
}

#[test]
fn run_help_shows_max_concurrent_override() {
    let vault = Vault::empty();
    let output = vo(vault.root(), &["run", "--help"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("--max-concurrent"));
}
