//! Error-path specs

use crate::prelude::*;

#[test]
fn broken_yaml_exits_with_config_error() {
    let vault = Vault::with_config("orchestrator: [unclosed");
    let output = vo(vault.root(), &["status"]);
    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr_of(&output));
    assert!(stderr_of(&output).contains("Error"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    let vault = Vault::empty();
    let output = vo(vault.root(), &["frobnicate"]);
    assert!(!output.status.success());
}
