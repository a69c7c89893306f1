//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Returns the path to the vo binary next to the test binary's target dir.
fn vo_binary() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let standard = manifest_dir.join("target/debug/vo");
    if standard.exists() {
        return standard;
    }

    // Fallback: resolve relative to the test binary itself. It lives at
    // target/debug/deps/specs-<hash>, so its grandparent is target/debug.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("vo");
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Run `vo` with the given args against a vault directory.
pub fn vo(vault: &Path, args: &[&str]) -> Output {
    Command::new(vo_binary())
        .arg("-C")
        .arg(vault)
        .args(args)
        .output()
        .expect("failed to launch vo")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Scratch vault on disk
pub struct Vault {
    dir: tempfile::TempDir,
}

impl Vault {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn with_config(config: &str) -> Self {
        let vault = Self::empty();
        std::fs::write(vault.root().join("orchestrator.yaml"), config).unwrap();
        vault
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn add_prompt(&self, filename: &str, category: &str) {
        let prompts = self.root().join("_Settings_/Prompts");
        std::fs::create_dir_all(&prompts).unwrap();
        std::fs::write(
            prompts.join(filename),
            format!("---\ntitle: {filename}\ncategory: {category}\n---\nPrompt body.\n"),
        )
        .unwrap();
    }
}
