//! Common test utilities for Shipwright CLI tests.
//!
//! Provides `TestEnv`: an isolated workspace + deploy root pair with a
//! generated `shipwright.toml`, plus helpers to run the CLI binary and
//! inspect the deploy root afterwards.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Result of running a Shipwright CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment: a workspace to deploy from, a deploy
/// root to deploy into, and a config file naming one host (`web1`).
pub struct TestEnv {
    pub workspace: TempDir,
    pub deploy_root: TempDir,
    config_dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// A workspace holding one `index.php` and a default config
    pub fn new() -> Self {
        Self::with_config_lines("")
    }

    /// Like [`TestEnv::new`] but with extra top-level config lines
    /// (e.g. `keep_releases = 2`) prepended to the host table.
    pub fn with_config_lines(extra: &str) -> Self {
        let env = Self {
            workspace: TempDir::new().unwrap(),
            deploy_root: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_shipwright")),
        };
        env.write_workspace_file("index.php", "<?php echo 'hello';");
        env.write_config(extra);
        env
    }

    /// Regenerate `shipwright.toml` with the given extra lines
    pub fn write_config(&self, extra: &str) {
        let config = format!(
            r#"{extra}

[[hosts]]
name = "web1"
address = "localhost"
user = "deploy"
deploy_path = "{deploy}"
workspace = "{workspace}"
"#,
            deploy = self.deploy_root.path().display(),
            workspace = self.workspace.path().display(),
        );
        fs::write(self.config_path(), config).unwrap();
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().join("shipwright.toml")
    }

    pub fn write_workspace_file(&self, rel: &str, content: &str) {
        let path = self.workspace.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Run the shipwright binary with `--config` pointing at this env
    pub fn run(&self, args: &[&str]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.config_dir.path())
            .args(args)
            .arg("--config")
            .arg(self.config_path())
            // Keep host resolution deterministic inside the sandbox
            .env_remove("SSH_HOST")
            .env_remove("SSH_USER")
            .env_remove("PROJECT_PATH")
            .env_remove("GITHUB_WORKSPACE")
            .env_remove("HTTP_USER");

        let output = cmd.output().expect("Failed to execute shipwright");
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Release directory names, newest first
    pub fn release_dirs(&self) -> Vec<String> {
        let releases = self.deploy_root.path().join("releases");
        if !releases.exists() {
            return Vec::new();
        }
        let mut dirs: Vec<String> = fs::read_dir(&releases)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        dirs.sort_by(|a, b| b.cmp(a));
        dirs
    }

    /// Where the `current` symlink points, if it exists
    pub fn current_target(&self) -> Option<PathBuf> {
        fs::read_link(self.deploy_root.path().join("current")).ok()
    }

    pub fn lock_file(&self) -> PathBuf {
        self.deploy_root.path().join(".dep").join("deploy.lock")
    }

    /// Rename a release directory so subsequent deploys (same-second
    /// timestamps) cannot collide, repointing `current` when it was
    /// the published release.
    pub fn backdate_release(&self, from: &str, to: &str) {
        let releases = self.deploy_root.path().join("releases");
        let old = releases.join(from);
        let new = releases.join(to);
        fs::rename(&old, &new).unwrap();

        if self.current_target().as_deref() == Some(old.as_path()) {
            let staged = self.deploy_root.path().join("current.relink");
            std::os::unix::fs::symlink(&new, &staged).unwrap();
            fs::rename(&staged, self.deploy_root.path().join("current")).unwrap();
        }
        // Keep the marker in step with the rename
        let marker = self.deploy_root.path().join(".dep").join("latest_release");
        if let Ok(content) = fs::read_to_string(&marker) {
            if content.trim() == from {
                fs::write(&marker, format!("{to}\n")).unwrap();
            }
        }
    }

    /// Deploy once, then backdate the new release to `id`.
    ///
    /// Returns the test result of the deploy.
    pub fn deploy_as(&self, id: &str) -> TestResult {
        let before = self.release_dirs();
        let result = self.run(&["run", "--host", "web1"]);
        if result.success {
            let after = self.release_dirs();
            let created = after
                .iter()
                .find(|d| !before.iter().any(|b| b == *d))
                .expect("deploy created a release")
                .clone();
            self.backdate_release(&created, id);
        }
        result
    }
}
