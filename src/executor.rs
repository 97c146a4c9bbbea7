//! Remote execution seam
//!
//! Tasks that shell out (ownership fix-up, cache rebuild commands) go
//! through the narrow [`Executor`] trait so the orchestration logic is
//! testable without a real host. Transport details (ssh invocation,
//! escaping) live behind this seam and stay out of the core.

use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

use crate::error::{DeployError, DeployResult};
use crate::models::Host;

/// Captured result of an executed command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub status: i32,
}

impl CommandOutput {
    /// Stdout with surrounding whitespace stripped
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Capability to run a shell command on a host
pub trait Executor {
    /// Run `command` for `host`, from `cwd` when given.
    ///
    /// A non-zero exit is an error (`CommandFailed`), matching the
    /// abort-on-first-error task semantics.
    fn run(&self, host: &Host, command: &str, cwd: Option<&Path>) -> DeployResult<CommandOutput>;
}

/// Executor that runs commands on the local machine via `sh -c`.
///
/// Used when the deploy root lives on the same filesystem as the
/// orchestrator (the CI-runner-deploys-to-itself setup).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalExecutor;

impl LocalExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for LocalExecutor {
    fn run(&self, _host: &Host, command: &str, cwd: Option<&Path>) -> DeployResult<CommandOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        let output = cmd.output()?;

        if !output.status.success() {
            return Err(DeployError::CommandFailed {
                command: command.to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            status: output.status.code().unwrap_or(0),
        })
    }
}

/// Recording executor for tests.
///
/// Captures every command it is asked to run and optionally fails on
/// commands containing a marker substring.
#[derive(Debug, Clone, Default)]
pub struct MockExecutor {
    commands: Arc<Mutex<Vec<String>>>,
    fail_on: Option<String>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command whose text contains `marker`
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            fail_on: Some(marker.into()),
        }
    }

    /// Commands recorded so far, in execution order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl Executor for MockExecutor {
    fn run(&self, _host: &Host, command: &str, _cwd: Option<&Path>) -> DeployResult<CommandOutput> {
        self.commands.lock().unwrap().push(command.to_string());

        if let Some(marker) = &self.fail_on {
            if command.contains(marker.as_str()) {
                return Err(DeployError::CommandFailed {
                    command: command.to_string(),
                    status: 1,
                    stderr: "mock failure".to_string(),
                });
            }
        }

        Ok(CommandOutput {
            stdout: String::new(),
            status: 0,
        })
    }
}
