//! Error types for Shipwright
//!
//! Uses `thiserror` for library errors; `anyhow` wraps them at the CLI
//! boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Shipwright operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for Shipwright operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// A release with the same id already exists on disk
    #[error("release '{id}' already exists at {}", path.display())]
    PathConflict { id: String, path: PathBuf },

    /// The current symlink could not be repointed
    #[error("cannot switch current to {}: {reason}", path.display())]
    SwitchFailed { path: PathBuf, reason: String },

    /// The shared directory (or a parent inside it) could not be created
    #[error("cannot create shared parent directory {}", path.display())]
    MissingParent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another deploy run holds the lock for this deploy root
    #[error("another deploy is already running (lock held at {})", path.display())]
    AlreadyDeploying { path: PathBuf },

    /// A task in the execution plan failed
    #[error("task '{name}' failed: {cause}")]
    TaskFailed {
        name: String,
        #[source]
        cause: Box<DeployError>,
    },

    /// The run was interrupted by the operator
    #[error("deploy cancelled by operator")]
    Cancelled,

    /// A shell command run through the executor exited non-zero
    #[error("command `{command}` exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// Hook bindings could not be resolved into a fixed plan
    #[error("invalid execution plan: {message}")]
    InvalidPlan { message: String },

    /// No host matched the requested name
    #[error("no host named '{name}' in configuration")]
    UnknownHost { name: String },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// Wrap an error as a task failure, preserving the underlying cause.
    pub fn task_failed(name: impl Into<String>, cause: DeployError) -> Self {
        DeployError::TaskFailed {
            name: name.into(),
            cause: Box::new(cause),
        }
    }
}
