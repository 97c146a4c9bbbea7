//! Shipwright - release-based deployment orchestrator
//!
//! Shipwright deploys a prepared workspace into timestamped release
//! directories, links persistent shared paths into each release,
//! publishes by atomically repointing a `current` symlink, and prunes
//! superseded releases. A fixed task plan with before/after hooks
//! drives the run; any failure unlocks and leaves `current` untouched.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod lock;
pub mod models;
pub mod paths;
pub mod pipeline;
pub mod release;
pub mod shared;
pub mod state;
pub mod symlink;
pub mod sync;
pub mod tasks;

// Re-exports for convenience
pub use config::Config;
pub use error::{DeployError, DeployResult};
pub use executor::{CommandOutput, Executor, LocalExecutor, MockExecutor};
pub use lock::DeployLock;
pub use models::{Host, Release, ReleaseId, ReleaseStatus, SharedPath};
pub use paths::DeployPaths;
pub use pipeline::{deploy_host, rollback_host, DeployOutcome, RunOptions, DEPLOY_SEQUENCE};
pub use release::ReleaseManager;
pub use shared::SharedResourceLinker;
pub use symlink::SymlinkSwitcher;
pub use tasks::{ExecutionPlan, TaskRegistry, TaskRunner};
