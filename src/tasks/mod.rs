//! Task registry and execution
//!
//! Deploys run as a named, ordered list of tasks with before/after
//! hooks. Hook bindings are resolved once at startup into a fixed
//! [`ExecutionPlan`]; the [`runner`] then executes the plan step by
//! step, aborting on the first error.

pub mod plan;
pub mod runner;

pub use plan::ExecutionPlan;
pub use runner::{RunReport, TaskEvent, TaskRunner};

use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::DeployResult;
use crate::executor::Executor;
use crate::lock::DeployLock;
use crate::models::{Host, Release, ReleaseId};
use crate::paths::DeployPaths;

/// Everything a task may read or mutate during one host's run.
///
/// `release` is set by the prepare task; `prior` is the latest release
/// that existed before the run started.
pub struct TaskContext<'a> {
    pub host: &'a Host,
    pub config: &'a Config,
    pub paths: DeployPaths,
    pub executor: &'a dyn Executor,
    pub release: Option<Release>,
    pub prior: Option<Release>,
    pub lock: Option<DeployLock>,
    pub pruned: Vec<ReleaseId>,
}

/// A task's executable action
pub type TaskAction = Box<dyn Fn(&mut TaskContext<'_>) -> DeployResult<()>>;

/// A named deployment step
pub struct Task {
    pub name: String,
    pub desc: String,
    action: TaskAction,
}

impl Task {
    pub fn invoke(&self, ctx: &mut TaskContext<'_>) -> DeployResult<()> {
        (self.action)(ctx)
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("desc", &self.desc)
            .finish_non_exhaustive()
    }
}

/// Registry of tasks and their before/after hook bindings.
///
/// Hooks are single-task attachments by name; they may themselves
/// carry hooks, but a binding chain that loops back is rejected at
/// plan resolution, not at registration.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, Task>,
    before: BTreeMap<String, Vec<String>>,
    after: BTreeMap<String, Vec<String>>,
    failure_hook: Option<String>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under `name`
    pub fn task(
        &mut self,
        name: impl Into<String>,
        desc: impl Into<String>,
        action: TaskAction,
    ) -> &mut Self {
        let name = name.into();
        self.tasks.insert(
            name.clone(),
            Task {
                name,
                desc: desc.into(),
                action,
            },
        );
        self
    }

    /// Bind `hook` to run before `task`
    pub fn before(&mut self, task: impl Into<String>, hook: impl Into<String>) -> &mut Self {
        self.before.entry(task.into()).or_default().push(hook.into());
        self
    }

    /// Bind `hook` to run after `task`
    pub fn after(&mut self, task: impl Into<String>, hook: impl Into<String>) -> &mut Self {
        self.after.entry(task.into()).or_default().push(hook.into());
        self
    }

    /// Register the hook that runs when any task fails
    pub fn on_failure(&mut self, hook: impl Into<String>) -> &mut Self {
        self.failure_hook = Some(hook.into());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn failure_hook(&self) -> Option<&str> {
        self.failure_hook.as_deref()
    }

    pub(crate) fn hooks_before(&self, name: &str) -> &[String] {
        self.before.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn hooks_after(&self, name: &str) -> &[String] {
        self.after.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
