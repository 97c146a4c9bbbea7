//! Task Graph Runner
//!
//! Executes a resolved plan step by step for one host. The runner only
//! sequences and reports; side effects belong to the tasks. On the
//! first error (or operator cancellation) it aborts the remaining
//! steps, runs the registered failure hook and propagates
//! `TaskFailed { name, cause }`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{DeployError, DeployResult};
use crate::tasks::{ExecutionPlan, TaskContext, TaskRegistry};

/// Progress events emitted while a plan runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    TaskStarted { name: String },
    TaskFinished { name: String },
    TaskFailed { name: String, message: String },
    /// The failure hook itself failed; reported, never propagated
    FailureHookError { name: String, message: String },
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub completed: Vec<String>,
}

/// Drives an [`ExecutionPlan`] against a [`TaskContext`]
pub struct TaskRunner<'r> {
    registry: &'r TaskRegistry,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'r> TaskRunner<'r> {
    pub fn new(registry: &'r TaskRegistry) -> Self {
        Self {
            registry,
            cancel: None,
        }
    }

    /// Abort between steps once the flag goes false.
    ///
    /// Cancellation takes the failure path: the failure hook runs and
    /// the error surfaces as `TaskFailed` with a `Cancelled` cause.
    pub fn with_cancel_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.cancel = Some(running);
        self
    }

    pub fn run(&self, plan: &ExecutionPlan, ctx: &mut TaskContext<'_>) -> DeployResult<RunReport> {
        self.run_with_callback::<fn(TaskEvent)>(plan, ctx, None)
    }

    /// Run with a progress callback (used by the CLI for both human
    /// and JSON output).
    pub fn run_with_callback<F>(
        &self,
        plan: &ExecutionPlan,
        ctx: &mut TaskContext<'_>,
        mut callback: Option<F>,
    ) -> DeployResult<RunReport>
    where
        F: FnMut(TaskEvent),
    {
        let mut report = RunReport::default();

        for name in plan.steps() {
            if let Some(cancel) = &self.cancel {
                if !cancel.load(Ordering::SeqCst) {
                    return Err(self.abort(name, DeployError::Cancelled, ctx, &mut callback));
                }
            }

            if let Some(cb) = callback.as_mut() {
                cb(TaskEvent::TaskStarted { name: name.clone() });
            }

            let task = self.registry.get(name).ok_or_else(|| {
                // resolve() validated names; a miss here means the plan
                // and registry got out of sync
                DeployError::InvalidPlan {
                    message: format!("task '{name}' vanished from the registry"),
                }
            })?;

            match task.invoke(ctx) {
                Ok(()) => {
                    report.completed.push(name.clone());
                    if let Some(cb) = callback.as_mut() {
                        cb(TaskEvent::TaskFinished { name: name.clone() });
                    }
                }
                Err(cause) => {
                    if let Some(cb) = callback.as_mut() {
                        cb(TaskEvent::TaskFailed {
                            name: name.clone(),
                            message: cause.to_string(),
                        });
                    }
                    return Err(self.abort(name, cause, ctx, &mut callback));
                }
            }
        }

        Ok(report)
    }

    /// Run the failure hook (best effort) and build the final error
    fn abort<F>(
        &self,
        failing: &str,
        cause: DeployError,
        ctx: &mut TaskContext<'_>,
        callback: &mut Option<F>,
    ) -> DeployError
    where
        F: FnMut(TaskEvent),
    {
        if let Some(hook) = self.registry.failure_hook() {
            if let Some(task) = self.registry.get(hook) {
                if let Err(e) = task.invoke(ctx) {
                    if let Some(cb) = callback.as_mut() {
                        cb(TaskEvent::FailureHookError {
                            name: hook.to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
        DeployError::task_failed(failing, cause)
    }
}
