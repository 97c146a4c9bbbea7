//! Plan resolution - hooks flattened into a fixed step list
//!
//! Dynamic before/after registration is resolved exactly once, at
//! startup, into an ordered list of task names. The runner never
//! consults the hook bindings again, so the plan cannot mutate during
//! a run.

use crate::error::{DeployError, DeployResult};
use crate::tasks::TaskRegistry;

/// A resolved, immutable execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    steps: Vec<String>,
}

impl ExecutionPlan {
    /// Flatten `sequence` and all hook bindings into a fixed step
    /// list: before-hooks, then the task, then after-hooks, each hook
    /// expanded recursively.
    ///
    /// Fails with `InvalidPlan` on unknown task names and on hook
    /// chains that loop back on themselves.
    pub fn resolve(registry: &TaskRegistry, sequence: &[&str]) -> DeployResult<Self> {
        let mut steps = Vec::new();
        let mut visiting = Vec::new();
        for name in sequence {
            expand(registry, name, &mut steps, &mut visiting)?;
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn expand(
    registry: &TaskRegistry,
    name: &str,
    steps: &mut Vec<String>,
    visiting: &mut Vec<String>,
) -> DeployResult<()> {
    if visiting.iter().any(|v| v == name) {
        return Err(DeployError::InvalidPlan {
            message: format!(
                "hook cycle detected: {} -> {name}",
                visiting.join(" -> ")
            ),
        });
    }
    if !registry.contains(name) {
        return Err(DeployError::InvalidPlan {
            message: format!("unknown task '{name}'"),
        });
    }

    visiting.push(name.to_string());
    for hook in registry.hooks_before(name) {
        expand(registry, hook, steps, visiting)?;
    }
    steps.push(name.to_string());
    for hook in registry.hooks_after(name) {
        expand(registry, hook, steps, visiting)?;
    }
    visiting.pop();
    Ok(())
}
