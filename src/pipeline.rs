//! Standard deploy pipeline
//!
//! Wires the release manager, shared-resource linker and symlink
//! switcher into the fixed task sequence:
//!
//! ```text
//! deploy:config:copy   (before prepare: bootstrap config carry-over)
//! deploy:prepare
//! deploy:sync
//! deploy:shared
//! deploy:writable
//! deploy:vendors
//! deploy:rebuild_cache (before symlink, only when the config file is present)
//! deploy:symlink
//! deploy:cleanup
//! deploy:owner         (after cleanup)
//! ```
//!
//! `deploy:unlock` is the failure hook.

use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{DeployError, DeployResult};
use crate::executor::Executor;
use crate::lock::DeployLock;
use crate::models::{Host, Release, ReleaseId, ReleaseStatus};
use crate::paths::DeployPaths;
use crate::release::ReleaseManager;
use crate::shared::SharedResourceLinker;
use crate::state;
use crate::symlink::SymlinkSwitcher;
use crate::sync::copy_tree;
use crate::tasks::{ExecutionPlan, TaskContext, TaskEvent, TaskRegistry, TaskRunner};

/// Top-level task order; hooks attach around these
pub const DEPLOY_SEQUENCE: &[&str] = &[
    "deploy:prepare",
    "deploy:sync",
    "deploy:shared",
    "deploy:writable",
    "deploy:vendors",
    "deploy:symlink",
    "deploy:cleanup",
];

/// Result of one host's run
#[derive(Debug, Clone, Default)]
pub struct DeployOutcome {
    pub host: String,
    pub release: Option<ReleaseId>,
    pub pruned: Vec<ReleaseId>,
    pub completed: Vec<String>,
    /// Set instead of `completed` for dry runs
    pub planned: Vec<String>,
    pub dry_run: bool,
}

/// Options for a deploy run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Cleared by the Ctrl-C handler to request cancellation
    pub running: Option<Arc<AtomicBool>>,
}

fn release_of<'c>(ctx: &'c TaskContext<'_>, task: &str) -> DeployResult<&'c Release> {
    ctx.release.as_ref().ok_or_else(|| DeployError::InvalidPlan {
        message: format!("'{task}' ran without a release; 'deploy:prepare' must come first"),
    })
}

/// Build the standard task registry
pub fn standard_registry() -> TaskRegistry {
    let mut reg = TaskRegistry::new();

    reg.task(
        "deploy:config:copy",
        "Seed the shared config file from the latest release",
        Box::new(|ctx| {
            let Some(config_file) = ctx.config.config_file.clone() else {
                return Ok(());
            };
            let Some(latest) = state::read_latest(&ctx.paths.dep_dir()) else {
                return Ok(());
            };
            let shared_copy = ctx.paths.shared_dir().join(&config_file);
            if shared_copy.exists() {
                return Ok(());
            }
            let previous = ctx.paths.release_dir(&latest).join(&config_file);
            if previous.is_file() {
                if let Some(parent) = shared_copy.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&previous, &shared_copy)?;
            }
            Ok(())
        }),
    );

    reg.task(
        "deploy:prepare",
        "Create the deploy layout and a new release directory",
        Box::new(|ctx| {
            fs::create_dir_all(ctx.paths.releases_dir())?;
            fs::create_dir_all(ctx.paths.shared_dir())?;
            fs::create_dir_all(ctx.paths.dep_dir())?;

            let manager = ReleaseManager::new(ctx.paths.clone());
            let release = manager.create_release(ReleaseId::now())?;
            ctx.release = Some(release);
            Ok(())
        }),
    );

    reg.task(
        "deploy:sync",
        "Copy the workspace into the release",
        Box::new(|ctx| {
            let release = release_of(ctx, "deploy:sync")?;
            copy_tree(&ctx.host.workspace, &release.path, &ctx.config.exclude)?;
            Ok(())
        }),
    );

    reg.task(
        "deploy:shared",
        "Link shared files and directories into the release",
        Box::new(|ctx| {
            let release = release_of(ctx, "deploy:shared")?.clone();
            let linker = SharedResourceLinker::new(ctx.paths.clone());
            let shared = ctx.config.shared_paths();
            let dirs: Vec<_> = shared
                .iter()
                .filter(|p| ctx.config.is_shared_dir(p))
                .cloned()
                .collect();
            linker.link_all(&release, &shared, &dirs, ctx.prior.as_ref())
        }),
    );

    reg.task(
        "deploy:writable",
        "Make configured directories group-writable",
        Box::new(|ctx| {
            let release = release_of(ctx, "deploy:writable")?.clone();
            for dir in &ctx.config.writable_dirs {
                let path = release.path.join(dir);
                if fs::symlink_metadata(&path).is_err() {
                    continue;
                }
                let command = format!("chmod -R 775 {}", path.display());
                ctx.executor.run(ctx.host, &command, None)?;
            }
            Ok(())
        }),
    );

    reg.task(
        "deploy:vendors",
        "Install dependencies into the release",
        Box::new(|ctx| {
            let release = release_of(ctx, "deploy:vendors")?.clone();
            for template in &ctx.config.install_commands {
                let command =
                    template.replace("{release_path}", &release.path.display().to_string());
                ctx.executor.run(ctx.host, &command, Some(&release.path))?;
            }
            Ok(())
        }),
    );

    reg.task(
        "deploy:rebuild_cache",
        "Run cache rebuild commands when the config file is present",
        Box::new(|ctx| {
            let release = release_of(ctx, "deploy:rebuild_cache")?.clone();
            let Some(config_file) = &ctx.config.config_file else {
                return Ok(());
            };
            if !release.path.join(config_file).exists() {
                return Ok(());
            }
            for template in &ctx.config.cache_commands {
                let command =
                    template.replace("{release_path}", &release.path.display().to_string());
                ctx.executor.run(ctx.host, &command, Some(&release.path))?;
            }
            Ok(())
        }),
    );

    reg.task(
        "deploy:symlink",
        "Publish the release by repointing current",
        Box::new(|ctx| {
            let release = release_of(ctx, "deploy:symlink")?.clone();
            SymlinkSwitcher::new(ctx.paths.clone()).switch(&release)?;
            // Published from here on: mark Active before anything else
            // can fail, so the failure path never deletes a release
            // that current points at.
            if let Some(rel) = ctx.release.as_mut() {
                rel.status = ReleaseStatus::Active;
            }
            state::write_latest(&ctx.paths.dep_dir(), &release.id)?;
            Ok(())
        }),
    );

    reg.task(
        "deploy:cleanup",
        "Prune releases beyond keep_releases",
        Box::new(|ctx| {
            let manager = ReleaseManager::new(ctx.paths.clone());
            ctx.pruned = manager.prune(ctx.config.keep_releases)?;
            Ok(())
        }),
    );

    reg.task(
        "deploy:owner",
        "Hand the deploy root to the configured web user",
        Box::new(|ctx| {
            // The original fell back to scanning the process table for
            // a web server user; that heuristic is environment state,
            // not configuration, so an unset http_user skips the task.
            let Some(user) = &ctx.config.http_user else {
                return Ok(());
            };
            let root = ctx.host.deploy_path.display();
            ctx.executor
                .run(ctx.host, &format!("chown -R {user}:{user} {root}"), None)?;
            ctx.executor
                .run(ctx.host, &format!("chmod -R 775 {root}"), None)?;
            Ok(())
        }),
    );

    reg.task(
        "deploy:unlock",
        "Release the deploy lock",
        Box::new(|ctx| {
            if let Some(lock) = ctx.lock.take() {
                lock.release()?;
            }
            Ok(())
        }),
    );

    reg.before("deploy:prepare", "deploy:config:copy");
    reg.before("deploy:symlink", "deploy:rebuild_cache");
    reg.after("deploy:cleanup", "deploy:owner");
    reg.on_failure("deploy:unlock");

    reg
}

/// Deploy one host: resolve the plan, take the lock, run the tasks.
///
/// On success the lock is released and removed; on failure the failure
/// hook has already done so and the error names the failing task.
pub fn deploy_host<F>(
    config: &Config,
    host: &Host,
    executor: &dyn Executor,
    options: &RunOptions,
    callback: Option<F>,
) -> DeployResult<DeployOutcome>
where
    F: FnMut(TaskEvent),
{
    let registry = standard_registry();
    let plan = ExecutionPlan::resolve(&registry, DEPLOY_SEQUENCE)?;

    if options.dry_run {
        return Ok(DeployOutcome {
            host: host.name.clone(),
            planned: plan.steps().to_vec(),
            dry_run: true,
            ..DeployOutcome::default()
        });
    }

    let paths = DeployPaths::new(&host.deploy_path);
    let lock = DeployLock::acquire(&paths.lock_file())?;

    // Seed source for shared paths: the last *published* release, not
    // just the newest directory. A crashed run can leave a newer,
    // partially-synced release on disk; seeding from it would make its
    // half-written data the authoritative shared copy.
    let releases = ReleaseManager::new(paths.clone()).list_releases()?;
    let prior = state::read_latest(&paths.dep_dir())
        .and_then(|id| releases.iter().find(|r| r.id == id).cloned())
        .or_else(|| releases.into_iter().next());

    let mut ctx = TaskContext {
        host,
        config,
        paths,
        executor,
        release: None,
        prior,
        lock: Some(lock),
        pruned: Vec::new(),
    };

    let mut runner = TaskRunner::new(&registry);
    if let Some(running) = &options.running {
        runner = runner.with_cancel_flag(Arc::clone(running));
    }

    let report = match runner.run_with_callback(&plan, &mut ctx, callback) {
        Ok(report) => report,
        Err(err) => {
            // An unpublished release is a half-synced directory; drop
            // it so it neither pollutes the keep window nor serves as
            // a seed source later.
            if let Some(release) = ctx.release.take() {
                if release.status != ReleaseStatus::Active {
                    let _ = fs::remove_dir_all(&release.path);
                }
            }
            return Err(err);
        }
    };

    if let Some(lock) = ctx.lock.take() {
        lock.release()?;
    }

    Ok(DeployOutcome {
        host: host.name.clone(),
        release: ctx.release.map(|r| r.id),
        pruned: ctx.pruned,
        completed: report.completed,
        planned: Vec::new(),
        dry_run: false,
    })
}

/// Repoint `current` at the release preceding the active one.
///
/// Takes the deploy lock so a rollback cannot race a deploy's cleanup
/// on the same root. Returns `(from, to)` release ids and updates the
/// latest marker so a later bootstrap step reads the rolled-back
/// release.
pub fn rollback_host(host: &Host) -> DeployResult<(ReleaseId, ReleaseId)> {
    let paths = DeployPaths::new(&host.deploy_path);
    let lock = DeployLock::acquire(&paths.lock_file())?;
    let result = switch_to_previous(&paths);
    lock.release()?;
    result
}

fn switch_to_previous(paths: &DeployPaths) -> DeployResult<(ReleaseId, ReleaseId)> {
    let manager = ReleaseManager::new(paths.clone());

    let current = manager
        .current_release()
        .ok_or_else(|| DeployError::SwitchFailed {
            path: paths.current_link(),
            reason: "no active release to roll back from".to_string(),
        })?;

    let releases = manager.list_releases()?;
    let position = releases.iter().position(|r| r.id == current.id);
    let previous = position
        .and_then(|i| releases.get(i + 1))
        .cloned()
        .ok_or_else(|| DeployError::SwitchFailed {
            path: paths.current_link(),
            reason: format!("no release older than '{}' to roll back to", current.id),
        })?;

    SymlinkSwitcher::new(paths.clone()).switch(&previous)?;
    state::write_latest(&paths.dep_dir(), &previous.id)?;
    Ok((current.id, previous.id))
}
