//! `shipwright run` - deploy one or all hosts

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Result;

use crate::executor::LocalExecutor;
use crate::pipeline::{self, DeployOutcome, RunOptions};
use crate::tasks::TaskEvent;

use super::{load_config, select_hosts};

pub fn cmd_run(
    config_path: &Path,
    host: Option<&str>,
    dry_run: bool,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let config = load_config(config_path)?;
    let hosts = select_hosts(&config, host)?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })?;

    if !json {
        println!("🚀 Shipwright Deploy");
        if dry_run {
            println!("Mode: Dry run");
        }
    }

    // Hosts deploy in parallel with independent failure domains: one
    // host failing never aborts the others.
    let executor = LocalExecutor::new();
    let results: Vec<(String, Result<DeployOutcome, crate::error::DeployError>)> =
        thread::scope(|scope| {
            let mut handles = Vec::new();
            for host in &hosts {
                let config = &config;
                let running = Arc::clone(&running);
                handles.push(scope.spawn(move || {
                    let options = RunOptions {
                        dry_run,
                        running: Some(running),
                    };
                    let name = host.name.clone();
                    let callback = |event: TaskEvent| report_event(&name, &event, json, verbose);
                    let result =
                        pipeline::deploy_host(config, host, &executor, &options, Some(callback));
                    (host.name.clone(), result)
                }));
            }
            handles
                .into_iter()
                .map(|h| h.join().expect("deploy thread panicked"))
                .collect()
        });

    let mut failures = Vec::new();
    for (host, result) in results {
        match result {
            Ok(outcome) => report_outcome(&outcome, json),
            Err(e) => {
                if json {
                    let line = serde_json::json!({
                        "event": "deploy_failed",
                        "host": host,
                        "error": e.to_string(),
                    });
                    println!("{line}");
                } else {
                    eprintln!("✗ [{host}] {e}");
                }
                failures.push(host);
            }
        }
    }

    if !failures.is_empty() {
        anyhow::bail!("deploy failed on host(s): {}", failures.join(", "));
    }
    Ok(())
}

fn report_event(host: &str, event: &TaskEvent, json: bool, verbose: u8) {
    if json {
        let line = match event {
            TaskEvent::TaskStarted { name } => {
                serde_json::json!({ "event": "task_started", "host": host, "task": name })
            }
            TaskEvent::TaskFinished { name } => {
                serde_json::json!({ "event": "task_finished", "host": host, "task": name })
            }
            TaskEvent::TaskFailed { name, message } => {
                serde_json::json!({ "event": "task_failed", "host": host, "task": name, "error": message })
            }
            TaskEvent::FailureHookError { name, message } => {
                serde_json::json!({ "event": "failure_hook_error", "host": host, "task": name, "error": message })
            }
        };
        println!("{line}");
        return;
    }

    match event {
        TaskEvent::TaskStarted { name } => {
            if verbose > 0 {
                println!("  → [{host}] {name}");
            }
        }
        TaskEvent::TaskFinished { name } => {
            println!("  ✓ [{host}] {name}");
        }
        TaskEvent::TaskFailed { name, message } => {
            eprintln!("  ✗ [{host}] {name}: {message}");
        }
        TaskEvent::FailureHookError { name, message } => {
            eprintln!("  ⚠ [{host}] failure hook {name} failed: {message}");
        }
    }
}

fn report_outcome(outcome: &DeployOutcome, json: bool) {
    if json {
        let line = serde_json::json!({
            "event": if outcome.dry_run { "deploy_planned" } else { "deploy_success" },
            "host": outcome.host,
            "release": outcome.release.as_ref().map(|id| id.to_string()),
            "pruned": outcome.pruned.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
            "tasks": if outcome.dry_run { &outcome.planned } else { &outcome.completed },
        });
        println!("{line}");
        return;
    }

    if outcome.dry_run {
        println!("\n📋 Plan for {}:", outcome.host);
        for step in &outcome.planned {
            println!("  - {step}");
        }
        return;
    }

    println!(
        "\n✓ [{}] deployed release {}",
        outcome.host,
        outcome
            .release
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default()
    );
    if !outcome.pruned.is_empty() {
        let pruned: Vec<_> = outcome.pruned.iter().map(|id| id.to_string()).collect();
        println!("  Pruned: {}", pruned.join(", "));
    }
}
