//! `shipwright rollback` - repoint current at the previous release

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline;

use super::load_config;

pub fn cmd_rollback(config_path: &Path, host: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let host = config.host(host)?;

    let (from, to) = pipeline::rollback_host(host)
        .with_context(|| format!("rollback failed on host '{}'", host.name))?;

    if json {
        let line = serde_json::json!({
            "event": "rollback",
            "host": host.name,
            "from": from.to_string(),
            "to": to.to_string(),
        });
        println!("{line}");
    } else {
        println!("↩ [{}] rolled back {} -> {}", host.name, from, to);
    }
    Ok(())
}
