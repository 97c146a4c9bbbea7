//! `shipwright unlock` - clear a stale deploy lock

use std::path::Path;

use anyhow::Result;

use crate::lock;
use crate::paths::DeployPaths;

use super::load_config;

pub fn cmd_unlock(config_path: &Path, host: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let host = config.host(host)?;

    let lock_file = DeployPaths::new(&host.deploy_path).lock_file();
    let removed = lock::force_unlock(&lock_file)?;

    if json {
        let line = serde_json::json!({
            "event": "unlock",
            "host": host.name,
            "removed": removed,
        });
        println!("{line}");
    } else if removed {
        println!("🔓 [{}] removed {}", host.name, lock_file.display());
    } else {
        println!("🔓 [{}] no lock present", host.name);
    }
    Ok(())
}
