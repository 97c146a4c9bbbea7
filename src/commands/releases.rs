//! `shipwright releases` - inspect release directories

use std::path::Path;

use anyhow::Result;

use crate::paths::DeployPaths;
use crate::release::ReleaseManager;

use super::{load_config, select_hosts};

pub fn cmd_releases(config_path: &Path, host: Option<&str>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let hosts = select_hosts(&config, host)?;

    for host in hosts {
        let manager = ReleaseManager::new(DeployPaths::new(&host.deploy_path));
        let releases = manager.list_releases()?;
        let current = manager.current_release().map(|r| r.id);

        if json {
            let line = serde_json::json!({
                "event": "releases",
                "host": host.name,
                "current": current.as_ref().map(|id| id.to_string()),
                "releases": releases.iter().map(|r| r.id.to_string()).collect::<Vec<_>>(),
            });
            println!("{line}");
            continue;
        }

        println!("📦 {} ({})", host.name, host.deploy_path.display());
        if releases.is_empty() {
            println!("  (no releases)");
            continue;
        }
        for release in &releases {
            let marker = if Some(&release.id) == current.as_ref() {
                "* "
            } else {
                "  "
            };
            println!("  {}{}", marker, release.id);
        }
    }
    Ok(())
}
