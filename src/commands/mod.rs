//! CLI command implementations

mod releases;
mod rollback;
mod run;
mod unlock;

pub use releases::cmd_releases;
pub use rollback::cmd_rollback;
pub use run::cmd_run;
pub use unlock::cmd_unlock;

use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::models::Host;

/// Load configuration and fold in environment overrides
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)?;
    config.apply_env();
    Ok(config)
}

/// Hosts selected by an optional `--host` flag
pub(crate) fn select_hosts<'c>(config: &'c Config, host: Option<&str>) -> Result<Vec<&'c Host>> {
    match host {
        Some(name) => Ok(vec![config.host(name)?]),
        None => {
            if config.hosts.is_empty() {
                anyhow::bail!(
                    "no hosts configured; add a [[hosts]] table or set SSH_HOST"
                );
            }
            Ok(config.hosts.iter().collect())
        }
    }
}
