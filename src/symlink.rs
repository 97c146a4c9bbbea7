//! Symlink Switcher
//!
//! Atomic repoint of the `current` symlink. The new link is written
//! under a temporary name and renamed over the old one, so a concurrent
//! reader observes either the previous or the new target, never a
//! missing link.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use crate::error::{DeployError, DeployResult};
use crate::models::Release;
use crate::paths::DeployPaths;

/// Switches the `current` pointer of one deploy root
#[derive(Debug, Clone)]
pub struct SymlinkSwitcher {
    paths: DeployPaths,
}

impl SymlinkSwitcher {
    pub fn new(paths: DeployPaths) -> Self {
        Self { paths }
    }

    /// Atomically repoint `current` at `release`.
    ///
    /// Fails with `SwitchFailed` when the release path does not exist
    /// or is not a directory (a half-provisioned release must never be
    /// published).
    pub fn switch(&self, release: &Release) -> DeployResult<()> {
        if !release.path.exists() {
            return Err(DeployError::SwitchFailed {
                path: release.path.clone(),
                reason: "release path does not exist".to_string(),
            });
        }
        if !release.path.is_dir() {
            return Err(DeployError::SwitchFailed {
                path: release.path.clone(),
                reason: "release path is not a directory".to_string(),
            });
        }

        let current = self.paths.current_link();
        let staged = self
            .paths
            .root()
            .join(format!("current.{}.tmp", std::process::id()));

        // A stale staging link from a crashed run would make symlink() fail
        if fs::symlink_metadata(&staged).is_ok() {
            fs::remove_file(&staged)?;
        }

        symlink(&release.path, &staged)?;
        if let Err(e) = fs::rename(&staged, &current) {
            let _ = fs::remove_file(&staged);
            return Err(DeployError::SwitchFailed {
                path: release.path.clone(),
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    /// Where `current` points, or `None` before the first deploy
    pub fn current_target(&self) -> Option<PathBuf> {
        let target = fs::read_link(self.paths.current_link()).ok()?;
        if target.is_absolute() {
            Some(target)
        } else {
            Some(self.paths.root().join(target))
        }
    }
}

/// Convenience used by status-style commands: resolve `current` of an
/// arbitrary deploy root without constructing a switcher.
pub fn read_current(root: &Path) -> Option<PathBuf> {
    SymlinkSwitcher::new(DeployPaths::new(root)).current_target()
}
