//! Release Manager
//!
//! Creates timestamped release directories, lists them newest-first and
//! prunes superseded ones. The release pointed at by `current` is never
//! pruned, whatever its age.

use std::fs;
use std::path::Path;

use crate::error::{DeployError, DeployResult};
use crate::models::{Release, ReleaseId, ReleaseStatus};
use crate::paths::DeployPaths;

/// Manages the `releases/` directory of one deploy root
#[derive(Debug, Clone)]
pub struct ReleaseManager {
    paths: DeployPaths,
}

impl ReleaseManager {
    pub fn new(paths: DeployPaths) -> Self {
        Self { paths }
    }

    /// Allocate a new release directory for `id`.
    ///
    /// Two runs landing on the same second produce the same id; the
    /// second one fails with `PathConflict` instead of reusing the
    /// directory.
    pub fn create_release(&self, id: ReleaseId) -> DeployResult<Release> {
        let path = self.paths.release_dir(&id);
        if path.exists() {
            return Err(DeployError::PathConflict {
                id: id.to_string(),
                path,
            });
        }
        fs::create_dir_all(&path)?;
        Ok(Release::new(id, path))
    }

    /// Existing releases, newest first.
    ///
    /// Re-reads the directory on every call. Entries that are not
    /// timestamp-shaped are skipped.
    pub fn list_releases(&self) -> DeployResult<Vec<Release>> {
        let releases_dir = self.paths.releases_dir();
        if !releases_dir.exists() {
            return Ok(Vec::new());
        }

        let mut releases = Vec::new();
        for entry in fs::read_dir(&releases_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            if let Some(id) = ReleaseId::parse(&name.to_string_lossy()) {
                releases.push(Release::new(id, entry.path()));
            }
        }

        // Fixed-width ids: chronological == lexicographic
        releases.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(releases)
    }

    /// The release `current` resolves to, if the link exists
    pub fn current_release(&self) -> Option<Release> {
        let target = fs::read_link(self.paths.current_link()).ok()?;
        let target = if target.is_absolute() {
            target
        } else {
            self.paths.root().join(target)
        };
        let name = target.file_name()?.to_string_lossy().into_owned();
        let id = ReleaseId::parse(&name)?;
        let mut release = Release::new(id, target);
        release.status = ReleaseStatus::Active;
        Some(release)
    }

    /// Delete all but the `keep` newest releases.
    ///
    /// The active release is exempt even when it falls outside the
    /// window (e.g. after a rollback). Returns the pruned ids.
    pub fn prune(&self, keep: usize) -> DeployResult<Vec<ReleaseId>> {
        let releases = self.list_releases()?;
        let current = self.current_release().map(|r| r.id);

        let mut pruned = Vec::new();
        for release in releases.iter().skip(keep) {
            if Some(&release.id) == current.as_ref() {
                continue;
            }
            fs::remove_dir_all(&release.path)?;
            pruned.push(release.id.clone());
        }
        Ok(pruned)
    }
}
