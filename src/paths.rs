//! Well-known locations inside a deploy root.

use std::path::{Path, PathBuf};

use crate::models::ReleaseId;

/// Layout of a deploy root:
///
/// ```text
/// <root>/
///   releases/<timestamp>/   one directory per release
///   shared/                 persistent files and directories
///   current -> releases/... published release
///   .dep/                   orchestrator state (lock, latest marker)
/// ```
#[derive(Debug, Clone)]
pub struct DeployPaths {
    root: PathBuf,
}

impl DeployPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.root.join("releases")
    }

    pub fn release_dir(&self, id: &ReleaseId) -> PathBuf {
        self.releases_dir().join(id.as_str())
    }

    pub fn shared_dir(&self) -> PathBuf {
        self.root.join("shared")
    }

    pub fn current_link(&self) -> PathBuf {
        self.root.join("current")
    }

    pub fn dep_dir(&self) -> PathBuf {
        self.root.join(".dep")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.dep_dir().join("deploy.lock")
    }

    pub fn latest_marker(&self) -> PathBuf {
        self.dep_dir().join("latest_release")
    }
}
