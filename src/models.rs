//! Core data model: releases, hosts, shared paths.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format used for release directory names, e.g. `20250101120000`.
///
/// Fixed-width, so lexicographic order equals chronological order.
pub const RELEASE_ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Timestamp identifier of a release directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Allocate an id from the current wall clock
    pub fn now() -> Self {
        Self(Utc::now().format(RELEASE_ID_FORMAT).to_string())
    }

    /// Parse a directory name as a release id.
    ///
    /// Returns `None` for entries that are not timestamp-shaped, so
    /// stray files under `releases/` are ignored rather than pruned.
    pub fn parse(name: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(name, RELEASE_ID_FORMAT)
            .ok()
            .map(|_| Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a release directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    /// Created but not yet published
    Pending,
    /// Published: `current` points here
    Active,
    /// A deploy into this directory failed before publishing
    Failed,
    /// Superseded and deleted by cleanup
    Pruned,
}

/// One versioned snapshot under `releases/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub id: ReleaseId,
    pub path: PathBuf,
    pub status: ReleaseStatus,
}

impl Release {
    pub fn new(id: ReleaseId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            status: ReleaseStatus::Pending,
        }
    }
}

/// Connection parameters and paths for one deploy target.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    pub address: String,
    pub user: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deploy root: holds `releases/`, `shared/`, `current`, `.dep/`
    pub deploy_path: PathBuf,
    /// Source tree that gets synced into each release
    pub workspace: PathBuf,
}

fn default_port() -> u16 {
    22
}

/// A relative path that must be link-identical across all releases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedPath(String);

impl SharedPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the authoritative copy under the shared root
    pub fn in_shared(&self, shared_root: &Path) -> PathBuf {
        shared_root.join(&self.0)
    }

    /// Path of the link inside a release directory
    pub fn in_release(&self, release_path: &Path) -> PathBuf {
        release_path.join(&self.0)
    }
}

impl fmt::Display for SharedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
