//! Shared-Resource Linker
//!
//! Exactly one authoritative copy of each shared path lives under
//! `shared/`; every release holds a symlink to it. Absent shared paths
//! are seeded from the most recent prior release so data like uploads
//! and config survive the first orchestrated deploy.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;

use crate::error::{DeployError, DeployResult};
use crate::models::{Release, SharedPath};
use crate::paths::DeployPaths;
use crate::sync::copy_tree;

/// Links shared files and directories into a release
#[derive(Debug, Clone)]
pub struct SharedResourceLinker {
    paths: DeployPaths,
}

impl SharedResourceLinker {
    pub fn new(paths: DeployPaths) -> Self {
        Self { paths }
    }

    /// Link every configured shared path into `release`.
    ///
    /// For each path:
    /// 1. If `shared/<path>` is absent, seed it from `prior` when the
    ///    prior release has it. Otherwise directories get an empty
    ///    shared directory; files stay absent until the app creates
    ///    them through the link's parent.
    /// 2. Drop any synced copy inside the release and replace it with
    ///    a symlink to the shared copy.
    ///
    /// `dirs` marks which of `shared_paths` are directories (they need
    /// an empty seed and an existing link target).
    pub fn link_all(
        &self,
        release: &Release,
        shared_paths: &[SharedPath],
        dirs: &[SharedPath],
        prior: Option<&Release>,
    ) -> DeployResult<()> {
        let shared_root = self.paths.shared_dir();
        fs::create_dir_all(&shared_root).map_err(|e| DeployError::MissingParent {
            path: shared_root.clone(),
            source: e,
        })?;

        for sp in shared_paths {
            let shared_copy = sp.in_shared(&shared_root);
            let is_dir = dirs.contains(sp);

            if !exists_no_follow(&shared_copy) {
                self.seed(sp, &shared_copy, is_dir, prior)?;
            }

            let in_release = sp.in_release(&release.path);
            if exists_no_follow(&in_release) {
                remove_any(&in_release)?;
            }
            if let Some(parent) = in_release.parent() {
                fs::create_dir_all(parent).map_err(|e| DeployError::MissingParent {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }

            // Files may legitimately be absent from shared; link anyway
            // so the first write through the release lands in shared/.
            symlink(&shared_copy, &in_release)?;
        }
        Ok(())
    }

    fn seed(
        &self,
        sp: &SharedPath,
        shared_copy: &Path,
        is_dir: bool,
        prior: Option<&Release>,
    ) -> DeployResult<()> {
        if let Some(parent) = shared_copy.parent() {
            fs::create_dir_all(parent).map_err(|e| DeployError::MissingParent {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        if let Some(prior) = prior {
            let source = sp.in_release(&prior.path);
            // Symlinks in the prior release already point into shared/
            let meta = fs::symlink_metadata(&source).ok();
            if let Some(meta) = meta {
                if meta.is_dir() {
                    copy_tree(&source, shared_copy, &[])?;
                    return Ok(());
                }
                if meta.is_file() {
                    fs::copy(&source, shared_copy)?;
                    return Ok(());
                }
            }
        }

        if is_dir {
            fs::create_dir_all(shared_copy)?;
        }
        Ok(())
    }
}

/// `Path::exists` follows symlinks; a dangling link would read as
/// absent and then collide with `symlink()`. Check the entry itself.
fn exists_no_follow(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn remove_any(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
