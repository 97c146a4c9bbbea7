//! Deploy-level lock file
//!
//! One lock per deploy root. Acquisition never blocks: a second run
//! against the same root fails fast with `AlreadyDeploying`.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{DeployError, DeployResult};

/// Exclusive lock over a deploy root, held for the duration of a run.
///
/// Backed by an advisory file lock so it also excludes runs started
/// from other processes. Dropping the guard releases the lock; calling
/// [`DeployLock::release`] additionally removes the lock file.
#[derive(Debug)]
pub struct DeployLock {
    file: File,
    path: PathBuf,
}

impl DeployLock {
    /// Try to acquire the lock at `path`, creating parent directories
    /// as needed. Fails fast with `AlreadyDeploying` when the lock is
    /// held elsewhere.
    pub fn acquire(path: &Path) -> DeployResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                file,
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Err(DeployError::AlreadyDeploying {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock and remove the lock file
    pub fn release(self) -> DeployResult<()> {
        FileExt::unlock(&self.file)?;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Remove a lock file without holding it. Used by `unlock` to clear
/// stale locks left behind by a crashed run.
pub fn force_unlock(path: &Path) -> DeployResult<bool> {
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn acquire_creates_lock_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".dep").join("deploy.lock");

        let lock = DeployLock::acquire(&path).unwrap();
        assert!(path.exists());
        lock.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn second_acquire_fails_fast() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deploy.lock");

        let _held = DeployLock::acquire(&path).unwrap();
        let err = DeployLock::acquire(&path).unwrap_err();

        assert!(matches!(err, DeployError::AlreadyDeploying { .. }));
    }

    #[test]
    fn lock_is_reacquirable_after_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deploy.lock");

        DeployLock::acquire(&path).unwrap().release().unwrap();
        let lock = DeployLock::acquire(&path).unwrap();
        lock.release().unwrap();
    }

    #[test]
    fn force_unlock_removes_stale_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deploy.lock");
        std::fs::write(&path, "").unwrap();

        assert!(force_unlock(&path).unwrap());
        assert!(!path.exists());
        assert!(!force_unlock(&path).unwrap());
    }
}
