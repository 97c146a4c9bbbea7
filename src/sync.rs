//! Workspace-to-release file sync
//!
//! Copies the prepared workspace tree into a release directory,
//! honoring the configured exclusion list. Transport to remote hosts
//! is out of scope; the deploy root is reachable through the local
//! filesystem.

use std::fs;
use std::path::Path;

use crate::error::DeployResult;

/// Copy `src` into `dst` recursively, skipping excluded paths.
///
/// Exclusions are relative paths matched exactly or as a directory
/// prefix: `"vendor"` excludes `vendor` and everything below it,
/// `"public/assets"` only that subtree. Symlinks in the workspace are
/// not followed and not copied.
pub fn copy_tree(src: &Path, dst: &Path, exclude: &[String]) -> DeployResult<usize> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;
    copy_dir(src, dst, src, exclude, &mut copied)?;
    Ok(copied)
}

fn copy_dir(
    dir: &Path,
    dst_root: &Path,
    src_root: &Path,
    exclude: &[String],
    copied: &mut usize,
) -> DeployResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // read_dir only yields paths under the walked root
        let Ok(rel) = path.strip_prefix(src_root) else {
            continue;
        };
        let rel = rel.to_path_buf();

        if is_excluded(&rel, exclude) {
            continue;
        }

        let file_type = entry.file_type()?;
        let target = dst_root.join(&rel);

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
            copy_dir(&path, dst_root, src_root, exclude, copied)?;
        } else if file_type.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&path, &target)?;
            *copied += 1;
        }
        // Symlinks are skipped: shared links get recreated per release
    }
    Ok(())
}

fn is_excluded(rel: &Path, exclude: &[String]) -> bool {
    let rel = rel.to_string_lossy();
    exclude
        .iter()
        .any(|ex| rel.as_ref() == ex.as_str() || rel.starts_with(&format!("{ex}/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn copies_nested_tree() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        write(src.path(), "index.php", "<?php");
        write(src.path(), "public/js/app.js", "js");

        let copied = copy_tree(src.path(), dst.path(), &[]).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(dst.path().join("public/js/app.js")).unwrap(),
            "js"
        );
    }

    #[test]
    fn excludes_exact_path_and_subtree() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        write(src.path(), "index.php", "<?php");
        write(src.path(), ".git/HEAD", "ref");
        write(src.path(), "vendor/lib/a.php", "lib");
        write(src.path(), "config.php", "secret");

        let exclude = vec![
            ".git".to_string(),
            "vendor".to_string(),
            "config.php".to_string(),
        ];
        copy_tree(src.path(), dst.path(), &exclude).unwrap();

        assert!(dst.path().join("index.php").exists());
        assert!(!dst.path().join(".git").exists());
        assert!(!dst.path().join("vendor").exists());
        assert!(!dst.path().join("config.php").exists());
    }

    #[test]
    fn exclusion_is_not_a_substring_match() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        write(src.path(), "storage-notes.md", "keep me");

        copy_tree(src.path(), dst.path(), &["storage".to_string()]).unwrap();

        assert!(dst.path().join("storage-notes.md").exists());
    }

    #[test]
    fn skips_symlinks() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        write(src.path(), "real.txt", "x");
        std::os::unix::fs::symlink(src.path().join("real.txt"), src.path().join("link.txt"))
            .unwrap();

        copy_tree(src.path(), dst.path(), &[]).unwrap();

        assert!(dst.path().join("real.txt").exists());
        assert!(fs::symlink_metadata(dst.path().join("link.txt")).is_err());
    }

    #[test]
    fn empty_source_copies_nothing() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        assert_eq!(copy_tree(src.path(), dst.path(), &[]).unwrap(), 0);
    }
}
