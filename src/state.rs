//! Persisted run state under `.dep/`
//!
//! The latest-release marker is a plain text file holding the id of the
//! most recently published release. The bootstrap config carry-over
//! step consults it before the new release even exists.

use std::fs;
use std::path::Path;

use crate::error::DeployResult;
use crate::models::ReleaseId;

const MARKER_FILE: &str = "latest_release";

/// Read the latest successful release id, if any was ever recorded
pub fn read_latest(dep_dir: &Path) -> Option<ReleaseId> {
    let marker = dep_dir.join(MARKER_FILE);
    let content = fs::read_to_string(marker).ok()?;
    ReleaseId::parse(content.trim())
}

/// Record a release id as the latest successful one
pub fn write_latest(dep_dir: &Path, id: &ReleaseId) -> DeployResult<()> {
    fs::create_dir_all(dep_dir)?;
    fs::write(dep_dir.join(MARKER_FILE), format!("{id}\n"))?;
    Ok(())
}
