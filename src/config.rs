//! Configuration module for Shipwright
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (SSH_HOST, SSH_USER, PROJECT_PATH, ...)
//! 3. Project config (shipwright.toml)
//! 4. Built-in defaults (lowest priority)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, DeployResult};
use crate::models::{Host, SharedPath};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "shipwright.toml";

fn default_keep_releases() -> usize {
    3
}

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How many releases survive cleanup (the active one always does)
    #[serde(default = "default_keep_releases")]
    pub keep_releases: usize,

    /// Files that persist across releases via `shared/`
    #[serde(default)]
    pub shared_files: Vec<String>,

    /// Directories that persist across releases via `shared/`
    #[serde(default)]
    pub shared_dirs: Vec<String>,

    /// Directories made group-writable inside each release
    #[serde(default)]
    pub writable_dirs: Vec<String>,

    /// Relative paths excluded from the workspace sync
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Config file carried over from the previous release at bootstrap
    #[serde(default)]
    pub config_file: Option<String>,

    /// Web server user that ends up owning the deploy root
    #[serde(default)]
    pub http_user: Option<String>,

    /// Commands run before publishing when `config_file` is present
    /// in the release. `{release_path}` expands to the release dir.
    #[serde(default)]
    pub cache_commands: Vec<String>,

    /// Dependency install commands run inside every release before
    /// publishing (e.g. `composer install`). `{release_path}` expands
    /// to the release dir.
    #[serde(default)]
    pub install_commands: Vec<String>,

    /// Deploy targets
    #[serde(default)]
    pub hosts: Vec<Host>,
}

// Derived Default would zero keep_releases; construction and
// deserialization must agree on the documented default of 3.
impl Default for Config {
    fn default() -> Self {
        Self {
            keep_releases: default_keep_releases(),
            shared_files: Vec::new(),
            shared_dirs: Vec::new(),
            writable_dirs: Vec::new(),
            exclude: Vec::new(),
            config_file: None,
            http_user: None,
            cache_commands: Vec::new(),
            install_commands: Vec::new(),
            hosts: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load(path: &Path) -> DeployResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| DeployError::InvalidConfig {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(config)
    }

    /// Fold environment variables into the configuration.
    ///
    /// Mirrors the CI plumbing the original workflow used: a single
    /// host can be described entirely through `SSH_HOST`, `SSH_USER`,
    /// `PROJECT_PATH` and `GITHUB_WORKSPACE`. When `SSH_HOST` is set
    /// and no host of that address exists, a host named `default` is
    /// appended.
    pub fn apply_env(&mut self) {
        let addr = std::env::var("SSH_HOST").ok().filter(|v| !v.is_empty());
        let user = std::env::var("SSH_USER").ok().filter(|v| !v.is_empty());
        let deploy_path = std::env::var("PROJECT_PATH").ok().filter(|v| !v.is_empty());
        let workspace = std::env::var("GITHUB_WORKSPACE")
            .ok()
            .filter(|v| !v.is_empty());

        if let Ok(http_user) = std::env::var("HTTP_USER") {
            if !http_user.is_empty() {
                self.http_user = Some(http_user);
            }
        }

        if addr.is_none() && self.hosts.is_empty() {
            return;
        }

        if self.hosts.is_empty() {
            self.hosts.push(Host {
                name: "default".to_string(),
                address: addr.clone().unwrap_or_default(),
                user: user.clone().unwrap_or_default(),
                port: 22,
                deploy_path: PathBuf::new(),
                workspace: PathBuf::new(),
            });
        }

        // Env values override the first host only; multi-host setups
        // are expected to be fully described in the config file.
        let host = &mut self.hosts[0];
        if let Some(addr) = addr {
            host.address = addr;
        }
        if let Some(user) = user {
            host.user = user;
        }
        if let Some(deploy_path) = deploy_path {
            host.deploy_path = PathBuf::from(deploy_path);
        }
        if let Some(workspace) = workspace {
            host.workspace = PathBuf::from(workspace);
        }
    }

    /// Find a host by name
    pub fn host(&self, name: &str) -> DeployResult<&Host> {
        self.hosts
            .iter()
            .find(|h| h.name == name)
            .ok_or_else(|| DeployError::UnknownHost {
                name: name.to_string(),
            })
    }

    /// All shared paths, files first, in configuration order
    pub fn shared_paths(&self) -> Vec<SharedPath> {
        self.shared_files
            .iter()
            .chain(self.shared_dirs.iter())
            .map(SharedPath::new)
            .collect()
    }

    /// Directories among the shared paths (get seeded as empty dirs)
    pub fn is_shared_dir(&self, path: &SharedPath) -> bool {
        self.shared_dirs.iter().any(|d| d == path.as_str())
    }
}
