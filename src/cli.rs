use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_FILE;

/// Shipwright - release-based deployment orchestrator
#[derive(Parser, Debug)]
#[command(name = "shipwright")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the workspace as a new release
    Run {
        /// Host to deploy (all configured hosts when omitted)
        #[arg(long)]
        host: Option<String>,

        /// Path to the configuration file
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,

        /// Resolve and print the plan without executing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Repoint current at the previous release
    Rollback {
        /// Host to roll back
        #[arg(long)]
        host: String,

        /// Path to the configuration file
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },

    /// List releases with the active one marked
    Releases {
        /// Host to inspect (all configured hosts when omitted)
        #[arg(long)]
        host: Option<String>,

        /// Path to the configuration file
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },

    /// Remove a stale deploy lock
    Unlock {
        /// Host to unlock
        #[arg(long)]
        host: String,

        /// Path to the configuration file
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run_defaults() {
        let cli = Cli::try_parse_from(["shipwright", "run"]).unwrap();
        if let Commands::Run {
            host,
            config,
            dry_run,
        } = cli.command
        {
            assert_eq!(host, None);
            assert_eq!(config, PathBuf::from("shipwright.toml"));
            assert!(!dry_run);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_run_with_args() {
        let cli = Cli::try_parse_from([
            "shipwright",
            "run",
            "--host",
            "web1",
            "--config",
            "deploy/shipwright.toml",
            "--dry-run",
        ])
        .unwrap();

        if let Commands::Run {
            host,
            config,
            dry_run,
        } = cli.command
        {
            assert_eq!(host.as_deref(), Some("web1"));
            assert_eq!(config, PathBuf::from("deploy/shipwright.toml"));
            assert!(dry_run);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_rollback_requires_host() {
        assert!(Cli::try_parse_from(["shipwright", "rollback"]).is_err());

        let cli = Cli::try_parse_from(["shipwright", "rollback", "--host", "web1"]).unwrap();
        assert!(matches!(cli.command, Commands::Rollback { ref host, .. } if host == "web1"));
    }

    #[test]
    fn test_cli_parse_releases() {
        let cli = Cli::try_parse_from(["shipwright", "releases"]).unwrap();
        assert!(matches!(cli.command, Commands::Releases { host: None, .. }));
    }

    #[test]
    fn test_cli_parse_unlock() {
        let cli = Cli::try_parse_from(["shipwright", "unlock", "--host", "web1"]).unwrap();
        assert!(matches!(cli.command, Commands::Unlock { ref host, .. } if host == "web1"));
    }

    #[test]
    fn test_cli_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["shipwright", "run", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Run { .. }));
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["shipwright", "-vv", "run"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
