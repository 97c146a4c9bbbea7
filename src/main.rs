//! Shipwright CLI - release-based deployment orchestrator
//!
//! Usage: shipwright <COMMAND>
//!
//! Commands:
//!   run       Deploy the workspace as a new release
//!   rollback  Repoint current at the previous release
//!   releases  List releases with the active one marked
//!   unlock    Remove a stale deploy lock

use anyhow::Result;
use clap::Parser;

use shipwright::cli::{Cli, Commands};
use shipwright::commands::{cmd_releases, cmd_rollback, cmd_run, cmd_unlock};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            ref host,
            ref config,
            dry_run,
        } => cmd_run(config, host.as_deref(), dry_run, cli.json, cli.verbose),
        Commands::Rollback { ref host, ref config } => cmd_rollback(config, host, cli.json),
        Commands::Releases { ref host, ref config } => {
            cmd_releases(config, host.as_deref(), cli.json)
        }
        Commands::Unlock { ref host, ref config } => cmd_unlock(config, host, cli.json),
    }
}
