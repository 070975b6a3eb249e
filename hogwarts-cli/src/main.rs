//! Hogwarts — experiment workspaces and multi-process job launcher.
//!
//! # Usage
//!
//! ```text
//! hogwarts workspace --build hogwarts|house
//! hogwarts workspace --switch <house> | --delete <house>
//! hogwarts run <name> [--resume | --force] [--command <cmd>] [--hsize N] [--parallel]
//! hogwarts list
//! hogwarts runs [--order date|name] [--command | --full-command] [--json]
//! hogwarts clean [name]
//! hogwarts destroy [name]
//! hogwarts reproduce [--from <run>] <name> [--force] [--hsize N] [--parallel]
//! hogwarts where hogwarts|house|run [name]
//! ```

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    clean::CleanArgs, destroy::DestroyArgs, locate::WhereArgs, reproduce::ReproduceArgs,
    run::RunArgs, runs::RunsArgs, workspace::WorkspaceArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "hogwarts",
    version,
    about = "Snapshot experiment sources and launch them as multi-process runs",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the registry or a house, or switch / delete houses.
    Workspace(WorkspaceArgs),

    /// Snapshot the current directory and launch a run, or resume one.
    Run(RunArgs),

    /// Print the registry root and the current house.
    List,

    /// List every run under the current house.
    Runs(RunsArgs),

    /// Remove a run's logs, keeping its descriptor and snapshot.
    Clean(CleanArgs),

    /// Delete a run directory.
    Destroy(DestroyArgs),

    /// Launch a new run from an existing run's snapshot and command.
    Reproduce(ReproduceArgs),

    /// Print one resolved directory.
    Where(WhereArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Workspace(args) => args.run().map(|()| ExitCode::SUCCESS),
        Commands::Run(args) => args.run(),
        Commands::List => commands::list::run().map(|()| ExitCode::SUCCESS),
        Commands::Runs(args) => args.run().map(|()| ExitCode::SUCCESS),
        Commands::Clean(args) => args.run().map(|()| ExitCode::SUCCESS),
        Commands::Destroy(args) => args.run().map(|()| ExitCode::SUCCESS),
        Commands::Reproduce(args) => args.run(),
        Commands::Where(args) => args.run().map(|()| ExitCode::SUCCESS),
    }
}

/// Diagnostics go to stderr; stdout is left to command output and workers.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
