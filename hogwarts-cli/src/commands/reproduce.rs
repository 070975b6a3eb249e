//! `hogwarts reproduce [--from <run>] <name> [--force] [--hsize N] [--parallel]`

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use hogwarts_core::Workspace;
use hogwarts_launch::{reproduce, LaunchRequest};

use super::run::execute;

/// Launch a new run from an existing run's snapshot and command.
#[derive(Args, Debug)]
pub struct ReproduceArgs {
    /// Run to reproduce; the run enclosing the current directory when omitted.
    #[arg(long)]
    pub from: Option<String>,

    /// Name of the new run.
    pub name: String,

    /// Delete an existing run of the same name without asking.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Number of workers. Defaults to the source run's size.
    #[arg(long, short = 's')]
    pub hsize: Option<usize>,

    /// Start every worker at once. Implied when the source run was parallel.
    #[arg(long, short = 'p')]
    pub parallel: bool,
}

impl ReproduceArgs {
    pub fn run(self) -> Result<ExitCode> {
        let ws = Workspace::from_current_dir()?;
        let request = LaunchRequest {
            name: self.name.clone(),
            command: None,
            hsize: self.hsize,
            parallel: self.parallel,
            resume: false,
            force: self.force,
            argv: std::env::args().collect(),
        };

        let prepared = reproduce(
            &ws,
            self.from.as_deref(),
            &request,
            &mut io::stdin().lock(),
            &mut io::stdout(),
        )
        .with_context(|| format!("cannot reproduce into wizard '{}'", self.name))?;
        execute(prepared)
    }
}
