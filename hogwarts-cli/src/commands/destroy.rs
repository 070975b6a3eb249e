//! `hogwarts destroy [name]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hogwarts_core::Workspace;
use hogwarts_launch::destroy_run;

/// Delete a run directory.
#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Run name; the run enclosing the current directory when omitted.
    pub name: Option<String>,
}

impl DestroyArgs {
    pub fn run(self) -> Result<()> {
        let ws = Workspace::from_current_dir()?;
        let run_dir = destroy_run(&ws, self.name.as_deref()).context("cannot destroy wizard")?;
        println!("{} destroyed {}", "✓".green(), run_dir.display());
        Ok(())
    }
}
