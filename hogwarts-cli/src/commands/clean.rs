//! `hogwarts clean [name]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hogwarts_core::Workspace;
use hogwarts_launch::clean_run;

/// Remove a run's logs, keeping its descriptor and snapshot.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Run name; the run enclosing the current directory when omitted.
    pub name: Option<String>,
}

impl CleanArgs {
    pub fn run(self) -> Result<()> {
        let ws = Workspace::from_current_dir()?;
        let cleaned = clean_run(&ws, self.name.as_deref()).context("cannot clean wizard")?;

        println!(
            "{} cleaned {} ({} entries removed)",
            "✓".green(),
            cleaned.run_dir.display(),
            cleaned.removed.len(),
        );
        for path in &cleaned.removed {
            println!("  - {}", path.display());
        }
        Ok(())
    }
}
