//! `hogwarts where <hogwarts|house|run> [name]`

use anyhow::Result;
use clap::{Args, ValueEnum};

use hogwarts_core::{Presence, Workspace};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Level {
    Hogwarts,
    House,
    Run,
}

/// Print one resolved directory, for use in scripts such as `cd "$(hogwarts where house)"`.
#[derive(Args, Debug)]
pub struct WhereArgs {
    #[arg(value_enum)]
    pub level: Level,

    /// House or run name; the current house, or the enclosing run, when omitted.
    pub name: Option<String>,
}

impl WhereArgs {
    pub fn run(self) -> Result<()> {
        let ws = Workspace::from_current_dir()?;
        let name = self.name.as_deref();
        let dir = match self.level {
            Level::Hogwarts => ws.registry_dir()?,
            Level::House => ws
                .find_house(name, Presence::MustExist)?
                .unwrap_or_default(),
            Level::Run => ws.find_run(name, Presence::MustExist)?.unwrap_or_default(),
        };
        println!("{}", dir.display());
        Ok(())
    }
}
