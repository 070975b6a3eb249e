//! `hogwarts workspace --build|--switch|--delete <name>`

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use colored::Colorize;

use hogwarts_core::{BuildTarget, Workspace};

use super::house_label;

/// Build the registry or a house, or switch / delete houses.
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["build", "switch", "delete"]),
))]
pub struct WorkspaceArgs {
    /// Build `hogwarts` (the registry) or a `house` at the current directory.
    #[arg(long, short = 'b')]
    pub build: bool,

    /// Make the named house current.
    #[arg(long, short = 's')]
    pub switch: bool,

    /// Unregister the named house. Its directory is left on disk.
    #[arg(long, short = 'd')]
    pub delete: bool,

    /// `hogwarts` or `house` with --build; a house name otherwise.
    pub name: String,
}

impl WorkspaceArgs {
    pub fn run(self) -> Result<()> {
        let ws = Workspace::from_current_dir()?;

        if self.build {
            match self.name.parse::<BuildTarget>()? {
                BuildTarget::Hogwarts => {
                    let marker = ws.build_registry().context("cannot build hogwarts")?;
                    println!("{} built hogwarts at {}", "✓".green(), marker.display());
                }
                BuildTarget::House => {
                    let built = ws.build_house().context("cannot build house")?;
                    println!("{} built house at {}", "✓".green(), built.marker.display());
                    println!(
                        "  switched house from {} to {}",
                        house_label(built.switch.previous.as_ref()),
                        house_label(built.switch.current.as_ref()),
                    );
                }
            }
        } else if self.switch {
            let switch = ws
                .switch_house(&self.name)
                .with_context(|| format!("cannot switch to house '{}'", self.name))?;
            println!(
                "{} switched house from {} to {}",
                "✓".green(),
                house_label(switch.previous.as_ref()),
                house_label(switch.current.as_ref()),
            );
        } else {
            let switch = ws
                .delete_house(&self.name)
                .with_context(|| format!("cannot delete house '{}'", self.name))?;
            println!(
                "{} deleted house {}, current house is {}",
                "✓".green(),
                self.name,
                house_label(switch.current.as_ref()),
            );
        }
        Ok(())
    }
}
