//! `hogwarts runs` — enumerate the runs of the current house.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use hogwarts_core::Workspace;
use hogwarts_launch::{list_runs, RunOrder, RunSummary};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OrderArg {
    #[default]
    Date,
    Name,
}

impl From<OrderArg> for RunOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Date => RunOrder::Date,
            OrderArg::Name => RunOrder::Name,
        }
    }
}

/// Arguments for `hogwarts runs`.
#[derive(Args, Debug)]
pub struct RunsArgs {
    /// Sort by creation time or by name.
    #[arg(long, short = 'o', value_enum, default_value_t = OrderArg::Date)]
    pub order: OrderArg,

    /// Show each run's worker command.
    #[arg(long, short = 'c', conflicts_with = "full_command")]
    pub command: bool,

    /// Show only the full launcher invocation of each run.
    #[arg(long = "full-command")]
    pub full_command: bool,

    /// Emit machine-readable JSON.
    #[arg(long, conflicts_with_all = ["command", "full_command"])]
    pub json: bool,
}

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "wizard")]
    name: String,
    #[tabled(rename = "created")]
    created: String,
    #[tabled(rename = "hsize")]
    hsize: usize,
}

#[derive(Tabled)]
struct RunCommandRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "wizard")]
    name: String,
    #[tabled(rename = "command")]
    command: String,
}

impl RunsArgs {
    pub fn run(self) -> Result<()> {
        let ws = Workspace::from_current_dir()?;
        let runs = list_runs(&ws, self.order.into()).context("failed to list wizards")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&runs).context("failed to serialize wizards")?
            );
            return Ok(());
        }

        if runs.is_empty() {
            println!("No wizards in the current house.");
            println!("Run: hogwarts run <name> --command <cmd>");
            return Ok(());
        }

        if self.full_command {
            for (index, run) in runs.iter().enumerate() {
                println!("({index}) {}", run.full_command);
            }
            return Ok(());
        }

        let table = if self.command {
            Table::new(runs.iter().enumerate().map(|(index, run)| RunCommandRow {
                index,
                name: run.name.clone(),
                command: run.sub_command.clone(),
            }))
            .with(Style::rounded())
            .to_string()
        } else {
            Table::new(runs.iter().enumerate().map(summary_row))
                .with(Style::rounded())
                .to_string()
        };
        println!("{table}");
        println!("{}", format!("{} wizards", runs.len()).dimmed());
        Ok(())
    }
}

fn summary_row((index, run): (usize, &RunSummary)) -> RunRow {
    RunRow {
        index,
        name: run.name.clone(),
        created: run.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        hsize: run.hsize,
    }
}
