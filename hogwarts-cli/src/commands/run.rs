//! `hogwarts run <name> [--resume | --force] [--command <cmd>] [--hsize N] [--parallel]`

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hogwarts_core::Workspace;
use hogwarts_launch::{prepare, run_blocking, LaunchReport, LaunchRequest, Prepared};

/// Snapshot the current directory and launch a run, or resume one.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run name; the run lives at `<current house>/<name>`.
    pub name: String,

    /// Re-run the recorded command of an existing run without a new snapshot.
    #[arg(long, short = 'r', conflicts_with = "force")]
    pub resume: bool,

    /// Delete an existing run of the same name without asking.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Shell command each worker runs. Required unless resuming.
    #[arg(long, short = 'c')]
    pub command: Option<String>,

    /// Number of workers. Defaults to 1, or to the recorded size on resume.
    #[arg(long, short = 's')]
    pub hsize: Option<usize>,

    /// Start every worker at once instead of one after another.
    #[arg(long, short = 'p')]
    pub parallel: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<ExitCode> {
        let ws = Workspace::from_current_dir()?;
        let request = LaunchRequest {
            name: self.name.clone(),
            command: self.command,
            hsize: self.hsize,
            parallel: self.parallel,
            resume: self.resume,
            force: self.force,
            argv: std::env::args().collect(),
        };

        let prepared = prepare(&ws, &request, &mut io::stdin().lock(), &mut io::stdout())
            .with_context(|| format!("cannot launch wizard '{}'", self.name))?;
        execute(prepared)
    }
}

/// Run a prepared launch and turn its report into the process exit code.
pub(crate) fn execute(prepared: Prepared) -> Result<ExitCode> {
    let plan = match prepared {
        Prepared::Ready(plan) => plan,
        Prepared::Aborted => return Ok(ExitCode::SUCCESS),
    };

    println!(
        "{} {} wizard '{}' at {} ({} worker{}, {})",
        "✓".green(),
        if plan.resumed { "resuming" } else { "launching" },
        plan.run_name,
        plan.run_dir.display(),
        plan.hsize,
        if plan.hsize == 1 { "" } else { "s" },
        if plan.parallel { "parallel" } else { "sequential" },
    );

    let report = run_blocking(&plan)
        .with_context(|| format!("wizard '{}' failed to run", plan.run_name))?;
    summarize(&report);
    Ok(ExitCode::from(report.exit_code()))
}

fn summarize(report: &LaunchReport) {
    if report.interrupted {
        eprintln!(
            "{} interrupted after {}/{} workers",
            "!".yellow().bold(),
            report.workers.len(),
            report.planned,
        );
    } else if let Some(failed) = report.first_failure() {
        eprintln!(
            "{} worker {} {}",
            "✗".red().bold(),
            failed.label,
            failed.status,
        );
    }
}
