//! Launching runs: snapshot the source tree, then spawn one worker process
//! per rank.
//!
//! - [`launch`] — [`prepare`] a [`LaunchRequest`] into a [`LaunchPlan`]
//! - [`snapshot`] — copy the source tree and write the run descriptor
//! - [`orchestrator`] — spawn and wait for workers, handle interrupts
//! - [`maintenance`] — list, clean, destroy and reproduce runs
//! - [`ranks`], [`env`], [`prompt`] — rank ids, worker environment, conflict prompt

mod error;

pub mod env;
pub mod launch;
pub mod maintenance;
pub mod orchestrator;
pub mod prompt;
pub mod ranks;
pub mod snapshot;

pub use env::WorkerEnv;
pub use error::LaunchError;
pub use launch::{prepare, LaunchPlan, LaunchRequest, Prepared, WorkerSpec};
pub use maintenance::{clean_run, destroy_run, list_runs, reproduce, Cleaned, RunOrder, RunSummary};
pub use orchestrator::{run, run_blocking, LaunchReport, WorkerOutcome};
pub use prompt::ConflictChoice;
