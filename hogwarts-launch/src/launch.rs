//! Turning a `run` request into a concrete launch plan.
//!
//! [`prepare`] settles every decision (conflict policy, command, world size)
//! before it touches the filesystem, then either snapshots a fresh run or
//! reads the descriptor of the run being resumed. The returned
//! [`LaunchPlan`] is everything the orchestrator needs; nothing is spawned
//! here.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Component, Path, PathBuf};

use hogwarts_core::{DescriptorStore, Workspace};

use crate::env::WorkerEnv;
use crate::error::{io_err, LaunchError};
use crate::prompt::{prompt_conflict, ConflictChoice};
use crate::ranks::rank_ids;
use crate::snapshot::{self, SnapshotRequest};

/// Parameters of one `run` invocation.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub name: String,
    /// Required unless resuming.
    pub command: Option<String>,
    /// `None` means 1 for a fresh run and the recorded size on resume.
    pub hsize: Option<usize>,
    pub parallel: bool,
    pub resume: bool,
    pub force: bool,
    /// The launcher's own argv, recorded as the descriptor's `full_command`.
    pub argv: Vec<String>,
}

#[derive(Debug)]
pub enum Prepared {
    Ready(LaunchPlan),
    /// The user declined at the conflict prompt. Nothing was changed.
    Aborted,
}

/// A run directory ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub run_name: String,
    pub run_dir: PathBuf,
    /// Snapshot copy of the source tree; every worker's working directory.
    pub target_dir: PathBuf,
    pub command: String,
    pub hsize: usize,
    pub parallel: bool,
    pub resumed: bool,
}

/// One process to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSpec {
    pub command: String,
    pub cwd: PathBuf,
    pub env: WorkerEnv,
}

impl LaunchPlan {
    /// Worker specs in rank order, drawn from a freshly seeded sequence.
    pub fn workers(&self) -> Vec<WorkerSpec> {
        rank_ids(self.hsize)
            .into_iter()
            .map(|rank| WorkerSpec {
                command: self.command.clone(),
                cwd: self.target_dir.clone(),
                env: WorkerEnv::new(&self.run_name, &self.run_dir, rank, self.hsize),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Fresh,
    Overwrite,
    Resume,
}

/// Resolve the run for `request`, prompting on `answers`/`out` when the run
/// directory already exists and neither `force` nor `resume` was given.
///
/// The source tree is the workspace's start directory.
pub fn prepare<S, R, W>(
    ws: &Workspace<S>,
    request: &LaunchRequest,
    answers: &mut R,
    out: &mut W,
) -> Result<Prepared, LaunchError>
where
    S: DescriptorStore,
    R: BufRead,
    W: Write,
{
    if request.force && request.resume {
        return Err(LaunchError::ForceWithResume);
    }
    if request.hsize == Some(0) {
        return Err(LaunchError::InvalidWorkerCount(0));
    }
    check_run_name(&request.name)?;

    let registry_dir = ws.registry_dir()?;
    let house_dir = ws.current_house_dir()?;
    let source_dir = ws.cwd();
    snapshot::check_source(source_dir, &registry_dir, &house_dir)?;

    let run_dir = house_dir.join(&request.name);
    let decision = if run_dir.is_dir() {
        if request.force {
            Decision::Overwrite
        } else if request.resume {
            Decision::Resume
        } else {
            let overwrite_allowed = request.command.is_some();
            match prompt_conflict(answers, out, &request.name, &run_dir, overwrite_allowed)
                .map_err(|e| io_err(&run_dir, e))?
            {
                ConflictChoice::Overwrite => Decision::Overwrite,
                ConflictChoice::Resume => Decision::Resume,
                ConflictChoice::Abort => return Ok(Prepared::Aborted),
            }
        }
    } else if request.resume {
        Decision::Resume
    } else {
        Decision::Fresh
    };
    tracing::debug!(run = %request.name, ?decision, "conflict policy resolved");

    if decision == Decision::Resume {
        return resume(ws, request).map(Prepared::Ready);
    }

    let command = request.command.clone().ok_or(LaunchError::MissingCommand)?;
    if decision == Decision::Overwrite {
        snapshot::check_overwrite(source_dir, &run_dir)?;
        fs::remove_dir_all(&run_dir).map_err(|e| io_err(&run_dir, e))?;
        tracing::info!(run_dir = %run_dir.display(), "removed existing run");
    }

    let hsize = request.hsize.unwrap_or(1);
    let descriptor = snapshot::create(
        ws.store(),
        &SnapshotRequest {
            run_dir: &run_dir,
            source_dir,
            house_dir: &house_dir,
            command: &command,
            full_command: snapshot::full_command(&request.argv),
            hsize,
            parallel: request.parallel,
        },
    )?;

    Ok(Prepared::Ready(LaunchPlan {
        run_name: request.name.clone(),
        target_dir: run_dir.join(&descriptor.trg_dir_from_run),
        run_dir,
        command,
        hsize,
        parallel: request.parallel,
        resumed: false,
    }))
}

fn resume<S: DescriptorStore>(
    ws: &Workspace<S>,
    request: &LaunchRequest,
) -> Result<LaunchPlan, LaunchError> {
    let (run_dir, descriptor) = ws.load_run(Some(&request.name))?;
    if let Some(ignored) = &request.command {
        if ignored != &descriptor.sub_command {
            tracing::warn!(
                run = %request.name,
                recorded = %descriptor.sub_command,
                "resume ignores --command {ignored:?}; re-running the recorded command",
            );
        }
    }

    Ok(LaunchPlan {
        run_name: request.name.clone(),
        target_dir: run_dir.join(&descriptor.trg_dir_from_run),
        run_dir,
        command: descriptor.sub_command,
        hsize: request.hsize.unwrap_or(descriptor.hsize.max(1)),
        parallel: request.parallel,
        resumed: true,
    })
}

fn check_run_name(name: &str) -> Result<(), LaunchError> {
    let path = Path::new(name);
    let plain = !name.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(())
    } else {
        Err(LaunchError::InvalidRunName(name.to_string()))
    }
}
