//! Housekeeping on existing runs: listing, cleaning, destroying and
//! reproducing them.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use walkdir::WalkDir;

use hogwarts_core::paths::{holds_marker, RUN_MARKER};
use hogwarts_core::{DescriptorStore, RunDescriptor, Workspace};

use crate::error::{io_err, LaunchError};
use crate::launch::{prepare, LaunchRequest, Prepared};

/// One row of `hogwarts runs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Path of the run relative to the house, `/`-separated.
    pub name: String,
    pub run_dir: PathBuf,
    pub created_at: DateTime<Utc>,
    pub sub_command: String,
    pub full_command: String,
    pub hsize: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunOrder {
    #[default]
    Date,
    Name,
}

/// Every run under the current house.
///
/// The walk never descends into a run directory, so snapshots of a house
/// that itself contains runs are not reported twice.
pub fn list_runs<S: DescriptorStore>(
    ws: &Workspace<S>,
    order: RunOrder,
) -> Result<Vec<RunSummary>, LaunchError> {
    let house_dir = ws.current_house_dir()?;
    let mut runs = Vec::new();

    let mut walker = WalkDir::new(&house_dir).min_depth(1).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        if !entry.file_type().is_dir() || !holds_marker(entry.path(), RUN_MARKER) {
            continue;
        }
        walker.skip_current_dir();

        let descriptor: RunDescriptor = ws.store().load(&entry.path().join(RUN_MARKER))?;
        runs.push(RunSummary {
            name: run_name(&house_dir, entry.path()),
            run_dir: entry.path().to_path_buf(),
            created_at: descriptor.created_at,
            sub_command: descriptor.sub_command,
            full_command: descriptor.full_command,
            hsize: descriptor.hsize,
        });
    }

    match order {
        RunOrder::Date => runs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        }),
        RunOrder::Name => runs.sort_by(|a, b| a.name.cmp(&b.name)),
    }
    Ok(runs)
}

fn run_name(house_dir: &Path, run_dir: &Path) -> String {
    run_dir
        .strip_prefix(house_dir)
        .unwrap_or(run_dir)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Result of [`clean_run`].
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub run_dir: PathBuf,
    pub removed: Vec<PathBuf>,
}

/// Remove everything in a run directory except its descriptor and snapshot.
pub fn clean_run<S: DescriptorStore>(
    ws: &Workspace<S>,
    name: Option<&str>,
) -> Result<Cleaned, LaunchError> {
    let (run_dir, descriptor) = ws.load_run(name)?;
    let keep_snapshot = run_dir.join(&descriptor.trg_dir_from_run);
    let keep_marker = run_dir.join(RUN_MARKER);

    let mut removed = Vec::new();
    for entry in fs::read_dir(&run_dir).map_err(|e| io_err(&run_dir, e))? {
        let path = entry.map_err(|e| io_err(&run_dir, e))?.path();
        if path == keep_snapshot || path == keep_marker {
            continue;
        }
        if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        }
        removed.push(path);
    }
    removed.sort();
    tracing::info!(run_dir = %run_dir.display(), removed = removed.len(), "cleaned run");
    Ok(Cleaned { run_dir, removed })
}

/// Delete a run directory wholesale. Returns the deleted directory.
pub fn destroy_run<S: DescriptorStore>(
    ws: &Workspace<S>,
    name: Option<&str>,
) -> Result<PathBuf, LaunchError> {
    let (run_dir, _) = ws.load_run(name)?;
    fs::remove_dir_all(&run_dir).map_err(|e| io_err(&run_dir, e))?;
    tracing::info!(run_dir = %run_dir.display(), "destroyed run");
    Ok(run_dir)
}

/// Launch a new run from the snapshot of an existing one.
///
/// `from` names the source run (`None` walks upward from the workspace
/// directory). The new run's command is the source run's `sub_command`;
/// its world size and mode default to the recorded ones.
pub fn reproduce<S, R, W>(
    ws: &Workspace<S>,
    from: Option<&str>,
    request: &LaunchRequest,
    answers: &mut R,
    out: &mut W,
) -> Result<Prepared, LaunchError>
where
    S: DescriptorStore + Clone,
    R: BufRead,
    W: Write,
{
    let (source_run, descriptor) = ws.load_run(from)?;
    let snapshot_dir = source_run.join(&descriptor.trg_dir_from_run);
    tracing::debug!(from = %source_run.display(), "reproducing run");

    let from_snapshot = Workspace::with_store(snapshot_dir, ws.store().clone());
    let request = LaunchRequest {
        command: Some(descriptor.sub_command),
        hsize: request.hsize.or(Some(descriptor.hsize)),
        parallel: request.parallel || descriptor.parallel,
        resume: false,
        ..request.clone()
    };
    prepare(&from_snapshot, &request, answers, out)
}
