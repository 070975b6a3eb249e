//! Freezing a source tree into a new run directory.
//!
//! ## `create` — 3-step protocol
//!
//! 1. Create the run directory.
//! 2. Copy the source tree into `<run dir>/<source dir name>`.
//! 3. Write the run descriptor.
//!
//! A copy that fails part-way leaves a directory without a descriptor, which
//! is never mistaken for a run.
//!
//! The copy never descends into the run directory being created, nor into
//! any other directory holding a run marker, so a house that already
//! contains runs can be snapshotted from its own root.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use walkdir::{DirEntry, WalkDir};

use hogwarts_core::paths::{dir_name, relative_path, RUN_MARKER};
use hogwarts_core::{DescriptorStore, RunDescriptor};

use crate::error::{io_err, LaunchError};

/// Everything needed to freeze one run.
#[derive(Debug, Clone)]
pub struct SnapshotRequest<'a> {
    pub run_dir: &'a Path,
    pub source_dir: &'a Path,
    pub house_dir: &'a Path,
    pub command: &'a str,
    pub full_command: String,
    pub hsize: usize,
    pub parallel: bool,
}

/// Reject source directories whose snapshot would copy the registry marker
/// or the house into itself.
pub fn check_source(
    source_dir: &Path,
    registry_dir: &Path,
    house_dir: &Path,
) -> Result<(), LaunchError> {
    if source_dir == registry_dir {
        return Err(LaunchError::SourceIsRegistryRoot {
            path: source_dir.to_path_buf(),
        });
    }
    if house_dir != source_dir && house_dir.starts_with(source_dir) {
        return Err(LaunchError::SourceContainsHouse {
            source_dir: source_dir.to_path_buf(),
            house: house_dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Reject overwriting a run directory that contains the source tree.
pub fn check_overwrite(source_dir: &Path, run_dir: &Path) -> Result<(), LaunchError> {
    if source_dir.starts_with(run_dir) {
        return Err(LaunchError::SourceInsideRun {
            source_dir: source_dir.to_path_buf(),
            run_dir: run_dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Reconstruct the launcher invocation for the descriptor.
///
/// `argv[0]` is reduced to its file name; arguments containing whitespace
/// are wrapped in double quotes.
pub fn full_command<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .enumerate()
        .map(|(index, arg)| {
            let arg = arg.as_ref();
            if index == 0 {
                dir_name(Path::new(arg)).unwrap_or_else(|| arg.to_string())
            } else if arg.chars().any(char::is_whitespace) {
                format!("\"{arg}\"")
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Create the run directory, its descriptor and the snapshot.
pub fn create<S: DescriptorStore>(
    store: &S,
    request: &SnapshotRequest<'_>,
) -> Result<RunDescriptor, LaunchError> {
    let trg_name = dir_name(request.source_dir).unwrap_or_else(|| "src".to_string());
    let target_dir = request.run_dir.join(&trg_name);

    fs::create_dir_all(request.run_dir).map_err(|e| io_err(request.run_dir, e))?;
    let copied = copy_tree(request.source_dir, &target_dir, request.run_dir)?;

    let descriptor = RunDescriptor {
        created_at: Utc::now(),
        src_dir_from_house: relative_path(request.house_dir, request.source_dir),
        trg_dir_from_run: PathBuf::from(&trg_name),
        sub_command: request.command.to_string(),
        full_command: request.full_command.clone(),
        hsize: request.hsize,
        parallel: request.parallel,
    };
    store.save(&descriptor, &request.run_dir.join(RUN_MARKER))?;
    tracing::info!(
        source = %request.source_dir.display(),
        target = %target_dir.display(),
        files = copied,
        "snapshot created",
    );
    Ok(descriptor)
}

/// Copy `source` to `target`, skipping `exclude` and every run directory.
///
/// Returns the number of non-directory entries copied.
pub fn copy_tree(source: &Path, target: &Path, exclude: &Path) -> Result<usize, LaunchError> {
    let walker = WalkDir::new(source)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, exclude));

    let mut copied = 0usize;
    for entry in walker {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io_err(entry.path(), std::io::Error::other(e)))?;
        let dest = target.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| io_err(&dest, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &dest)?;
            copied += 1;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| io_err(entry.path(), e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn is_excluded(entry: &DirEntry, exclude: &Path) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && (entry.path() == exclude || entry.path().join(RUN_MARKER).is_file())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, dest: &Path) -> Result<(), LaunchError> {
    let pointee = fs::read_link(link).map_err(|e| io_err(link, e))?;
    std::os::unix::fs::symlink(&pointee, dest).map_err(|e| io_err(dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, dest: &Path) -> Result<(), LaunchError> {
    fs::copy(link, dest).map_err(|e| io_err(link, e))?;
    Ok(())
}
