use std::path::PathBuf;

use hogwarts_core::{ErrorClass, HierarchyError};
use thiserror::Error;

/// Error surface for snapshotting, orchestration and run maintenance.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("world size must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("command required: pass --command, or --resume an existing run")]
    MissingCommand,

    #[error("--force and --resume cannot be combined")]
    ForceWithResume,

    #[error("invalid run name {0:?}: expected a relative path without `.` or `..`")]
    InvalidRunName(String),

    #[error("curr directory contains {}: snapshotting the hogwarts root is not allowed", .path.display())]
    SourceIsRegistryRoot { path: PathBuf },

    #[error("curr directory contains {}: cd into the house or below before running", .house.display())]
    SourceContainsHouse { source_dir: PathBuf, house: PathBuf },

    #[error("curr directory {} is inside wizard {}: overwriting it would delete the source", .source_dir.display(), .run_dir.display())]
    SourceInsideRun { source_dir: PathBuf, run_dir: PathBuf },

    #[error("failed to spawn worker {label}: {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for worker {label}: {source}")]
    Wait {
        label: String,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LaunchError::Hierarchy(inner) => inner.class(),
            LaunchError::InvalidWorkerCount(_)
            | LaunchError::MissingCommand
            | LaunchError::ForceWithResume
            | LaunchError::InvalidRunName(_) => ErrorClass::InvalidArgument,
            LaunchError::SourceIsRegistryRoot { .. }
            | LaunchError::SourceContainsHouse { .. }
            | LaunchError::SourceInsideRun { .. } => ErrorClass::PreconditionViolation,
            LaunchError::Io { .. } | LaunchError::Spawn { .. } | LaunchError::Wait { .. } => {
                ErrorClass::Filesystem
            }
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LaunchError {
    LaunchError::Io {
        path: path.into(),
        source,
    }
}

impl From<walkdir::Error> for LaunchError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop while copying snapshot"));
        io_err(path, source)
    }
}
