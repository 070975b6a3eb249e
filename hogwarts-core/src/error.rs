//! Error types for hogwarts-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::HouseName;

/// Coarse classification used by callers to decide how a failure is reported.
///
/// Every error the workspace and launcher produce falls into exactly one of
/// these buckets; an interactive "no" is not an error and has no class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A registry, house or run was expected to exist (or not to exist).
    PreconditionViolation,
    /// The caller passed something that can never succeed.
    InvalidArgument,
    /// Copy, mkdir, remove, read or write failed underneath us.
    Filesystem,
}

/// All errors that can arise while resolving or mutating the marker-file tree.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// Underlying I/O failure, annotated with the path it happened at.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse descriptor at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A descriptor file was expected at `path` but is not there.
    #[error("descriptor not found at {path}")]
    DescriptorNotFound { path: PathBuf },

    #[error(
        "hogwarts is not found above {start}; run `hogwarts workspace --build hogwarts` at the tree root"
    )]
    RegistryNotFound { start: PathBuf },

    #[error("hogwarts is already built at {path}")]
    RegistryExists { path: PathBuf },

    #[error("house {name} is not found; available houses: {}", join_names(.available))]
    HouseNotFound {
        name: HouseName,
        available: Vec<HouseName>,
    },

    #[error("no current house is set; available houses: {}", join_names(.available))]
    NoCurrentHouse { available: Vec<HouseName> },

    #[error("house {name} is already built at {path}")]
    HouseExists { name: HouseName, path: PathBuf },

    #[error("wizard is not found at {path}")]
    RunNotFound { path: PathBuf },

    #[error("wizard is not found above {start}; pass a run name or cd into a run")]
    NoEnclosingRun { start: PathBuf },

    #[error("wizard already exists at {path}")]
    RunExists { path: PathBuf },

    #[error("unexpected building: {0} (hogwarts/house expected)")]
    UnknownBuildTarget(String),

    #[error("cannot name a house after {path}: directory has no name")]
    UnnamedDirectory { path: PathBuf },
}

impl HierarchyError {
    pub fn class(&self) -> ErrorClass {
        match self {
            HierarchyError::Io { .. }
            | HierarchyError::Yaml(_)
            | HierarchyError::Parse { .. }
            | HierarchyError::DescriptorNotFound { .. } => ErrorClass::Filesystem,
            HierarchyError::UnknownBuildTarget(_) | HierarchyError::UnnamedDirectory { .. } => {
                ErrorClass::InvalidArgument
            }
            HierarchyError::RegistryNotFound { .. }
            | HierarchyError::RegistryExists { .. }
            | HierarchyError::HouseNotFound { .. }
            | HierarchyError::NoCurrentHouse { .. }
            | HierarchyError::HouseExists { .. }
            | HierarchyError::RunNotFound { .. }
            | HierarchyError::NoEnclosingRun { .. }
            | HierarchyError::RunExists { .. } => ErrorClass::PreconditionViolation,
        }
    }
}

/// Convenience constructor for [`HierarchyError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> HierarchyError {
    HierarchyError::Io {
        path: path.into(),
        source,
    }
}

fn join_names(names: &[HouseName]) -> String {
    if names.is_empty() {
        return "(none)".to_string();
    }
    names
        .iter()
        .map(|name| name.0.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn house_not_found_lists_available_houses() {
        let err = HierarchyError::HouseNotFound {
            name: HouseName::from("ghost"),
            available: vec![HouseName::from("gryffindor"), HouseName::from("slytherin")],
        };
        let msg = err.to_string();
        assert!(msg.contains("ghost"), "got: {msg}");
        assert!(msg.contains("gryffindor/slytherin"), "got: {msg}");
        assert_eq!(err.class(), ErrorClass::PreconditionViolation);
    }

    #[test]
    fn empty_house_table_is_spelled_out() {
        let err = HierarchyError::NoCurrentHouse { available: vec![] };
        assert!(err.to_string().ends_with("(none)"));
    }

    #[test]
    fn io_errors_are_filesystem_class() {
        let err = io_err("/nope", std::io::Error::other("boom"));
        assert_eq!(err.class(), ErrorClass::Filesystem);
        assert!(err.to_string().contains("/nope"));
    }
}
