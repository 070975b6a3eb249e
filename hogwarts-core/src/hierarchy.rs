//! Locating the registry, houses and runs from a starting directory.
//!
//! # API pattern
//!
//! A [`Workspace`] pins the directory every lookup starts from:
//! - `Workspace::at(dir)` — explicit start; used by tests with `TempDir`
//! - `Workspace::from_current_dir()` — the process working directory
//!
//! Tests must NEVER rely on the process working directory; always use `at`.
//!
//! Every `find_*` takes a [`Presence`]: with `MustExist` it returns the
//! directory or a not-found error, with `MustNotExist` it returns `None` or an
//! already-exists error. All returned paths are directories, never marker files.

use std::path::{Path, PathBuf};

use crate::error::{io_err, HierarchyError};
use crate::paths::{holds_marker, trace_up, HOUSE_MARKER, REGISTRY_MARKER, RUN_MARKER};
use crate::store::{DescriptorStore, YamlStore};
use crate::types::{HouseName, Registry, RunDescriptor};

/// Expected state of a marker a lookup is validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    MustExist,
    MustNotExist,
}

/// A view of the marker-file tree as seen from one directory.
#[derive(Debug, Clone)]
pub struct Workspace<S = YamlStore> {
    cwd: PathBuf,
    store: S,
}

impl Workspace<YamlStore> {
    pub fn at(cwd: impl Into<PathBuf>) -> Self {
        Self::with_store(cwd, YamlStore)
    }

    /// Workspace rooted at the process working directory.
    pub fn from_current_dir() -> Result<Self, HierarchyError> {
        let cwd = std::env::current_dir().map_err(|e| io_err(".", e))?;
        Ok(Self::at(cwd))
    }
}

impl<S: DescriptorStore> Workspace<S> {
    pub fn with_store(cwd: impl Into<PathBuf>, store: S) -> Self {
        Self {
            cwd: cwd.into(),
            store,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Walk upward from the start directory looking for the registry marker.
    pub fn find_registry(&self, presence: Presence) -> Result<Option<PathBuf>, HierarchyError> {
        match (trace_up(&self.cwd, REGISTRY_MARKER), presence) {
            (Some(dir), Presence::MustExist) => Ok(Some(dir)),
            (None, Presence::MustNotExist) => Ok(None),
            (Some(dir), Presence::MustNotExist) => Err(HierarchyError::RegistryExists {
                path: dir.join(REGISTRY_MARKER),
            }),
            (None, Presence::MustExist) => Err(HierarchyError::RegistryNotFound {
                start: self.cwd.clone(),
            }),
        }
    }

    /// Registry root directory; fails if there is none above the start directory.
    pub fn registry_dir(&self) -> Result<PathBuf, HierarchyError> {
        self.find_registry(Presence::MustExist)?
            .ok_or_else(|| HierarchyError::RegistryNotFound {
                start: self.cwd.clone(),
            })
    }

    /// Registry root directory plus its parsed contents.
    pub fn load_registry(&self) -> Result<(PathBuf, Registry), HierarchyError> {
        let dir = self.registry_dir()?;
        let registry = self.store.load(&dir.join(REGISTRY_MARKER))?;
        Ok((dir, registry))
    }

    pub(crate) fn save_registry(
        &self,
        registry_dir: &Path,
        registry: &Registry,
    ) -> Result<(), HierarchyError> {
        self.store.save(registry, &registry_dir.join(REGISTRY_MARKER))
    }

    // -----------------------------------------------------------------------
    // House
    // -----------------------------------------------------------------------

    /// Resolve a house by name, or the registry's current house when `name`
    /// is `None` or empty. The table entry and the on-disk marker must agree
    /// for the house to count as existing.
    pub fn find_house(
        &self,
        name: Option<&str>,
        presence: Presence,
    ) -> Result<Option<PathBuf>, HierarchyError> {
        let (registry_dir, registry) = self.load_registry()?;

        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) => HouseName::from(name),
            None => match &registry.current_house {
                Some(current) => current.clone(),
                None if presence == Presence::MustExist => {
                    return Err(HierarchyError::NoCurrentHouse {
                        available: registry.house_names(),
                    })
                }
                None => return Ok(None),
            },
        };

        let house_dir = registry
            .houses
            .get(&name)
            .map(|rel| registry_dir.join(rel))
            .filter(|dir| holds_marker(dir, HOUSE_MARKER));

        match (house_dir, presence) {
            (Some(dir), Presence::MustExist) => Ok(Some(dir)),
            (None, Presence::MustNotExist) => Ok(None),
            (Some(dir), Presence::MustNotExist) => Err(HierarchyError::HouseExists {
                name,
                path: dir.join(HOUSE_MARKER),
            }),
            (None, Presence::MustExist) => Err(HierarchyError::HouseNotFound {
                name,
                available: registry.house_names(),
            }),
        }
    }

    /// Directory of the current house; fails if none is set or it is gone.
    pub fn current_house_dir(&self) -> Result<PathBuf, HierarchyError> {
        self.find_house(None, Presence::MustExist)?
            .ok_or_else(|| HierarchyError::NoCurrentHouse { available: vec![] })
    }

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------

    /// Resolve a run directory.
    ///
    /// Without a name, walks upward from the start directory, so commands
    /// work from anywhere inside a run's snapshot. With a name, looks at
    /// `<current house>/<name>`.
    pub fn find_run(
        &self,
        name: Option<&str>,
        presence: Presence,
    ) -> Result<Option<PathBuf>, HierarchyError> {
        let expected = match name.filter(|n| !n.is_empty()) {
            Some(name) => Some(self.current_house_dir()?.join(name)),
            None => None,
        };
        let run_dir = match &expected {
            Some(dir) => Some(dir.clone()).filter(|dir| holds_marker(dir, RUN_MARKER)),
            None => trace_up(&self.cwd, RUN_MARKER),
        };

        match (run_dir, presence) {
            (Some(dir), Presence::MustExist) => Ok(Some(dir)),
            (None, Presence::MustNotExist) => Ok(None),
            (Some(dir), Presence::MustNotExist) => Err(HierarchyError::RunExists {
                path: dir.join(RUN_MARKER),
            }),
            (None, Presence::MustExist) => Err(match expected {
                Some(dir) => HierarchyError::RunNotFound {
                    path: dir.join(RUN_MARKER),
                },
                None => HierarchyError::NoEnclosingRun {
                    start: self.cwd.clone(),
                },
            }),
        }
    }

    /// Existing run directory plus its descriptor.
    pub fn load_run(&self, name: Option<&str>) -> Result<(PathBuf, RunDescriptor), HierarchyError> {
        let dir = self
            .find_run(name, Presence::MustExist)?
            .ok_or_else(|| HierarchyError::NoEnclosingRun {
                start: self.cwd.clone(),
            })?;
        let descriptor = self.store.load(&dir.join(RUN_MARKER))?;
        Ok((dir, descriptor))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
