//! Creating and mutating the registry and its houses.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::HierarchyError;
use crate::hierarchy::{Presence, Workspace};
use crate::paths::{dir_name, relative_path, HOUSE_MARKER, REGISTRY_MARKER};
use crate::store::DescriptorStore;
use crate::types::{HouseMarker, HouseName, Registry};

/// What `workspace --build <target>` creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTarget {
    Hogwarts,
    House,
}

impl FromStr for BuildTarget {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hogwarts" => Ok(Self::Hogwarts),
            "house" => Ok(Self::House),
            _ => Err(HierarchyError::UnknownBuildTarget(s.to_string())),
        }
    }
}

/// Before/after value of `current_house` for a mutation, kept for audit output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseSwitch {
    pub previous: Option<HouseName>,
    pub current: Option<HouseName>,
}

/// Result of [`Workspace::build_house`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltHouse {
    pub name: HouseName,
    pub marker: PathBuf,
    pub switch: HouseSwitch,
}

impl<S: DescriptorStore> Workspace<S> {
    /// Write an empty registry at the start directory.
    ///
    /// Fails if a registry already governs the start directory.
    pub fn build_registry(&self) -> Result<PathBuf, HierarchyError> {
        self.find_registry(Presence::MustNotExist)?;
        let marker = self.cwd().join(REGISTRY_MARKER);
        self.store().save(&Registry::default(), &marker)?;
        tracing::info!(path = %marker.display(), "built registry");
        Ok(marker)
    }

    /// Register the start directory as a house named after it and make it
    /// the current house.
    pub fn build_house(&self) -> Result<BuiltHouse, HierarchyError> {
        let (registry_dir, mut registry) = self.load_registry()?;
        let name = dir_name(self.cwd())
            .map(HouseName::from)
            .ok_or_else(|| HierarchyError::UnnamedDirectory {
                path: self.cwd().to_path_buf(),
            })?;
        self.find_house(Some(&name.0), Presence::MustNotExist)?;

        let marker = self.cwd().join(HOUSE_MARKER);
        self.store().save(&HouseMarker {}, &marker)?;

        let previous = registry.current_house.replace(name.clone());
        registry
            .houses
            .insert(name.clone(), relative_path(&registry_dir, self.cwd()));
        self.save_registry(&registry_dir, &registry)?;
        tracing::info!(house = %name, path = %marker.display(), "built house");

        Ok(BuiltHouse {
            name: name.clone(),
            marker,
            switch: HouseSwitch {
                previous,
                current: Some(name),
            },
        })
    }

    /// Make `name` the current house. Only the registry table is consulted.
    pub fn switch_house(&self, name: &str) -> Result<HouseSwitch, HierarchyError> {
        let (registry_dir, mut registry) = self.load_registry()?;
        let name = HouseName::from(name);
        if !registry.houses.contains_key(&name) {
            return Err(HierarchyError::HouseNotFound {
                name,
                available: registry.house_names(),
            });
        }

        let previous = registry.current_house.replace(name.clone());
        self.save_registry(&registry_dir, &registry)?;
        Ok(HouseSwitch {
            previous,
            current: Some(name),
        })
    }

    /// Forget the registry entry for `name`.
    ///
    /// The house marker on disk is left alone, so the directory can be
    /// cleaned up by hand or registered again.
    pub fn delete_house(&self, name: &str) -> Result<HouseSwitch, HierarchyError> {
        let (registry_dir, mut registry) = self.load_registry()?;
        let name = HouseName::from(name);
        if registry.houses.remove(&name).is_none() {
            return Err(HierarchyError::HouseNotFound {
                name,
                available: registry.house_names(),
            });
        }

        let previous = registry.current_house.clone();
        if previous.as_ref() == Some(&name) {
            registry.current_house = None;
        }
        self.save_registry(&registry_dir, &registry)?;
        tracing::info!(house = %name, "deleted house from registry");
        Ok(HouseSwitch {
            previous,
            current: registry.current_house,
        })
    }
}
