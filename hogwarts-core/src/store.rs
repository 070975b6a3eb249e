//! Descriptor persistence.
//!
//! # API pattern
//!
//! Marker files are small structured documents. Everything above this module
//! goes through [`DescriptorStore`], so the on-disk format is a choice of the
//! store, not of the hierarchy logic. [`YamlStore`] is the format the markers
//! are written in.
//!
//! # Write flow
//!
//! serialize → `<name>.tmp` sibling → `rename` over the target. The `.tmp`
//! always lives next to the target (same filesystem), so a concurrent reader
//! sees either the old document or the new one, never a prefix.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{io_err, HierarchyError};

/// Load/save structured records by path.
pub trait DescriptorStore {
    /// Returns [`HierarchyError::DescriptorNotFound`] if `path` is absent and
    /// [`HierarchyError::Parse`] if it holds something that is not a `T`.
    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T, HierarchyError>;

    /// Create or replace the document at `path`.
    fn save<T: Serialize>(&self, record: &T, path: &Path) -> Result<(), HierarchyError>;
}

/// YAML-backed [`DescriptorStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlStore;

impl DescriptorStore for YamlStore {
    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T, HierarchyError> {
        if !path.is_file() {
            return Err(HierarchyError::DescriptorNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        serde_yaml::from_str(&contents).map_err(|source| HierarchyError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save<T: Serialize>(&self, record: &T, path: &Path) -> Result<(), HierarchyError> {
        let yaml = serde_yaml::to_string(record)?;
        let tmp = tmp_path(path);
        fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(path, e));
        }
        tracing::debug!(path = %path.display(), "saved descriptor");
        Ok(())
    }
}

/// `<dir>/<name>.tmp` for a target `<dir>/<name>`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.tmp"))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::REGISTRY_MARKER;
    use crate::types::{HouseMarker, HouseName, Registry};
    use tempfile::TempDir;

    #[test]
    fn save_and_load_registry_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(REGISTRY_MARKER);
        let mut reg = Registry::default();
        reg.houses
            .insert(HouseName::from("proj"), PathBuf::from("proj"));
        reg.current_house = Some(HouseName::from("proj"));

        YamlStore.save(&reg, &path).expect("save");
        let loaded: Registry = YamlStore.load(&path).expect("load");
        assert_eq!(loaded, reg);
    }

    #[test]
    fn save_cleans_up_tmp() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(REGISTRY_MARKER);
        YamlStore.save(&Registry::default(), &path).expect("save");
        assert!(!tmp_path(&path).exists(), ".tmp must be gone after save");
        assert_eq!(tmp_path(&path).file_name().unwrap(), ".hogwarts.tmp");
    }

    #[test]
    fn save_overwrites_existing_document() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(REGISTRY_MARKER);
        let mut reg = Registry::default();
        YamlStore.save(&reg, &path).expect("first save");
        reg.current_house = Some(HouseName::from("x"));
        reg.houses.insert(HouseName::from("x"), PathBuf::from("x"));
        YamlStore.save(&reg, &path).expect("second save");

        let loaded: Registry = YamlStore.load(&path).expect("load");
        assert_eq!(loaded.current_house, Some(HouseName::from("x")));
    }

    #[test]
    fn house_marker_is_an_empty_mapping() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(".house");
        YamlStore.save(&HouseMarker {}, &path).expect("save");
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");
        let _: HouseMarker = YamlStore.load(&path).expect("load");
    }

    #[test]
    fn load_missing_returns_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = YamlStore
            .load::<Registry>(&dir.path().join(REGISTRY_MARKER))
            .unwrap_err();
        assert!(matches!(err, HierarchyError::DescriptorNotFound { .. }));
    }

    #[test]
    fn load_wrong_shape_returns_parse_error_with_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(REGISTRY_MARKER);
        std::fs::write(&path, "- a list\n- not a mapping\n").unwrap();
        let err = YamlStore.load::<Registry>(&path).unwrap_err();
        assert!(matches!(err, HierarchyError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains(".hogwarts"));
    }
}
