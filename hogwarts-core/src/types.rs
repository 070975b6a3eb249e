//! Records persisted in the marker files.
//!
//! All path fields use `PathBuf`; paths stored on disk are always relative
//! (to the registry root, the house or the run) so a whole tree can be moved.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name under which a house is registered (the house directory's name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseName(pub String);

impl fmt::Display for HouseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for HouseName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for HouseName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Contents of the `.hogwarts` marker at the tree root.
///
/// Every value of `houses` is relative to the directory holding the marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Registry {
    #[serde(default)]
    pub current_house: Option<HouseName>,
    #[serde(default)]
    pub houses: BTreeMap<HouseName, PathBuf>,
}

impl Registry {
    /// Registered house names, sorted.
    pub fn house_names(&self) -> Vec<HouseName> {
        self.houses.keys().cloned().collect()
    }
}

/// Contents of the `.house` marker. Presence is all that matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HouseMarker {}

/// Contents of the `.wizard` marker, written once when a run is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDescriptor {
    pub created_at: DateTime<Utc>,
    /// Source directory the snapshot was taken from, relative to the house.
    pub src_dir_from_house: PathBuf,
    /// Snapshot directory, relative to the run directory.
    pub trg_dir_from_run: PathBuf,
    /// Payload re-executed verbatim on resume.
    pub sub_command: String,
    /// The launcher invocation that created the run, quoted for copy-paste.
    pub full_command: String,
    #[serde(default = "default_hsize")]
    pub hsize: usize,
    #[serde(default)]
    pub parallel: bool,
}

fn default_hsize() -> usize {
    1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(HouseName::from("gryffindor").to_string(), "gryffindor");
        assert_eq!(
            HouseName::from("a"),
            HouseName::from(String::from("a"))
        );
    }

    #[test]
    fn registry_yaml_shape_is_flat() {
        let mut reg = Registry::default();
        reg.houses
            .insert(HouseName::from("proj"), PathBuf::from("proj"));
        reg.current_house = Some(HouseName::from("proj"));

        let yaml = serde_yaml::to_string(&reg).expect("serialize");
        assert!(yaml.contains("current_house: proj"), "got: {yaml}");
        assert!(yaml.contains("proj: proj"), "got: {yaml}");

        let back: Registry = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, reg);
    }

    #[test]
    fn empty_registry_deserializes_from_empty_mapping() {
        let reg: Registry = serde_yaml::from_str("{}").expect("deserialize");
        assert!(reg.current_house.is_none());
        assert!(reg.houses.is_empty());
    }

    #[test]
    fn descriptor_defaults_launch_shape_when_missing() {
        let yaml = "created_at: 2024-01-02T03:04:05Z\n\
                    src_dir_from_house: .\n\
                    trg_dir_from_run: proj\n\
                    sub_command: echo hi\n\
                    full_command: hogwarts run demo -c \"echo hi\"\n";
        let desc: RunDescriptor = serde_yaml::from_str(yaml).expect("deserialize");
        assert_eq!(desc.hsize, 1);
        assert!(!desc.parallel);
        assert_eq!(desc.sub_command, "echo hi");
    }
}
