//! Hogwarts core library — marker-file data model, descriptor store,
//! hierarchy resolution and workspace mutation.
//!
//! - [`types`] — records persisted in `.hogwarts` / `.house` / `.wizard`
//! - [`store`] — [`DescriptorStore`] and the YAML implementation
//! - [`hierarchy`] — [`Workspace`]: find registry / house / run
//! - [`builder`] — build registry and houses, switch and delete houses
//! - [`error`] — [`HierarchyError`] and its [`ErrorClass`]

pub mod builder;
pub mod error;
pub mod hierarchy;
pub mod paths;
pub mod store;
pub mod types;

pub use builder::{BuildTarget, BuiltHouse, HouseSwitch};
pub use error::{ErrorClass, HierarchyError};
pub use hierarchy::{Presence, Workspace};
pub use store::{DescriptorStore, YamlStore};
pub use types::{HouseMarker, HouseName, Registry, RunDescriptor};
