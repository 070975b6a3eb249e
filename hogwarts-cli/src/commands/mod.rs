pub mod clean;
pub mod destroy;
pub mod list;
pub mod locate;
pub mod reproduce;
pub mod run;
pub mod runs;
pub mod workspace;

use hogwarts_core::HouseName;

/// House name for messages; `(none)` when unset.
pub(crate) fn house_label(house: Option<&HouseName>) -> String {
    house.map_or_else(|| "(none)".to_string(), ToString::to_string)
}
