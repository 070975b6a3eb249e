//! Registry / house lifecycle tests against real temporary trees.

use assert_fs::prelude::*;
use hogwarts_core::{
    paths::{HOUSE_MARKER, REGISTRY_MARKER},
    ErrorClass, HierarchyError, HouseName, Presence, Workspace,
};
use predicates::prelude::predicate;
use rstest::rstest;

/// `/w` with a registry and the given house directories registered, the last
/// one built being current.
fn tree_with_houses(houses: &[&str]) -> assert_fs::TempDir {
    let root = assert_fs::TempDir::new().expect("tempdir");
    Workspace::at(root.path()).build_registry().expect("build registry");
    for house in houses {
        let dir = root.child(house);
        dir.create_dir_all().expect("mkdir house");
        Workspace::at(dir.path()).build_house().expect("build house");
    }
    root
}

// ---------------------------------------------------------------------------
// 1. Registry presence contract
// ---------------------------------------------------------------------------

#[test]
fn find_registry_must_exist_fails_without_registry() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let ws = Workspace::at(root.path());

    let err = ws.find_registry(Presence::MustExist).unwrap_err();
    assert!(matches!(err, HierarchyError::RegistryNotFound { .. }), "got: {err}");
    assert_eq!(err.class(), ErrorClass::PreconditionViolation);
    assert!(ws.find_registry(Presence::MustNotExist).unwrap().is_none());
}

#[rstest]
#[case::at_root("")]
#[case::one_level("proj")]
#[case::deep("proj/src/models")]
fn find_registry_must_not_exist_fails_anywhere_below(#[case] sub: &str) {
    let root = tree_with_houses(&[]);
    let start = root.path().join(sub);
    std::fs::create_dir_all(&start).expect("mkdir");
    let ws = Workspace::at(&start);

    assert_eq!(ws.find_registry(Presence::MustExist).unwrap(), Some(root.path().to_path_buf()));
    let err = ws.find_registry(Presence::MustNotExist).unwrap_err();
    assert!(matches!(err, HierarchyError::RegistryExists { .. }), "got: {err}");
}

#[test]
fn build_registry_twice_fails_and_keeps_first() {
    let root = tree_with_houses(&["proj"]);
    let nested = root.child("proj");

    let err = Workspace::at(nested.path()).build_registry().unwrap_err();
    assert!(err.to_string().contains("already built"), "got: {err}");
    nested.child(REGISTRY_MARKER).assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// 2. Houses
// ---------------------------------------------------------------------------

#[test]
fn built_house_resolves_to_same_directory() {
    let root = tree_with_houses(&[]);
    let proj = root.child("proj");
    proj.create_dir_all().unwrap();

    let built = Workspace::at(proj.path()).build_house().expect("build house");
    assert_eq!(built.name, HouseName::from("proj"));
    assert_eq!(built.switch.previous, None);
    proj.child(HOUSE_MARKER).assert(predicate::path::is_file());

    let found = Workspace::at(root.path())
        .find_house(Some("proj"), Presence::MustExist)
        .expect("find")
        .expect("some");
    assert_eq!(found, proj.path());
}

#[test]
fn build_house_reports_previous_current_house() {
    let root = tree_with_houses(&["a"]);
    let b = root.child("b");
    b.create_dir_all().unwrap();

    let built = Workspace::at(b.path()).build_house().expect("build b");
    assert_eq!(built.switch.previous, Some(HouseName::from("a")));
    assert_eq!(built.switch.current, Some(HouseName::from("b")));
}

#[test]
fn build_house_without_registry_fails() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let err = Workspace::at(root.path()).build_house().unwrap_err();
    assert!(matches!(err, HierarchyError::RegistryNotFound { .. }));
    root.child(HOUSE_MARKER).assert(predicate::path::missing());
}

#[test]
fn switch_house_is_idempotent() {
    let root = tree_with_houses(&["a", "b"]);
    let ws = Workspace::at(root.path());

    ws.switch_house("a").expect("first switch");
    let second = ws.switch_house("a").expect("second switch");
    assert_eq!(second.previous, Some(HouseName::from("a")));

    let (_, registry) = ws.load_registry().unwrap();
    assert_eq!(registry.current_house, Some(HouseName::from("a")));
    assert_eq!(
        ws.current_house_dir().unwrap(),
        root.path().join("a")
    );
}

#[test]
fn switch_to_unknown_house_lists_registered_names() {
    let root = tree_with_houses(&["gryffindor", "slytherin"]);
    let err = Workspace::at(root.path())
        .switch_house("nonexistent")
        .unwrap_err();

    assert_eq!(err.class(), ErrorClass::PreconditionViolation);
    let msg = err.to_string();
    assert!(msg.contains("nonexistent"), "got: {msg}");
    assert!(msg.contains("gryffindor"), "got: {msg}");
    assert!(msg.contains("slytherin"), "got: {msg}");
}

#[test]
fn delete_current_house_clears_current() {
    let root = tree_with_houses(&["a", "b"]);
    let ws = Workspace::at(root.path());

    let switch = ws.delete_house("b").expect("delete");
    assert_eq!(switch.previous, Some(HouseName::from("b")));
    assert_eq!(switch.current, None);

    let (_, registry) = ws.load_registry().unwrap();
    assert_eq!(registry.current_house, None);
    assert!(!registry.houses.contains_key(&HouseName::from("b")));
    // Only the registry entry is forgotten.
    root.child("b").child(HOUSE_MARKER).assert(predicate::path::exists());
}

#[test]
fn delete_other_house_keeps_current() {
    let root = tree_with_houses(&["a", "b"]);
    let ws = Workspace::at(root.path());

    let switch = ws.delete_house("a").expect("delete");
    assert_eq!(switch.current, Some(HouseName::from("b")));
    let (_, registry) = ws.load_registry().unwrap();
    assert_eq!(registry.current_house, Some(HouseName::from("b")));
    assert_eq!(registry.houses.len(), 1);
}

#[test]
fn deleted_house_directory_can_be_registered_again() {
    let root = tree_with_houses(&["a"]);
    Workspace::at(root.path()).delete_house("a").expect("delete");

    let rebuilt = Workspace::at(root.child("a").path())
        .build_house()
        .expect("rebuild");
    assert_eq!(rebuilt.switch.previous, None);
}

#[test]
fn delete_unknown_house_fails() {
    let root = tree_with_houses(&["a"]);
    let err = Workspace::at(root.path()).delete_house("zzz").unwrap_err();
    assert!(matches!(err, HierarchyError::HouseNotFound { .. }));
}
