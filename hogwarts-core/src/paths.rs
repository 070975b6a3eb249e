//! Marker names and path arithmetic shared by every crate.

use std::path::{Component, Path, PathBuf};

/// Registry marker, one per tree root.
pub const REGISTRY_MARKER: &str = ".hogwarts";
/// House marker, one per registered working directory.
pub const HOUSE_MARKER: &str = ".house";
/// Run descriptor, one per run directory.
pub const RUN_MARKER: &str = ".wizard";

/// Walk from `start` up to the filesystem root and return the first
/// directory that holds a regular file named `marker`.
pub fn trace_up(start: &Path, marker: &str) -> Option<PathBuf> {
    let found = start
        .ancestors()
        .find(|dir| dir.join(marker).is_file())
        .map(Path::to_path_buf);
    tracing::debug!(start = %start.display(), marker, found = ?found, "trace up");
    found
}

/// `true` if `dir` holds a regular file named `marker`.
pub fn holds_marker(dir: &Path, marker: &str) -> bool {
    dir.is_dir() && dir.join(marker).is_file()
}

/// Path of `to` relative to `from`, using `..` components where needed.
///
/// Both inputs are expected to be absolute and free of `.`/`..` components.
/// Returns `.` when they are the same directory.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    if let Ok(rest) = to.strip_prefix(from) {
        return if rest.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            rest.to_path_buf()
        };
    }

    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &to[common..] {
        rel.push(component.as_os_str());
    }
    rel
}

/// Final component of `path` as an owned string, if it has one.
pub fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn trace_up_finds_nearest_marker() {
        let root = TempDir::new().expect("tempdir");
        let deep = root.path().join("a").join("b").join("c");
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(root.path().join("a").join(RUN_MARKER), "{}").unwrap();

        let found = trace_up(&deep, RUN_MARKER).expect("found");
        assert_eq!(found, root.path().join("a"));
    }

    #[test]
    fn trace_up_ignores_directories_named_like_markers() {
        let root = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(root.path().join(RUN_MARKER)).unwrap();
        assert!(trace_up(root.path(), RUN_MARKER).is_none());
    }

    #[test]
    fn relative_path_inside_and_outside() {
        assert_eq!(
            relative_path(Path::new("/w"), Path::new("/w/proj/src")),
            PathBuf::from("proj/src")
        );
        assert_eq!(
            relative_path(Path::new("/w/proj"), Path::new("/w/proj")),
            PathBuf::from(".")
        );
        assert_eq!(
            relative_path(Path::new("/w/proj"), Path::new("/w/data/set")),
            PathBuf::from("../data/set")
        );
    }

    #[test]
    fn dir_name_of_root_is_none() {
        assert_eq!(dir_name(Path::new("/w/proj")).as_deref(), Some("proj"));
        assert!(dir_name(Path::new("/")).is_none());
    }
}
