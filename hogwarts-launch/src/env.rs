//! Environment handed to each worker process.

use std::path::PathBuf;

use tokio::process::Command;

/// Worker label, `<run name>/<rank id>`.
pub const WORKER_LABEL_VAR: &str = "wizard";
/// Absolute path of the worker's log directory.
pub const LOG_DIR_VAR: &str = "log_dir";
/// The worker's drawn rank id.
pub const RANK_VAR: &str = "hrank";
/// Number of workers in the launch.
pub const WORLD_SIZE_VAR: &str = "hsize";

/// Per-worker values passed to the spawned command, applied to that one
/// child only; the launcher's own environment is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerEnv {
    pub label: String,
    pub log_dir: PathBuf,
    pub rank: u32,
    pub world_size: usize,
}

impl WorkerEnv {
    pub fn new(run_name: &str, run_dir: &std::path::Path, rank: u32, world_size: usize) -> Self {
        Self {
            label: format!("{run_name}/{rank}"),
            log_dir: run_dir.join(rank.to_string()),
            rank,
            world_size,
        }
    }

    pub fn vars(&self) -> [(&'static str, String); 4] {
        [
            (WORKER_LABEL_VAR, self.label.clone()),
            (LOG_DIR_VAR, self.log_dir.display().to_string()),
            (RANK_VAR, self.rank.to_string()),
            (WORLD_SIZE_VAR, self.world_size.to_string()),
        ]
    }

    pub fn apply(&self, cmd: &mut Command) {
        for (key, value) in self.vars() {
            cmd.env(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn label_and_log_dir_follow_rank() {
        let env = WorkerEnv::new("demo", Path::new("/w/proj/demo"), 654_321, 3);
        assert_eq!(env.label, "demo/654321");
        assert_eq!(env.log_dir, Path::new("/w/proj/demo/654321"));

        let vars = env.vars();
        assert_eq!(vars[0], ("wizard", "demo/654321".to_string()));
        assert_eq!(vars[2], ("hrank", "654321".to_string()));
        assert_eq!(vars[3], ("hsize", "3".to_string()));
    }
}
