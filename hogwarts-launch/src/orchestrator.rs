//! Process orchestrator: one shell process per rank, run one after another
//! or all at once.
//!
//! ## Interrupts
//!
//! Interrupts arrive on a `broadcast` channel. [`run_blocking`] feeds it from
//! Ctrl-C; tests send on it directly.
//!
//! - Sequential: the first interrupt logs a one-time warning and stops
//!   further spawns. The worker in flight is still awaited; a second Ctrl-C
//!   from the terminal reaches it directly.
//! - Parallel: the first interrupt kills every worker that is still running.

use std::fs;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::error::{io_err, LaunchError};
use crate::launch::{LaunchPlan, WorkerSpec};

pub const DOUBLE_INTERRUPT_WARNING: &str =
    "Please double press Ctrl-C within 1 second to kill job. It will take several seconds to shutdown ...";

/// Exit code reported for an interrupted launch.
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// What happened to one spawned worker.
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    pub label: String,
    pub rank: u32,
    pub status: ExitStatus,
}

#[derive(Debug, Clone, Default)]
pub struct LaunchReport {
    /// Spawned workers, in rank order.
    pub workers: Vec<WorkerOutcome>,
    pub planned: usize,
    pub interrupted: bool,
}

impl LaunchReport {
    fn new(planned: usize) -> Self {
        Self {
            planned,
            ..Self::default()
        }
    }

    /// First worker that did not exit successfully.
    pub fn first_failure(&self) -> Option<&WorkerOutcome> {
        self.workers.iter().find(|w| !w.status.success())
    }

    /// 130 when interrupted, otherwise the first failing worker's code
    /// (1 if it died from a signal), otherwise 0.
    pub fn exit_code(&self) -> u8 {
        if self.interrupted {
            return INTERRUPTED_EXIT_CODE;
        }
        match self.first_failure() {
            Some(failed) => failed
                .status
                .code()
                .and_then(|code| u8::try_from(code).ok())
                .filter(|code| *code != 0)
                .unwrap_or(1),
            None => 0,
        }
    }
}

/// Build a current-thread runtime, forward Ctrl-C into it and run `plan`.
pub fn run_blocking(plan: &LaunchPlan) -> Result<LaunchReport, LaunchError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(async {
        let (interrupt_tx, interrupt_rx) = broadcast::channel(8);
        let forwarder = forward_interrupts(interrupt_tx);
        let report = run(plan, interrupt_rx).await;
        forwarder.abort();
        report
    })
}

/// Forward every Ctrl-C into `interrupts` until the channel closes.
pub fn forward_interrupts(interrupts: broadcast::Sender<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    if interrupts.send(()).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cannot listen for Ctrl-C");
                    break;
                }
            }
        }
    })
}

/// Run every worker of `plan`.
pub async fn run(
    plan: &LaunchPlan,
    mut interrupts: broadcast::Receiver<()>,
) -> Result<LaunchReport, LaunchError> {
    let workers = plan.workers();
    tracing::info!(
        run = %plan.run_name,
        hsize = plan.hsize,
        parallel = plan.parallel,
        resumed = plan.resumed,
        "launching workers",
    );
    if plan.parallel {
        run_parallel(workers, &mut interrupts).await
    } else {
        run_sequential(workers, &mut interrupts).await
    }
}

async fn run_sequential(
    workers: Vec<WorkerSpec>,
    interrupts: &mut broadcast::Receiver<()>,
) -> Result<LaunchReport, LaunchError> {
    let mut report = LaunchReport::new(workers.len());

    for spec in workers {
        let mut child = spawn_worker(&spec)?;
        let status = tokio::select! {
            status = child.wait() => status,
            _ = next_interrupt(interrupts) => {
                eprintln!("\t{DOUBLE_INTERRUPT_WARNING}");
                tracing::debug!(worker = %spec.env.label, "interrupt received, waiting for worker");
                report.interrupted = true;
                child.wait().await
            }
        }
        .map_err(|source| LaunchError::Wait {
            label: spec.env.label.clone(),
            source,
        })?;

        report.workers.push(finished(&spec, status));
        if report.interrupted {
            break;
        }
    }
    Ok(report)
}

async fn run_parallel(
    workers: Vec<WorkerSpec>,
    interrupts: &mut broadcast::Receiver<()>,
) -> Result<LaunchReport, LaunchError> {
    let mut report = LaunchReport::new(workers.len());

    let mut running: Vec<(WorkerSpec, Child)> = Vec::with_capacity(workers.len());
    for spec in workers {
        match spawn_worker(&spec) {
            Ok(child) => running.push((spec, child)),
            Err(err) => {
                for (spec, child) in &mut running {
                    if let Err(kill_err) = child.kill().await {
                        tracing::warn!(worker = %spec.env.label, error = %kill_err, "kill failed");
                    }
                }
                return Err(err);
            }
        }
    }

    let waited = tokio::select! {
        result = wait_all(&mut running) => Some(result),
        _ = next_interrupt(interrupts) => None,
    };

    match waited {
        Some(statuses) => {
            for ((spec, _), status) in running.iter().zip(statuses?) {
                report.workers.push(finished(spec, status));
            }
        }
        None => {
            tracing::warn!(workers = running.len(), "interrupted, killing workers");
            report.interrupted = true;
            for (spec, child) in &mut running {
                let status = kill_and_reap(spec, child).await?;
                report.workers.push(finished(spec, status));
            }
        }
    }
    Ok(report)
}

async fn wait_all(running: &mut [(WorkerSpec, Child)]) -> Result<Vec<ExitStatus>, LaunchError> {
    let mut statuses = Vec::with_capacity(running.len());
    for (spec, child) in running.iter_mut() {
        let status = child.wait().await.map_err(|source| LaunchError::Wait {
            label: spec.env.label.clone(),
            source,
        })?;
        statuses.push(status);
    }
    Ok(statuses)
}

async fn kill_and_reap(spec: &WorkerSpec, child: &mut Child) -> Result<ExitStatus, LaunchError> {
    let wait_err = |source| LaunchError::Wait {
        label: spec.env.label.clone(),
        source,
    };
    if let Some(status) = child.try_wait().map_err(wait_err)? {
        return Ok(status);
    }
    if let Err(err) = child.kill().await {
        tracing::warn!(worker = %spec.env.label, error = %err, "kill failed");
    }
    child.wait().await.map_err(wait_err)
}

/// Resolves on the next interrupt. A closed channel never interrupts.
async fn next_interrupt(interrupts: &mut broadcast::Receiver<()>) {
    match interrupts.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => std::future::pending::<()>().await,
    }
}

fn spawn_worker(spec: &WorkerSpec) -> Result<Child, LaunchError> {
    fs::create_dir_all(&spec.env.log_dir).map_err(|e| io_err(&spec.env.log_dir, e))?;

    let mut cmd = shell(&spec.command);
    cmd.current_dir(&spec.cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    spec.env.apply(&mut cmd);

    let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        label: spec.env.label.clone(),
        source,
    })?;
    tracing::debug!(worker = %spec.env.label, pid = ?child.id(), "spawned");
    Ok(child)
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

fn finished(spec: &WorkerSpec, status: ExitStatus) -> WorkerOutcome {
    if status.success() {
        tracing::info!(worker = %spec.env.label, "worker finished");
    } else {
        tracing::warn!(worker = %spec.env.label, %status, "worker failed");
    }
    WorkerOutcome {
        label: spec.env.label.clone(),
        rank: spec.env.rank,
        status,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn plan_in(root: &Path, command: &str, hsize: usize, parallel: bool) -> LaunchPlan {
        let run_dir = root.join("demo");
        let target_dir = run_dir.join("src");
        fs::create_dir_all(&target_dir).unwrap();
        LaunchPlan {
            run_name: "demo".into(),
            run_dir,
            target_dir,
            command: command.into(),
            hsize,
            parallel,
            resumed: false,
        }
    }

    #[tokio::test]
    async fn sequential_runs_every_worker_in_rank_order() {
        let root = TempDir::new().expect("tempdir");
        let plan = plan_in(root.path(), "echo \"$hrank\" > \"$log_dir/rank\"", 3, false);
        let (_tx, rx) = broadcast::channel(1);

        let report = run(&plan, rx).await.expect("run");

        assert_eq!(report.workers.len(), 3);
        assert!(!report.interrupted);
        assert_eq!(report.exit_code(), 0);
        for (outcome, spec) in report.workers.iter().zip(plan.workers()) {
            assert_eq!(outcome.rank, spec.env.rank);
            let written = fs::read_to_string(spec.env.log_dir.join("rank")).unwrap();
            assert_eq!(written.trim(), spec.env.rank.to_string());
        }
    }

    #[tokio::test]
    async fn first_failing_worker_sets_the_exit_code() {
        let root = TempDir::new().expect("tempdir");
        let plan = plan_in(root.path(), "exit 3", 2, false);
        let (_tx, rx) = broadcast::channel(1);

        let report = run(&plan, rx).await.expect("run");
        assert_eq!(report.workers.len(), 2);
        assert_eq!(report.exit_code(), 3);
        assert_eq!(report.first_failure().map(|w| w.rank), Some(plan.workers()[0].env.rank));
    }

    #[tokio::test]
    async fn sequential_interrupt_stops_further_spawns() {
        let root = TempDir::new().expect("tempdir");
        let plan = plan_in(root.path(), "sleep 0.3", 3, false);
        let (tx, rx) = broadcast::channel(1);
        tx.send(()).unwrap();

        let report = run(&plan, rx).await.expect("run");

        assert!(report.interrupted);
        assert_eq!(report.workers.len(), 1);
        assert!(report.workers[0].status.success(), "in-flight worker runs to completion");
        assert_eq!(report.exit_code(), INTERRUPTED_EXIT_CODE);
        let spawned_dirs = plan
            .workers()
            .iter()
            .filter(|w| w.env.log_dir.is_dir())
            .count();
        assert_eq!(spawned_dirs, 1);
    }

    #[tokio::test]
    async fn parallel_interrupt_kills_running_workers() {
        let root = TempDir::new().expect("tempdir");
        let plan = plan_in(root.path(), "sleep 30", 3, true);
        let (tx, rx) = broadcast::channel(1);

        let started = std::time::Instant::now();
        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send(()).unwrap();
        });
        let report = run(&plan, rx).await.expect("run");
        sender.await.unwrap();

        assert!(report.interrupted);
        assert_eq!(report.workers.len(), 3);
        assert!(report.workers.iter().all(|w| !w.status.success()));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn parallel_waits_for_all_workers() {
        let root = TempDir::new().expect("tempdir");
        let plan = plan_in(root.path(), "touch \"$log_dir/done\"", 4, true);
        let (_tx, rx) = broadcast::channel(1);

        let report = run(&plan, rx).await.expect("run");
        assert_eq!(report.workers.len(), 4);
        for spec in plan.workers() {
            assert!(spec.env.log_dir.join("done").is_file());
        }
    }

    #[tokio::test]
    async fn closed_interrupt_channel_never_interrupts() {
        let root = TempDir::new().expect("tempdir");
        let plan = plan_in(root.path(), "true", 2, false);
        let (tx, rx) = broadcast::channel::<()>(1);
        drop(tx);

        let report = run(&plan, rx).await.expect("run");
        assert!(!report.interrupted);
        assert_eq!(report.workers.len(), 2);
    }

    #[test]
    fn missing_working_directory_is_a_spawn_error() {
        let root = TempDir::new().expect("tempdir");
        let mut plan = plan_in(root.path(), "true", 1, false);
        plan.target_dir = root.path().join("gone");

        let err = run_blocking(&plan).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }), "got: {err}");
    }
}
