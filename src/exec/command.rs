// src/exec/command.rs

//! Shell-command cell runner.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::model::ShellCell;
use crate::errors::{CellDagError, Result};
use crate::exec::backend::{CellFuture, CellRunner, RunCellArgs};
use crate::notebook::refs::render_command;
use crate::notebook::state::{CellStatus, NotebookState, RunStatus};
use crate::store::SnapshotStore;
use crate::types::{CellId, DagId};

type RunKey = (DagId, CellId);

/// Cancel channel of one in-flight cell process.
#[derive(Debug)]
struct ActiveRun {
    run_id: u64,
    cancel: oneshot::Sender<()>,
}

/// Cell processes currently alive, keyed by `(dag, cell)`.
#[derive(Debug, Default)]
struct ActiveRuns {
    next_run_id: AtomicU64,
    runs: Mutex<HashMap<RunKey, ActiveRun>>,
}

impl ActiveRuns {
    fn lock(&self) -> MutexGuard<'_, HashMap<RunKey, ActiveRun>> {
        self.runs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Give a new run of `(dag_id, cell_id)` a fresh cancel channel.
    ///
    /// A newer run of the same cell takes over the slot; the older one then
    /// runs to completion.
    fn register(&self, dag_id: &str, cell_id: &str) -> (Registration<'_>, oneshot::Receiver<()>) {
        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let key = (dag_id.to_string(), cell_id.to_string());
        let (cancel, cancel_rx) = oneshot::channel();
        self.lock().insert(key.clone(), ActiveRun { run_id, cancel });
        let registration = Registration {
            active: self,
            key,
            run_id,
        };
        (registration, cancel_rx)
    }
}

/// Removes its run from [`ActiveRuns`] when the run ends, however it ends.
struct Registration<'a> {
    active: &'a ActiveRuns,
    key: RunKey,
    run_id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut runs = self.active.lock();
        if runs.get(&self.key).is_some_and(|run| run.run_id == self.run_id) {
            runs.remove(&self.key);
        }
    }
}

/// Handle used to cancel running cells of a [`ShellRunner`].
///
/// Cancelling only affects processes alive at that moment; later runs of
/// the same cell start normally.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    active: Arc<ActiveRuns>,
}

impl CancelHandle {
    /// Kill the running process of one cell. Returns `false` when the cell
    /// is not running.
    pub fn cancel_cell(&self, dag_id: &str, cell_id: &str) -> bool {
        let key = (dag_id.to_string(), cell_id.to_string());
        match self.active.lock().remove(&key) {
            Some(run) => run.cancel.send(()).is_ok(),
            None => false,
        }
    }

    /// Kill every running cell process. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let runs: Vec<ActiveRun> = self.active.lock().drain().map(|(_, run)| run).collect();
        runs.into_iter()
            .map(|run| run.cancel.send(()))
            .filter(|sent| sent.is_ok())
            .count()
    }

    pub fn is_running(&self, dag_id: &str, cell_id: &str) -> bool {
        let key = (dag_id.to_string(), cell_id.to_string());
        self.active.lock().contains_key(&key)
    }
}

/// Runs notebook cells as shell commands and publishes their status.
///
/// - `{{name}}` references are rendered from the latest snapshot.
/// - Each run gets its own cancel channel. When it fires the child is
///   killed, the cell is marked `Cancelled` and [`CellDagError::Cancelled`]
///   is returned.
/// - A non-zero exit marks the cell `Error` and returns
///   [`CellDagError::CellFailed`].
///
/// It never cascades on its own; `RunCellArgs::cascade` is only logged.
pub struct ShellRunner {
    store: Arc<SnapshotStore<NotebookState>>,
    active: Arc<ActiveRuns>,
}

impl ShellRunner {
    pub fn new(store: Arc<SnapshotStore<NotebookState>>) -> Self {
        Self {
            store,
            active: Arc::new(ActiveRuns::default()),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            active: self.active.clone(),
        }
    }

    async fn run(&self, args: RunCellArgs<NotebookState>) -> Result<()> {
        let RunCellArgs {
            dag_id,
            cell_id,
            cascade,
            store,
        } = args;

        let state = store.get_state();
        let cell: &ShellCell = state
            .config
            .dag(&dag_id)
            .and_then(|dag| dag.cells.get(&cell_id))
            .ok_or_else(|| CellDagError::CellNotFound {
                dag: dag_id.clone(),
                cell: cell_id.clone(),
            })?;

        let cmd = render_command(&cell.cmd, |name| {
            state
                .config
                .dag(&dag_id)
                .filter(|dag| dag.cells.contains_key(name))
                .map(|_| state.output_of(&dag_id, name))
        });

        info!(dag = %dag_id, cell = %cell_id, cmd = %cmd, cascade, "starting cell process");
        self.store.update(|s| {
            let running = CellStatus::running(s.status_of(&dag_id, &cell_id));
            s.set_status(&dag_id, &cell_id, running);
        });

        let (_registration, cancel_rx) = self.active.register(&dag_id, &cell_id);
        let started = Instant::now();
        let mut command = shell_command(&cmd);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                warn!(dag = %dag_id, cell = %cell_id, error = %err, "failed to spawn cell process");
                self.publish(
                    &dag_id,
                    &cell_id,
                    error_status(err.to_string(), started.elapsed()),
                );
                return Err(err.into());
            }
        };

        let output = tokio::select! {
            output = child.wait_with_output() => output,
            _ = cancel_requested(cancel_rx) => {
                // Dropping the wait future drops the child, which kills it.
                warn!(dag = %dag_id, cell = %cell_id, "cell cancelled; killed process");
                self.publish(&dag_id, &cell_id, cancelled_status());
                return Err(CellDagError::Cancelled(cell_id));
            }
        };

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                self.publish(
                    &dag_id,
                    &cell_id,
                    error_status(err.to_string(), started.elapsed()),
                );
                return Err(err.into());
            }
        };
        let duration = started.elapsed();

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            debug!(dag = %dag_id, cell = %cell_id, ?duration, "cell succeeded");
            self.publish(
                &dag_id,
                &cell_id,
                CellStatus {
                    state: RunStatus::Success,
                    output: Some(stdout),
                    last_error: None,
                    duration: Some(duration),
                },
            );
            Ok(())
        } else {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(dag = %dag_id, cell = %cell_id, exit_code = code, "cell failed");
            let message = if stderr.is_empty() {
                format!("exit code {code}")
            } else {
                stderr.clone()
            };
            self.publish(&dag_id, &cell_id, error_status(message, duration));
            Err(CellDagError::CellFailed {
                cell: cell_id,
                code,
                stderr,
            })
        }
    }

    fn publish(&self, dag_id: &str, cell_id: &str, status: CellStatus) {
        self.store.update(|s| s.set_status(dag_id, cell_id, status));
    }
}

impl CellRunner<NotebookState> for ShellRunner {
    type Error = CellDagError;

    fn run_cell(&self, args: RunCellArgs<NotebookState>) -> CellFuture<'_, CellDagError> {
        Box::pin(self.run(args))
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Resolves only on an explicit cancel. A dropped sender (the slot was
/// taken over by a newer run) leaves this run uncancellable.
async fn cancel_requested(cancel_rx: oneshot::Receiver<()>) {
    if cancel_rx.await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn cancelled_status() -> CellStatus {
    CellStatus {
        state: RunStatus::Cancelled,
        output: None,
        last_error: Some("cancelled".to_string()),
        duration: None,
    }
}

fn error_status(message: String, duration: std::time::Duration) -> CellStatus {
    CellStatus {
        state: RunStatus::Error,
        output: None,
        last_error: Some(message),
        duration: Some(duration),
    }
}
