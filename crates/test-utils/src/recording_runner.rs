use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use celldag::exec::{CellFuture, CellRunner, RunCellArgs};

/// A fake runner that:
/// - records which cells were "run" (and with which `cascade` flag)
/// - yields once per cell, so cascades really suspend between cells
/// - fails with an `anyhow` error for cells listed in `failing`.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    failing: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub dag_id: String,
    pub cell_id: String,
    pub cascade: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, cell: &str) -> Self {
        self.failing.insert(cell.to_string());
        self
    }

    /// Cell ids in call order.
    pub fn executed(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.cell_id.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl<S: Send + Sync + 'static> CellRunner<S> for RecordingRunner {
    type Error = anyhow::Error;

    fn run_cell(&self, args: RunCellArgs<S>) -> CellFuture<'_, anyhow::Error> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            {
                let mut guard = self.calls.lock().unwrap();
                guard.push(RecordedCall {
                    dag_id: args.dag_id.clone(),
                    cell_id: args.cell_id.clone(),
                    cascade: args.cascade,
                });
            }
            if self.failing.contains(&args.cell_id) {
                anyhow::bail!("cell {} failed", args.cell_id);
            }
            Ok(())
        })
    }
}
