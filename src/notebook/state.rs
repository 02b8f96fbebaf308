// src/notebook/state.rs

//! Root state of the notebook host: the DAG config plus per-cell run status.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::model::NotebookConfig;
use crate::types::{CellId, DagId};

/// Last known run state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Success,
    Error,
    Cancelled,
}

/// Status of one cell, updated by the shell runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellStatus {
    pub state: RunStatus,
    /// Trimmed stdout of the last successful run.
    pub output: Option<String>,
    pub last_error: Option<String>,
    /// Wall time of the last finished run.
    pub duration: Option<Duration>,
}

impl CellStatus {
    /// Status while a run is in flight. Keeps the previous output so that
    /// templates of concurrently read snapshots stay stable.
    pub fn running(previous: Option<&CellStatus>) -> Self {
        Self {
            state: RunStatus::Running,
            output: previous.and_then(|s| s.output.clone()),
            last_error: None,
            duration: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotebookState {
    pub config: NotebookConfig,
    status: HashMap<DagId, HashMap<CellId, CellStatus>>,
}

impl NotebookState {
    pub fn new(config: NotebookConfig) -> Self {
        Self {
            config,
            status: HashMap::new(),
        }
    }

    pub fn status_of(&self, dag_id: &str, cell_id: &str) -> Option<&CellStatus> {
        self.status.get(dag_id)?.get(cell_id)
    }

    /// Output usable by templates: only cells whose last output exists.
    pub fn output_of(&self, dag_id: &str, cell_id: &str) -> Option<&str> {
        self.status_of(dag_id, cell_id)?.output.as_deref()
    }

    pub fn set_status(&mut self, dag_id: &str, cell_id: &str, status: CellStatus) {
        self.status
            .entry(dag_id.to_string())
            .or_default()
            .insert(cell_id.to_string(), status);
    }
}

/// Selector handed to the scheduler.
pub fn select_config(state: &NotebookState) -> Option<&NotebookConfig> {
    Some(&state.config)
}
