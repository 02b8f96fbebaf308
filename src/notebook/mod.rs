// src/notebook/mod.rs

//! Shell-command notebook host built on the scheduler.
//!
//! A notebook is a set of DAGs whose cells are shell commands. Cells
//! reference each other's output with `{{name}}`, which is also how their
//! dependencies are discovered.
//!
//! - [`state`] holds the root state (config plus per-cell status).
//! - [`refs`] discovers dependencies and renders templates.

pub mod refs;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::loader::load_and_validate;
use crate::config::model::{NotebookConfig, NotebookMeta, ShellCell};
use crate::config::validate::validate_dag;
use crate::dag::{DagScheduler, DependencyGraph};
use crate::errors::{CellDagError, Result};
use crate::exec::{CancelHandle, CellRunner, RunCellArgs, ShellRunner};
use crate::store::{SharedStore, SnapshotStore, StateStore};
use crate::types::{CellId, DagId};

pub use refs::{NotebookFinder, cell_dependencies, render_command, template_refs};
pub use state::{CellStatus, NotebookState, RunStatus, select_config};

/// Scheduler specialised for shell notebooks.
pub type NotebookScheduler =
    DagScheduler<NotebookState, ShellCell, NotebookMeta, NotebookFinder, ShellRunner>;

/// Owns the notebook state and the scheduler driving it.
pub struct Notebook {
    store: Arc<SnapshotStore<NotebookState>>,
    scheduler: NotebookScheduler,
}

impl Notebook {
    pub fn new(config: NotebookConfig) -> Self {
        let store = Arc::new(SnapshotStore::new(NotebookState::new(config)));
        let shared: SharedStore<NotebookState> = store.clone();
        let runner = ShellRunner::new(store.clone());
        let scheduler = DagScheduler::new(shared, select_config, NotebookFinder, runner);
        Self { store, scheduler }
    }

    /// Load and validate a notebook file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_and_validate(path)?))
    }

    pub fn store(&self) -> &Arc<SnapshotStore<NotebookState>> {
        &self.store
    }

    pub fn scheduler(&self) -> &NotebookScheduler {
        &self.scheduler
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.scheduler.runner().cancel_handle()
    }

    /// Kill the running process of one cell, if any. The cascade it belongs
    /// to stops with [`CellDagError::Cancelled`].
    pub fn cancel_cell(&self, dag_id: &str, cell_id: &str) -> bool {
        self.cancel_handle().cancel_cell(dag_id, cell_id)
    }

    /// Pick the DAG to operate on: the requested one, else the current DAG.
    pub fn resolve_dag(&self, requested: Option<&str>) -> Result<DagId> {
        let state = self.store.get_state();
        let config = &state.config;
        let id = match requested {
            Some(id) => id.to_string(),
            None => config
                .current_dag()
                .or_else(|| config.dags_in_order().next())
                .map(|dag| dag.id.clone())
                .ok_or_else(|| CellDagError::ConfigError("notebook has no DAGs".to_string()))?,
        };
        if config.dag(&id).is_none() {
            return Err(CellDagError::UnknownDag(id));
        }
        Ok(id)
    }

    pub fn graph(&self, dag_id: &str) -> Result<DependencyGraph> {
        self.scheduler.dependency_graph(dag_id)
    }

    pub fn roots(&self, dag_id: &str) -> Result<Vec<CellId>> {
        self.scheduler.root_cells(dag_id)
    }

    pub fn order(&self, dag_id: &str) -> Result<Vec<CellId>> {
        self.scheduler.full_order(dag_id)
    }

    pub fn downstream(&self, dag_id: &str, cell_id: &str) -> Result<Vec<CellId>> {
        self.ensure_cell(dag_id, cell_id)?;
        self.scheduler.downstream(dag_id, cell_id)
    }

    /// Run every cell of the DAG in dependency order.
    pub async fn run_all(&self, dag_id: &str) -> Result<()> {
        self.scheduler.run_all_cells_cascade(dag_id).await
    }

    /// Run one cell, then everything downstream of it.
    pub async fn run_cell(&self, dag_id: &str, cell_id: &str) -> Result<()> {
        self.ensure_cell(dag_id, cell_id)?;
        info!(dag = %dag_id, cell = %cell_id, "running cell with downstream cascade");

        let args = RunCellArgs {
            dag_id: dag_id.to_string(),
            cell_id: cell_id.to_string(),
            cascade: true,
            store: self.scheduler.store().clone(),
        };
        self.scheduler.runner().run_cell(args).await?;
        self.scheduler.run_downstream_cascade(dag_id, cell_id).await
    }

    /// Replace a cell's definition, then run it and everything downstream.
    ///
    /// Dependencies are re-derived from the new command. An edit that names
    /// an unknown `after` cell or closes a cycle is rejected and leaves the
    /// notebook unchanged.
    pub async fn update_cell(&self, dag_id: &str, cell_id: &str, cell: ShellCell) -> Result<()> {
        self.ensure_cell(dag_id, cell_id)?;

        let mut candidate = self.store.get_state().config.clone();
        if let Some(dag) = candidate.dags.get_mut(dag_id) {
            dag.cells.insert(cell_id.to_string(), cell.clone());
        }
        validate_dag(&candidate, dag_id)?;

        self.store.update(|state| {
            if let Some(dag) = state.config.dags.get_mut(dag_id) {
                dag.cells.insert(cell_id.to_string(), cell);
            }
        });
        info!(dag = %dag_id, cell = %cell_id, "cell updated");

        self.run_cell(dag_id, cell_id).await
    }

    pub fn status_of(&self, dag_id: &str, cell_id: &str) -> Option<CellStatus> {
        self.store.get_state().status_of(dag_id, cell_id).cloned()
    }

    fn ensure_cell(&self, dag_id: &str, cell_id: &str) -> Result<()> {
        let state = self.store.get_state();
        match state.config.dag(dag_id) {
            None => Err(CellDagError::UnknownDag(dag_id.to_string())),
            Some(dag) if !dag.cells.contains_key(cell_id) => Err(CellDagError::CellNotFound {
                dag: dag_id.to_string(),
                cell: cell_id.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }
}
