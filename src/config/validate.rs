// src/config/validate.rs

use indexmap::IndexMap;

use crate::config::model::{NotebookConfig, NotebookMeta, RawNotebook, ShellCell};
use crate::dag::build_graph_for_dag;
use crate::errors::{CellDagError, Result};
use crate::notebook::{NotebookFinder, NotebookState};
use crate::store::{SnapshotStore, StateStore};
use crate::types::{CellId, DagDefinition, DagId};

impl TryFrom<RawNotebook> for NotebookConfig {
    type Error = CellDagError;

    fn try_from(raw: RawNotebook) -> std::result::Result<Self, Self::Error> {
        validate_raw_notebook(&raw)?;
        let config = into_config(raw);
        validate_acyclic(&config)?;
        Ok(config)
    }
}

fn validate_raw_notebook(raw: &RawNotebook) -> Result<()> {
    ensure_has_dags(raw)?;
    validate_dag_order(raw)?;
    validate_current_dag(raw)?;
    validate_cell_dependencies(raw)?;
    Ok(())
}

fn ensure_has_dags(raw: &RawNotebook) -> Result<()> {
    if raw.dags.is_empty() {
        return Err(CellDagError::ConfigError(
            "notebook must contain at least one [dags.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_dag_order(raw: &RawNotebook) -> Result<()> {
    for (idx, id) in raw.dag_order.iter().enumerate() {
        if !raw.dags.contains_key(id) {
            return Err(CellDagError::ConfigError(format!(
                "dag_order references unknown DAG '{}'",
                id
            )));
        }
        if raw.dag_order[..idx].contains(id) {
            return Err(CellDagError::ConfigError(format!(
                "dag_order lists DAG '{}' more than once",
                id
            )));
        }
    }
    Ok(())
}

fn validate_current_dag(raw: &RawNotebook) -> Result<()> {
    if let Some(ref id) = raw.current_dag {
        if !raw.dags.contains_key(id) {
            return Err(CellDagError::ConfigError(format!(
                "current_dag references unknown DAG '{}'",
                id
            )));
        }
    }
    Ok(())
}

fn validate_cell_dependencies(raw: &RawNotebook) -> Result<()> {
    for (dag_id, dag) in raw.dags.iter() {
        check_after(dag_id, &dag.cells)?;
    }
    Ok(())
}

fn check_after(dag_id: &str, cells: &IndexMap<CellId, ShellCell>) -> Result<()> {
    for (name, cell) in cells.iter() {
        for dep in cell.after.iter() {
            if dep == name {
                return Err(CellDagError::ConfigError(format!(
                    "cell '{}/{}' cannot depend on itself in `after`",
                    dag_id, name
                )));
            }
            if !cells.contains_key(dep) {
                return Err(CellDagError::ConfigError(format!(
                    "cell '{}/{}' has unknown dependency '{}' in `after`",
                    dag_id, name, dep
                )));
            }
        }
    }
    Ok(())
}

fn into_config(raw: RawNotebook) -> NotebookConfig {
    // Listed DAGs first, then the rest in declaration order.
    let mut dag_order: Vec<DagId> = raw.dag_order.clone();
    for id in raw.dags.keys() {
        if !dag_order.contains(id) {
            dag_order.push(id.clone());
        }
    }

    let current_dag_id = raw.current_dag.or_else(|| dag_order.first().cloned());

    let dags: IndexMap<DagId, DagDefinition<_, NotebookMeta>> = raw
        .dags
        .into_iter()
        .map(|(id, dag)| {
            let definition = DagDefinition {
                id: id.clone(),
                cells: dag.cells,
                meta: NotebookMeta { title: dag.title },
            };
            (id, definition)
        })
        .collect();

    NotebookConfig {
        dags,
        dag_order,
        current_dag_id,
    }
}

/// Reject notebooks whose derived dependency graph has a cycle.
fn validate_acyclic(config: &NotebookConfig) -> Result<()> {
    let snapshot = SnapshotStore::new(NotebookState::new(config.clone()));

    for (dag_id, dag) in config.dags.iter() {
        check_acyclic(&snapshot, dag_id, dag)?;
    }
    Ok(())
}

/// Re-check one DAG of an already validated config after an edit.
pub(crate) fn validate_dag(config: &NotebookConfig, dag_id: &str) -> Result<()> {
    let Some(dag) = config.dag(dag_id) else {
        return Err(CellDagError::UnknownDag(dag_id.to_string()));
    };
    check_after(dag_id, &dag.cells)?;

    let snapshot = SnapshotStore::new(NotebookState::new(config.clone()));
    check_acyclic(&snapshot, dag_id, dag)
}

fn check_acyclic(
    snapshot: &SnapshotStore<NotebookState>,
    dag_id: &str,
    dag: &DagDefinition<ShellCell, NotebookMeta>,
) -> Result<()> {
    let store: &dyn StateStore<NotebookState> = snapshot;
    let graph = build_graph_for_dag(dag_id, dag, store, &NotebookFinder)?;
    if let Some(cell) = graph.find_cycle() {
        return Err(CellDagError::DagCycle(format!(
            "cycle detected in DAG '{}' involving cell '{}'",
            dag_id, cell
        )));
    }
    Ok(())
}
