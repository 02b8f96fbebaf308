// src/dag/scheduler.rs

use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::dag::graph::{
    DagConfigSelector, DependencyFinder, DependencyGraph, build_dependency_graph,
};
use crate::dag::reach::collect_reachable;
use crate::dag::topo::topological_order;
use crate::exec::{CellRunner, RunCellArgs};
use crate::store::SharedStore;
use crate::types::CellId;

/// Dependency-driven cell scheduler.
///
/// Holds no graph of its own: every operation reads a fresh snapshot from
/// the store, rebuilds the [`DependencyGraph`] and discards it afterwards.
/// It is responsible for:
/// - finding root cells (no dependencies)
/// - listing, in execution order, the cells downstream of a changed cell
/// - driving cascades through the [`CellRunner`], one cell at a time
///
/// Collaborator errors are returned unchanged; the first one stops the
/// operation.
pub struct DagScheduler<S, C, M, F, R> {
    store: SharedStore<S>,
    select: DagConfigSelector<S, C, M>,
    finder: F,
    runner: R,
}

impl<S, C, M, F, R> DagScheduler<S, C, M, F, R>
where
    F: DependencyFinder<S, C>,
{
    pub fn new(store: SharedStore<S>, select: DagConfigSelector<S, C, M>, finder: F, runner: R) -> Self {
        Self {
            store,
            select,
            finder,
            runner,
        }
    }

    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Fresh dependency graph of `dag_id`.
    pub fn dependency_graph(&self, dag_id: &str) -> Result<DependencyGraph, F::Error> {
        build_dependency_graph(dag_id, self.store.as_ref(), self.select, &self.finder)
    }

    /// Cells of `dag_id` with no dependencies, in declaration order.
    pub fn root_cells(&self, dag_id: &str) -> Result<Vec<CellId>, F::Error> {
        Ok(self.dependency_graph(dag_id)?.roots())
    }

    /// Cells that must re-run after `source_cell_id` changed, in execution
    /// order. Never contains the source itself.
    pub fn downstream(&self, dag_id: &str, source_cell_id: &str) -> Result<Vec<CellId>, F::Error> {
        let graph = self.dependency_graph(dag_id)?;
        Ok(downstream_order(&graph, source_cell_id))
    }

    /// Execution order of the whole DAG, seeded from its root cells.
    pub fn full_order(&self, dag_id: &str) -> Result<Vec<CellId>, F::Error> {
        let graph = self.dependency_graph(dag_id)?;
        Ok(full_order(dag_id, &graph))
    }
}

impl<S, C, M, F, R> DagScheduler<S, C, M, F, R>
where
    F: DependencyFinder<S, C>,
    R: CellRunner<S, Error = F::Error>,
{
    /// Run every cell of `dag_id` in dependency order, roots first.
    pub async fn run_all_cells_cascade(&self, dag_id: &str) -> Result<(), F::Error> {
        let order = self.full_order(dag_id)?;
        self.run_in_order(dag_id, order).await
    }

    /// Run the cells downstream of `source_cell_id`.
    ///
    /// The source itself is not run; the caller runs it before asking for
    /// its cascade.
    pub async fn run_downstream_cascade(
        &self,
        dag_id: &str,
        source_cell_id: &str,
    ) -> Result<(), F::Error> {
        let order = self.downstream(dag_id, source_cell_id)?;
        self.run_in_order(dag_id, order).await
    }

    async fn run_in_order(&self, dag_id: &str, order: Vec<CellId>) -> Result<(), F::Error> {
        if order.is_empty() {
            debug!(dag = %dag_id, "nothing to run");
            return Ok(());
        }

        info!(dag = %dag_id, cells = order.len(), "starting cascade");

        for (position, cell_id) in order.iter().enumerate() {
            debug!(dag = %dag_id, cell = %cell_id, position, "running cell");
            let args = RunCellArgs {
                dag_id: dag_id.to_string(),
                cell_id: cell_id.clone(),
                cascade: false,
                store: self.store.clone(),
            };
            if let Err(err) = self.runner.run_cell(args).await {
                warn!(
                    dag = %dag_id,
                    cell = %cell_id,
                    skipped = order.len() - position - 1,
                    "cell failed; stopping cascade"
                );
                return Err(err);
            }
        }

        info!(dag = %dag_id, cells = order.len(), "cascade finished");
        Ok(())
    }
}

/// Order of the whole graph, seeded from its zero-dependency cells.
fn full_order(dag_id: &str, graph: &DependencyGraph) -> Vec<CellId> {
    let roots = graph.roots();
    let order = topological_order(&roots, &graph.dependencies, &graph.dependents, None);

    if order.len() < graph.dependencies.len() {
        let emitted: HashSet<&CellId> = order.iter().collect();
        let omitted: Vec<&CellId> = graph
            .dependencies
            .keys()
            .filter(|id| !emitted.contains(id))
            .collect();
        warn!(dag = %dag_id, ?omitted, "cells left out of execution order (dependency cycle?)");
    }

    order
}

/// Scoped order of everything reachable from `source_cell_id`, excluding it.
pub fn downstream_order(graph: &DependencyGraph, source_cell_id: &str) -> Vec<CellId> {
    let mut reachable: IndexSet<CellId> = collect_reachable(source_cell_id, &graph.dependents);
    if reachable.is_empty() {
        return Vec::new();
    }
    reachable.shift_remove(source_cell_id);

    let roots_within_scope: Vec<CellId> = reachable
        .iter()
        .filter(|id| {
            !graph
                .dependencies_of(id)
                .iter()
                .any(|dep| reachable.contains(dep))
        })
        .cloned()
        .collect();

    topological_order(
        &roots_within_scope,
        &graph.dependencies,
        &graph.dependents,
        Some(&reachable),
    )
}
