// src/dag/graph.rs

use indexmap::{IndexMap, IndexSet};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::store::StateStore;
use crate::types::{CellId, DagConfig, DagDefinition};

/// Selector pulling the [`DagConfig`] out of the host's root state.
pub type DagConfigSelector<S, C, M> = fn(&S) -> Option<&DagConfig<C, M>>;

/// Arguments handed to a [`DependencyFinder`] for one cell.
pub struct FindDependenciesArgs<'a, S, C> {
    pub dag_id: &'a str,
    pub cell_id: &'a str,
    pub cell: &'a C,
    pub cells: &'a IndexMap<CellId, C>,
    pub store: &'a dyn StateStore<S>,
}

/// Discovers the upstream neighbours of a cell from its content.
///
/// Must be a pure, synchronous function of its arguments. Duplicates in the
/// returned list are ignored.
pub trait DependencyFinder<S, C>: Send + Sync {
    type Error;

    fn find_dependencies(
        &self,
        args: FindDependenciesArgs<'_, S, C>,
    ) -> Result<Vec<CellId>, Self::Error>;
}

impl<S, C, E, F> DependencyFinder<S, C> for F
where
    F: Fn(FindDependenciesArgs<'_, S, C>) -> Result<Vec<CellId>, E> + Send + Sync,
{
    type Error = E;

    fn find_dependencies(
        &self,
        args: FindDependenciesArgs<'_, S, C>,
    ) -> Result<Vec<CellId>, E> {
        self(args)
    }
}

/// Per-call adjacency maps of one DAG.
///
/// `dependents` is the exact transpose of `dependencies`. Every cell of the
/// DAG is a key of `dependencies`; a cell is a key of `dependents` only when
/// something depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    pub dependencies: IndexMap<CellId, Vec<CellId>>,
    pub dependents: IndexMap<CellId, Vec<CellId>>,
}

impl DependencyGraph {
    /// Immediate dependencies of a cell.
    pub fn dependencies_of(&self, cell: &str) -> &[CellId] {
        self.dependencies
            .get(cell)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a cell.
    pub fn dependents_of(&self, cell: &str) -> &[CellId] {
        self.dependents
            .get(cell)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Cells with no recorded dependencies, in declaration order.
    pub fn roots(&self) -> Vec<CellId> {
        self.dependencies
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    fn record(&mut self, cell_id: &str, deps: Vec<CellId>) {
        for dep in &deps {
            let list = self.dependents.entry(dep.clone()).or_default();
            if !list.iter().any(|c| c == cell_id) {
                list.push(cell_id.to_string());
            }
        }
        self.dependencies.insert(cell_id.to_string(), deps);
    }

    /// Return one cell taking part in a dependency cycle, if there is any.
    ///
    /// Scheduling never calls this; cyclic cells are silently left out of
    /// topological orders. Hosts use it to reject or report bad input.
    pub fn find_cycle(&self) -> Option<CellId> {
        // Edge direction: dep -> cell.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (cell, deps) in &self.dependencies {
            graph.add_node(cell.as_str());
            for dep in deps {
                graph.add_edge(dep.as_str(), cell.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_) => None,
            Err(cycle) => Some(cycle.node_id().to_string()),
        }
    }
}

/// Build the adjacency maps of one DAG definition.
///
/// The finder is called exactly once per cell, in declaration order. The
/// first error stops the build and is returned as is.
pub fn build_graph_for_dag<S, C, M, F>(
    dag_id: &str,
    dag: &DagDefinition<C, M>,
    store: &dyn StateStore<S>,
    finder: &F,
) -> Result<DependencyGraph, F::Error>
where
    F: DependencyFinder<S, C> + ?Sized,
{
    let mut graph = DependencyGraph::default();

    for (cell_id, cell) in &dag.cells {
        let found = finder
            .find_dependencies(FindDependenciesArgs {
                dag_id,
                cell_id,
                cell,
                cells: &dag.cells,
                store,
            })
            .inspect_err(|_| {
                warn!(dag = %dag_id, cell = %cell_id, "dependency discovery failed");
            })?;

        let deps: Vec<CellId> = found
            .into_iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        graph.record(cell_id, deps);
    }

    debug!(
        dag = %dag_id,
        cells = graph.dependencies.len(),
        "built dependency graph"
    );

    Ok(graph)
}

/// Build a fresh [`DependencyGraph`] for `dag_id` from the store's current
/// snapshot.
///
/// An unknown DAG (or a state without a config) yields an empty graph.
pub fn build_dependency_graph<S, C, M, F>(
    dag_id: &str,
    store: &dyn StateStore<S>,
    select: DagConfigSelector<S, C, M>,
    finder: &F,
) -> Result<DependencyGraph, F::Error>
where
    F: DependencyFinder<S, C> + ?Sized,
{
    let state = store.get_state();
    match select(state.as_ref()).and_then(|config| config.dag(dag_id)) {
        Some(dag) => build_graph_for_dag(dag_id, dag, store, finder),
        None => {
            debug!(dag = %dag_id, "unknown DAG; using empty graph");
            Ok(DependencyGraph::default())
        }
    }
}
