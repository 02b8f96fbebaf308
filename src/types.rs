// src/types.rs

//! Identifiers and the DAG configuration model shared by the scheduler and
//! its hosts.

use indexmap::IndexMap;
use serde::Deserialize;

/// Identifier of a cell, unique within its DAG.
pub type CellId = String;

/// Identifier of a DAG (one notebook sheet or canvas worth of cells).
pub type DagId = String;

/// One named collection of cells.
///
/// The engine never inspects `C` or `M`; cells are only handed to the
/// dependency finder. Cell order is declaration order and is what breaks
/// ties when several cells become ready at once.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "C: Deserialize<'de>, M: Deserialize<'de> + Default"))]
pub struct DagDefinition<C, M = ()> {
    #[serde(default)]
    pub id: DagId,
    #[serde(default = "IndexMap::new")]
    pub cells: IndexMap<CellId, C>,
    #[serde(default)]
    pub meta: M,
}

impl<C, M> DagDefinition<C, M> {
    pub fn new(id: impl Into<DagId>, meta: M) -> Self {
        Self {
            id: id.into(),
            cells: IndexMap::new(),
            meta,
        }
    }

    pub fn with_cell(mut self, id: impl Into<CellId>, cell: C) -> Self {
        self.cells.insert(id.into(), cell);
        self
    }
}

/// Root structure handed to the scheduler through a selector.
///
/// `dag_order` is a display order only; it carries no dependency meaning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "C: Deserialize<'de>, M: Deserialize<'de> + Default"))]
pub struct DagConfig<C, M = ()> {
    #[serde(default = "IndexMap::new")]
    pub dags: IndexMap<DagId, DagDefinition<C, M>>,
    #[serde(default)]
    pub dag_order: Vec<DagId>,
    #[serde(default)]
    pub current_dag_id: Option<DagId>,
}

impl<C, M> Default for DagConfig<C, M> {
    fn default() -> Self {
        Self {
            dags: IndexMap::new(),
            dag_order: Vec::new(),
            current_dag_id: None,
        }
    }
}

impl<C, M> DagConfig<C, M> {
    /// Insert (or replace) a DAG, appending it to `dag_order` if new.
    pub fn insert_dag(&mut self, dag: DagDefinition<C, M>) {
        if !self.dag_order.contains(&dag.id) {
            self.dag_order.push(dag.id.clone());
        }
        self.dags.insert(dag.id.clone(), dag);
    }

    pub fn dag(&self, dag_id: &str) -> Option<&DagDefinition<C, M>> {
        self.dags.get(dag_id)
    }

    /// The DAG named by `current_dag_id`, if it is set and defined.
    pub fn current_dag(&self) -> Option<&DagDefinition<C, M>> {
        self.current_dag_id.as_deref().and_then(|id| self.dag(id))
    }

    /// DAGs in display order. Ids in `dag_order` without a definition are
    /// skipped.
    pub fn dags_in_order(&self) -> impl Iterator<Item = &DagDefinition<C, M>> {
        self.dag_order.iter().filter_map(|id| self.dags.get(id))
    }
}
