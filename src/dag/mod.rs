// src/dag/mod.rs

//! Dependency graph construction and scheduling.
//!
//! - [`graph`] builds the per-call "depends on" / "is depended on by" maps.
//! - [`topo`] turns a set of start cells into an execution order.
//! - [`reach`] collects everything downstream of a changed cell.
//! - [`scheduler`] composes the three and drives cascades.

pub mod graph;
pub mod reach;
pub mod scheduler;
pub mod topo;

pub use graph::{
    DagConfigSelector, DependencyFinder, DependencyGraph, FindDependenciesArgs,
    build_dependency_graph, build_graph_for_dag,
};
pub use reach::collect_reachable;
pub use scheduler::{DagScheduler, downstream_order};
pub use topo::topological_order;
