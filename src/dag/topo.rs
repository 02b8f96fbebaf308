// src/dag/topo.rs

//! Scope-aware Kahn's algorithm.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};

use crate::types::CellId;

/// Compute an execution order starting from `roots`.
///
/// In-degrees are counted over `dependencies`, restricted to `scope` when
/// given. Only the supplied roots seed the FIFO queue; a node is emitted
/// once every in-scope dependency has been emitted. Nodes that never reach
/// in-degree zero (cycles, or not reachable from any root) are left out
/// without error.
///
/// Roots are expected to have no in-scope dependencies. A node is never
/// emitted twice, even if `roots` repeats it.
pub fn topological_order(
    roots: &[CellId],
    dependencies: &IndexMap<CellId, Vec<CellId>>,
    dependents: &IndexMap<CellId, Vec<CellId>>,
    scope: Option<&IndexSet<CellId>>,
) -> Vec<CellId> {
    let in_scope = |id: &str| scope.is_none_or(|s| s.contains(id));

    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for (cell_id, deps) in dependencies {
        if !in_scope(cell_id) {
            continue;
        }
        in_degree.entry(cell_id.as_str()).or_insert(0);
        for dep in deps.iter().filter(|d| in_scope(d)) {
            *in_degree.entry(cell_id.as_str()).or_insert(0) += 1;
            in_degree.entry(dep.as_str()).or_insert(0);
        }
    }

    let mut queue: VecDeque<&str> = roots
        .iter()
        .map(String::as_str)
        .filter(|id| in_scope(id))
        .collect();

    let mut emitted: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();

    while let Some(current) = queue.pop_front() {
        if !emitted.insert(current) {
            continue;
        }
        order.push(current.to_string());

        let children = dependents.get(current).map(Vec::as_slice).unwrap_or(&[]);
        for child in children.iter().filter(|c| in_scope(c)) {
            let degree = in_degree.entry(child.as_str()).or_insert(0);
            // Already at zero: the child was seeded as a root or is
            // unreachable through this edge set; never wrap below zero.
            if *degree == 0 {
                continue;
            }
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(child.as_str());
            }
        }
    }

    order
}
