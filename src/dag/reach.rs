// src/dag/reach.rs

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use crate::types::CellId;

/// Breadth-first collection of every cell that depends on `start_id`,
/// directly or transitively.
///
/// `start_id` itself is only part of the result if it sits on a cycle back
/// to itself. Iteration order of the returned set is discovery order.
pub fn collect_reachable(
    start_id: &str,
    dependents: &IndexMap<CellId, Vec<CellId>>,
) -> IndexSet<CellId> {
    let mut reachable: IndexSet<CellId> = IndexSet::new();
    let mut queue: VecDeque<&CellId> = children(dependents, start_id).iter().collect();

    while let Some(next) = queue.pop_front() {
        if !reachable.insert(next.clone()) {
            continue;
        }
        queue.extend(children(dependents, next));
    }

    reachable
}

fn children<'a>(dependents: &'a IndexMap<CellId, Vec<CellId>>, id: &str) -> &'a [CellId] {
    dependents.get(id).map(Vec::as_slice).unwrap_or(&[])
}
