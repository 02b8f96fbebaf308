// tests/topological_order.rs

use indexmap::{IndexMap, IndexSet};

use celldag::dag::topological_order;

type Adjacency = IndexMap<String, Vec<String>>;

/// Build (dependencies, dependents) from `(cell, deps)` pairs.
fn graph(edges: &[(&str, &[&str])]) -> (Adjacency, Adjacency) {
    let mut dependencies = Adjacency::new();
    let mut dependents = Adjacency::new();
    for (cell, deps) in edges {
        dependencies.insert(cell.to_string(), deps.iter().map(|d| d.to_string()).collect());
        for dep in deps.iter() {
            dependents.entry(dep.to_string()).or_default().push(cell.to_string());
        }
    }
    (dependencies, dependents)
}

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn chain_is_ordered_parents_first() {
    let (deps, dependents) = graph(&[("A", &[]), ("B", &["A"]), ("C", &["B"])]);

    let order = topological_order(&ids(&["A"]), &deps, &dependents, None);

    assert_eq!(order, ids(&["A", "B", "C"]));
}

#[test]
fn diamond_waits_for_all_parents_and_breaks_ties_fifo() {
    // A -> B, A -> C, (B, C) -> D
    let (deps, dependents) = graph(&[
        ("A", &[]),
        ("B", &["A"]),
        ("C", &["A"]),
        ("D", &["B", "C"]),
    ]);

    let order = topological_order(&ids(&["A"]), &deps, &dependents, None);

    assert_eq!(order, ids(&["A", "B", "C", "D"]));
}

#[test]
fn tie_break_follows_discovery_order_not_names() {
    // Z is discovered before Y because it was recorded first as A's dependent.
    let (deps, dependents) = graph(&[("A", &[]), ("Z", &["A"]), ("Y", &["A"])]);

    let order = topological_order(&ids(&["A"]), &deps, &dependents, None);

    assert_eq!(order, ids(&["A", "Z", "Y"]));
}

#[test]
fn only_supplied_roots_seed_the_queue() {
    // Two independent components; only the first root is supplied.
    let (deps, dependents) = graph(&[("A", &[]), ("B", &["A"]), ("X", &[]), ("Y", &["X"])]);

    let order = topological_order(&ids(&["A"]), &deps, &dependents, None);

    assert_eq!(order, ids(&["A", "B"]));
}

#[test]
fn scope_restricts_nodes_and_edges() {
    // S -> A -> B, and B also depends on an out-of-scope O.
    let (deps, dependents) = graph(&[
        ("S", &[]),
        ("O", &[]),
        ("A", &["S"]),
        ("B", &["A", "O"]),
    ]);
    let scope: IndexSet<String> = ids(&["A", "B"]).into_iter().collect();

    let order = topological_order(&ids(&["A"]), &deps, &dependents, Some(&scope));

    assert_eq!(order, ids(&["A", "B"]));
}

#[test]
fn roots_outside_scope_are_ignored() {
    let (deps, dependents) = graph(&[("A", &[]), ("B", &["A"])]);
    let scope: IndexSet<String> = ids(&["B"]).into_iter().collect();

    let order = topological_order(&ids(&["A"]), &deps, &dependents, Some(&scope));

    assert!(order.is_empty());
}

#[test]
fn cycle_members_are_silently_dropped() {
    // R is a real root; A <-> B only reach each other.
    let (deps, dependents) = graph(&[("R", &[]), ("A", &["B"]), ("B", &["A"])]);

    let order = topological_order(&ids(&["R"]), &deps, &dependents, None);

    assert_eq!(order, ids(&["R"]));
}

#[test]
fn node_fed_by_a_cycle_is_dropped_too() {
    let (deps, dependents) = graph(&[
        ("R", &[]),
        ("A", &["R", "B"]),
        ("B", &["A"]),
        ("C", &["B"]),
    ]);

    let order = topological_order(&ids(&["R"]), &deps, &dependents, None);

    assert_eq!(order, ids(&["R"]));
}

#[test]
fn repeated_roots_are_emitted_once() {
    let (deps, dependents) = graph(&[("A", &[]), ("B", &["A"])]);

    let order = topological_order(&ids(&["A", "A"]), &deps, &dependents, None);

    assert_eq!(order, ids(&["A", "B"]));
}

#[test]
fn empty_inputs_give_empty_order() {
    let deps = Adjacency::new();
    let dependents = Adjacency::new();

    assert!(topological_order(&[], &deps, &dependents, None).is_empty());
}
