#![allow(dead_code)]

//! Builders for in-memory DAG configs.
//!
//! Test cells are `TestCell`s: a plain list of upstream cell ids, so the
//! dependency finder is just "return the list".

use std::sync::Arc;

use celldag::dag::FindDependenciesArgs;
use celldag::store::SharedStore;
use celldag::{CellId, DagConfig, DagDefinition, DagScheduler};

/// Cell whose dependencies are spelled out explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestCell {
    pub deps: Vec<CellId>,
}

/// Root state used by scheduler tests.
#[derive(Debug, Clone, Default)]
pub struct TestState {
    pub config: DagConfig<TestCell>,
}

pub type TestConfig = DagConfig<TestCell>;

/// Selector for [`TestState`].
pub fn select_config(state: &TestState) -> Option<&TestConfig> {
    Some(&state.config)
}

/// Finder returning the cell's declared deps verbatim.
pub fn declared_deps(
    args: FindDependenciesArgs<'_, TestState, TestCell>,
) -> Result<Vec<CellId>, anyhow::Error> {
    Ok(args.cell.deps.clone())
}

/// Nameable form of [`declared_deps`].
pub type DeclaredDeps =
    fn(FindDependenciesArgs<'_, TestState, TestCell>) -> Result<Vec<CellId>, anyhow::Error>;

/// Scheduler over [`TestState`] using [`declared_deps`].
pub type TestScheduler<R> = DagScheduler<TestState, TestCell, (), DeclaredDeps, R>;

/// Scheduler reading a fixed snapshot of `config`.
pub fn test_scheduler<R>(config: TestConfig, runner: R) -> TestScheduler<R> {
    DagScheduler::new(
        fixed_store(config),
        select_config,
        declared_deps as DeclaredDeps,
        runner,
    )
}

/// Store that always returns the same snapshot.
pub fn fixed_store(config: TestConfig) -> SharedStore<TestState> {
    let state = Arc::new(TestState { config });
    Arc::new(move || state.clone())
}

/// Builder for one DAG.
pub struct DagBuilder {
    dag: DagDefinition<TestCell>,
}

impl DagBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            dag: DagDefinition::new(id, ()),
        }
    }

    /// Add a cell depending on `deps` (in that order).
    pub fn cell(mut self, id: &str, deps: &[&str]) -> Self {
        self.dag.cells.insert(
            id.to_string(),
            TestCell {
                deps: deps.iter().map(|d| d.to_string()).collect(),
            },
        );
        self
    }

    pub fn build(self) -> DagDefinition<TestCell> {
        self.dag
    }
}

/// Builder for a whole config.
pub struct DagConfigBuilder {
    config: TestConfig,
}

impl DagConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DagConfig::default(),
        }
    }

    pub fn with_dag(mut self, dag: DagBuilder) -> Self {
        self.config.insert_dag(dag.build());
        self
    }

    pub fn current(mut self, id: &str) -> Self {
        self.config.current_dag_id = Some(id.to_string());
        self
    }

    pub fn build(self) -> TestConfig {
        self.config
    }
}

impl Default for DagConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
