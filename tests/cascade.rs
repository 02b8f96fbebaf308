// tests/cascade.rs

use std::sync::{Arc, Mutex};

use celldag::exec::{CellFuture, CellRunner, RunCellArgs};
use celldag::store::{SharedStore, SnapshotStore, StateStore};
use celldag::{DagScheduler, FindDependenciesArgs};
use celldag_test_utils::builders::{
    DagBuilder, DagConfigBuilder, TestCell, TestConfig, TestState, declared_deps, fixed_store,
    select_config, test_scheduler,
};
use celldag_test_utils::recording_runner::{RecordedCall, RecordingRunner};
use celldag_test_utils::{init_tracing, with_timeout};

fn chain() -> TestConfig {
    DagConfigBuilder::new()
        .with_dag(
            DagBuilder::new("main")
                .cell("A", &[])
                .cell("B", &["A"])
                .cell("C", &["B"]),
        )
        .build()
}

/// S -> X -> Y -> Z
fn long_chain() -> TestConfig {
    DagConfigBuilder::new()
        .with_dag(
            DagBuilder::new("main")
                .cell("S", &[])
                .cell("X", &["S"])
                .cell("Y", &["X"])
                .cell("Z", &["Y"]),
        )
        .build()
}

#[tokio::test]
async fn run_all_runs_chain_in_order() {
    init_tracing();
    let runner = RecordingRunner::new();
    let scheduler = test_scheduler(chain(), runner.clone());

    with_timeout(scheduler.run_all_cells_cascade("main"))
        .await
        .unwrap();

    assert_eq!(runner.executed(), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn runner_is_never_asked_to_cascade() {
    let runner = RecordingRunner::new();
    let scheduler = test_scheduler(long_chain(), runner.clone());

    scheduler.run_all_cells_cascade("main").await.unwrap();
    scheduler.run_downstream_cascade("main", "S").await.unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 7);
    assert!(calls.iter().all(|c| !c.cascade));
    assert!(calls.iter().all(|c| c.dag_id == "main"));
}

#[tokio::test]
async fn downstream_cascade_skips_the_source() {
    let runner = RecordingRunner::new();
    let scheduler = test_scheduler(long_chain(), runner.clone());

    scheduler.run_downstream_cascade("main", "X").await.unwrap();

    assert_eq!(runner.executed(), vec!["Y", "Z"]);
}

#[tokio::test]
async fn failure_stops_the_cascade_and_is_returned_unchanged() {
    init_tracing();
    let runner = RecordingRunner::new().failing_on("Y");
    let scheduler = test_scheduler(long_chain(), runner.clone());

    let err = with_timeout(scheduler.run_downstream_cascade("main", "S"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "cell Y failed");
    assert_eq!(runner.executed(), vec!["X", "Y"]);
}

#[tokio::test]
async fn failure_during_run_all_skips_later_cells() {
    let runner = RecordingRunner::new().failing_on("B");
    let scheduler = test_scheduler(chain(), runner.clone());

    assert!(scheduler.run_all_cells_cascade("main").await.is_err());
    assert_eq!(runner.executed(), vec!["A", "B"]);
}

#[tokio::test]
async fn unknown_dag_or_leaf_runs_nothing() {
    let runner = RecordingRunner::new();
    let scheduler = test_scheduler(chain(), runner.clone());

    scheduler.run_all_cells_cascade("other").await.unwrap();
    scheduler.run_downstream_cascade("other", "A").await.unwrap();
    scheduler.run_downstream_cascade("main", "C").await.unwrap();

    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn cyclic_cells_are_never_run() {
    let cfg = DagConfigBuilder::new()
        .with_dag(
            DagBuilder::new("main")
                .cell("R", &[])
                .cell("A", &["R", "B"])
                .cell("B", &["A"]),
        )
        .build();
    let runner = RecordingRunner::new();
    let scheduler = test_scheduler(cfg, runner.clone());

    scheduler.run_all_cells_cascade("main").await.unwrap();

    assert_eq!(
        runner.calls(),
        vec![RecordedCall {
            dag_id: "main".to_string(),
            cell_id: "R".to_string(),
            cascade: false,
        }]
    );
}

/// Runner that adds a new dependent of `A` to the config while `A` runs.
struct MutatingRunner {
    store: Arc<SnapshotStore<TestState>>,
    executed: Mutex<Vec<String>>,
}

impl CellRunner<TestState> for MutatingRunner {
    type Error = anyhow::Error;

    fn run_cell(&self, args: RunCellArgs<TestState>) -> CellFuture<'_, anyhow::Error> {
        Box::pin(async move {
            if args.cell_id == "A" {
                self.store.update(|state| {
                    if let Some(dag) = state.config.dags.get_mut("main") {
                        dag.cells.insert(
                            "N".to_string(),
                            TestCell {
                                deps: vec!["A".to_string()],
                            },
                        );
                    }
                });
            }
            self.executed.lock().unwrap().push(args.cell_id);
            Ok(())
        })
    }
}

#[tokio::test]
async fn snapshot_changes_apply_to_the_next_cascade_only() {
    let store = Arc::new(SnapshotStore::new(TestState { config: chain() }));
    let runner = MutatingRunner {
        store: store.clone(),
        executed: Mutex::new(Vec::new()),
    };
    let shared: SharedStore<TestState> = store.clone();
    let scheduler = DagScheduler::new(shared, select_config, declared_deps, runner);

    scheduler.run_all_cells_cascade("main").await.unwrap();
    assert_eq!(
        *scheduler.runner().executed.lock().unwrap(),
        vec!["A", "B", "C"]
    );

    assert!(store.get_state().config.dag("main").unwrap().cells.contains_key("N"));
    assert_eq!(
        scheduler.downstream("main", "A").unwrap(),
        vec!["B".to_string(), "N".to_string(), "C".to_string()]
    );
}

/// Dependency discovery that cannot handle cell `B`.
fn finder_failing_on_b(
    args: FindDependenciesArgs<'_, TestState, TestCell>,
) -> anyhow::Result<Vec<String>> {
    if args.cell_id == "B" {
        anyhow::bail!("boom");
    }
    Ok(args.cell.deps.clone())
}

#[tokio::test]
async fn finder_error_reaches_every_operation_and_runs_nothing() {
    let runner = RecordingRunner::new();
    let scheduler = DagScheduler::new(
        fixed_store(chain()),
        select_config,
        finder_failing_on_b,
        runner.clone(),
    );

    assert_eq!(scheduler.root_cells("main").unwrap_err().to_string(), "boom");
    assert_eq!(
        scheduler.downstream("main", "A").unwrap_err().to_string(),
        "boom"
    );
    assert_eq!(
        scheduler
            .run_all_cells_cascade("main")
            .await
            .unwrap_err()
            .to_string(),
        "boom"
    );
    assert_eq!(
        scheduler
            .run_downstream_cascade("main", "A")
            .await
            .unwrap_err()
            .to_string(),
        "boom"
    );

    assert!(runner.calls().is_empty());
}
