// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod notebook;
pub mod store;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::notebook::{Notebook, RunStatus};
use crate::store::StateStore;

pub use crate::dag::{DagScheduler, DependencyFinder, DependencyGraph, FindDependenciesArgs};
pub use crate::exec::{CellRunner, RunCellArgs};
pub use crate::store::{SharedStore, SnapshotStore};
pub use crate::types::{CellId, DagConfig, DagDefinition, DagId};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - notebook loading and validation
/// - DAG selection
/// - the scheduler and shell runner
/// - Ctrl-C handling (aborts the running cell)
pub async fn run(args: CliArgs) -> Result<()> {
    let notebook = Notebook::load(&args.notebook)?;

    if let Command::Check = args.command {
        print_check(&notebook)?;
        return Ok(());
    }

    let dag_id = notebook.resolve_dag(args.dag.as_deref())?;
    debug!(dag = %dag_id, "resolved DAG");

    match args.command {
        Command::Check => {}
        Command::Roots => print_lines(&notebook.roots(&dag_id)?),
        Command::Order => print_lines(&notebook.order(&dag_id)?),
        Command::Downstream { ref cell } => print_lines(&notebook.downstream(&dag_id, cell)?),
        Command::RunAll => {
            spawn_ctrl_c(&notebook);
            let result = notebook.run_all(&dag_id).await;
            print_outputs(&notebook, &dag_id);
            result?;
        }
        Command::Run { ref cell } => {
            spawn_ctrl_c(&notebook);
            let result = notebook.run_cell(&dag_id, cell).await;
            print_outputs(&notebook, &dag_id);
            result?;
        }
    }

    Ok(())
}

/// Ctrl-C → kill the running cell; the cascade stops with `Cancelled`.
fn spawn_ctrl_c(notebook: &Notebook) {
    let cancel = notebook.cancel_handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let cancelled = cancel.cancel_all();
        info!(cancelled, "Ctrl+C received; cancelled running cell");
    });
}

fn print_lines(ids: &[CellId]) {
    for id in ids {
        println!("{id}");
    }
}

/// Print `cell: output` for every cell of the DAG that has run.
fn print_outputs(notebook: &Notebook, dag_id: &str) {
    let state = notebook.store().get_state();
    let Some(dag) = state.config.dag(dag_id) else {
        return;
    };
    for cell_id in dag.cells.keys() {
        let Some(status) = state.status_of(dag_id, cell_id) else {
            continue;
        };
        match status.state {
            RunStatus::Success => {
                println!("{cell_id}: {}", status.output.as_deref().unwrap_or(""))
            }
            RunStatus::Error | RunStatus::Cancelled => println!(
                "{cell_id}: <{:?}> {}",
                status.state,
                status.last_error.as_deref().unwrap_or("")
            ),
            RunStatus::Running => {}
        }
    }
}

/// Check output: DAGs, cells and dependencies. No execution.
fn print_check(notebook: &Notebook) -> Result<()> {
    let state = notebook.store().get_state();
    let config = &state.config;

    println!("celldag check");
    println!(
        "  current_dag = {}",
        config.current_dag_id.as_deref().unwrap_or("<none>")
    );
    println!();

    for dag in config.dags_in_order() {
        let graph = notebook.graph(&dag.id)?;
        match dag.meta.title {
            Some(ref title) => println!("dag {} ({title}), {} cells:", dag.id, dag.cells.len()),
            None => println!("dag {}, {} cells:", dag.id, dag.cells.len()),
        }
        for (name, cell) in dag.cells.iter() {
            println!("  - {name}");
            println!("      cmd: {}", cell.cmd);
            let deps = graph.dependencies_of(name);
            if !deps.is_empty() {
                println!("      depends on: {:?}", deps);
            }
        }
        println!("  order: {:?}", notebook.order(&dag.id)?);
    }

    debug!("check complete (no execution)");
    Ok(())
}
