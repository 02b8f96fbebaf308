// src/exec/backend.rs

//! Pluggable "run one cell" abstraction.
//!
//! The scheduler talks to a `CellRunner` instead of executing anything
//! itself. Production hosts provide the real implementation (see
//! [`ShellRunner`](super::command::ShellRunner)); tests provide fakes that
//! record calls or fail on purpose.

use std::future::Future;
use std::pin::Pin;

use crate::store::SharedStore;
use crate::types::{CellId, DagId};

/// Boxed future returned by [`CellRunner::run_cell`].
pub type CellFuture<'a, E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send + 'a>>;

/// Arguments for running a single cell.
pub struct RunCellArgs<S> {
    pub dag_id: DagId,
    pub cell_id: CellId,
    /// Always `false` when the scheduler drives a cascade: the scheduler owns
    /// cascading and the runner must not trigger downstream cells itself.
    pub cascade: bool,
    pub store: SharedStore<S>,
}

impl<S> Clone for RunCellArgs<S> {
    fn clone(&self) -> Self {
        Self {
            dag_id: self.dag_id.clone(),
            cell_id: self.cell_id.clone(),
            cascade: self.cascade,
            store: self.store.clone(),
        }
    }
}

impl<S> std::fmt::Debug for RunCellArgs<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunCellArgs")
            .field("dag_id", &self.dag_id)
            .field("cell_id", &self.cell_id)
            .field("cascade", &self.cascade)
            .finish_non_exhaustive()
    }
}

/// Trait abstracting how one cell is executed.
///
/// This is the only side-effecting collaborator of the scheduler. It is
/// called sequentially: the next cell starts only after the returned future
/// resolved with `Ok`.
pub trait CellRunner<S>: Send + Sync {
    type Error;

    fn run_cell(&self, args: RunCellArgs<S>) -> CellFuture<'_, Self::Error>;
}
