// src/store.rs

//! Read access to the host application's state.
//!
//! Every scheduler operation asks the store for a fresh snapshot instead of
//! caching anything between calls.

use std::sync::{Arc, RwLock};

/// Source of immutable state snapshots.
pub trait StateStore<S>: Send + Sync {
    /// Current snapshot of the root state.
    fn get_state(&self) -> Arc<S>;
}

impl<S, F> StateStore<S> for F
where
    F: Fn() -> Arc<S> + Send + Sync,
{
    fn get_state(&self) -> Arc<S> {
        self()
    }
}

/// Shared handle to a state store, as passed to cell runners.
pub type SharedStore<S> = Arc<dyn StateStore<S>>;

/// Simple in-memory store publishing whole snapshots.
///
/// Readers keep whatever `Arc` they obtained; writers swap in a new value,
/// so a cascade that already captured its graph is unaffected by updates
/// made while it runs.
#[derive(Debug, Default)]
pub struct SnapshotStore<S> {
    current: RwLock<Arc<S>>,
}

impl<S> SnapshotStore<S> {
    pub fn new(state: S) -> Self {
        Self {
            current: RwLock::new(Arc::new(state)),
        }
    }

    /// Replace the whole state.
    pub fn replace(&self, state: S) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(state);
    }

    /// Copy-on-write update of the current state.
    pub fn update<F>(&self, f: F)
    where
        S: Clone,
        F: FnOnce(&mut S),
    {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(Arc::make_mut(&mut *guard));
    }
}

impl<S: Send + Sync> StateStore<S> for SnapshotStore<S> {
    fn get_state(&self) -> Arc<S> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
