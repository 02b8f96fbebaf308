// src/exec/mod.rs

//! Cell execution layer.
//!
//! - [`backend`] provides the `CellRunner` trait the scheduler calls for each
//!   cell, so tests can swap in a fake runner.
//! - [`command`] contains `ShellRunner`, which runs notebook cells as shell
//!   commands using `tokio::process::Command`.

pub mod backend;
pub mod command;

pub use backend::{CellFuture, CellRunner, RunCellArgs};
pub use command::{CancelHandle, ShellRunner};
