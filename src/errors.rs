// src/errors.rs

//! Crate-wide error type for the notebook host.
//!
//! The scheduler itself is generic over its collaborators' error type and
//! never wraps them; this enum is what the bundled notebook host (config
//! loading, shell runner, CLI) reports.

use thiserror::Error;

use crate::types::{CellId, DagId};

#[derive(Error, Debug)]
pub enum CellDagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("Unknown DAG: {0}")]
    UnknownDag(DagId),

    #[error("Cell not found: {dag}/{cell}")]
    CellNotFound { dag: DagId, cell: CellId },

    #[error("Cell '{cell}' failed with exit code {code}: {stderr}")]
    CellFailed {
        cell: CellId,
        code: i32,
        stderr: String,
    },

    #[error("Cell '{0}' was cancelled")]
    Cancelled(CellId),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CellDagError>;
