// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{NotebookConfig, RawNotebook};
use crate::errors::Result;

/// Load a notebook file and return the raw, unvalidated model.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for
/// reference and cycle checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawNotebook> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Parse notebook TOML from a string.
pub fn parse_str(contents: &str) -> Result<RawNotebook> {
    let raw: RawNotebook = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a notebook file and validate it into a [`NotebookConfig`].
///
/// - Reads TOML.
/// - Fills in `dag_order` / `current_dag` defaults.
/// - Checks for unknown DAG ids, unknown or self `after` references, and
///   dependency cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<NotebookConfig> {
    let raw = load_from_path(path)?;
    NotebookConfig::try_from(raw)
}

/// Notebook path used when `--notebook` is not given.
pub fn default_notebook_path() -> PathBuf {
    PathBuf::from("Notebook.toml")
}
