// src/config/model.rs

use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::{CellId, DagConfig, DagId};

/// Validated notebook: the scheduler's [`DagConfig`] over shell cells.
pub type NotebookConfig = DagConfig<ShellCell, NotebookMeta>;

/// Top-level notebook file as read from TOML.
///
/// ```toml
/// current_dag = "main"
/// dag_order = ["main"]
///
/// [dags.main]
/// title = "Example"
///
/// [dags.main.cells.A]
/// cmd = "echo 1"
///
/// [dags.main.cells.B]
/// cmd = "echo $(( {{A}} + 1 ))"
/// ```
///
/// All sections are optional at the serde level; semantic checks live in
/// `config::validate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNotebook {
    /// DAG selected when the CLI is not given `--dag`.
    #[serde(default)]
    pub current_dag: Option<DagId>,

    /// Display order of DAGs. Defaults to declaration order.
    #[serde(default)]
    pub dag_order: Vec<DagId>,

    /// All DAGs from `[dags.<id>]`, in declaration order.
    #[serde(default)]
    pub dags: IndexMap<DagId, RawDag>,
}

/// `[dags.<id>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDag {
    #[serde(default)]
    pub title: Option<String>,

    /// Cells from `[dags.<id>.cells.<name>]`, in declaration order.
    #[serde(default)]
    pub cells: IndexMap<CellId, ShellCell>,
}

/// `[dags.<id>.cells.<name>]` section: one shell-command cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShellCell {
    /// Command run with `sh -c`. `{{name}}` is replaced by the trimmed
    /// stdout of cell `name` and makes this cell depend on it.
    pub cmd: String,

    /// Explicit dependencies in addition to the template references.
    #[serde(default)]
    pub after: Vec<CellId>,

    #[serde(default)]
    pub title: Option<String>,
}

impl ShellCell {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            after: Vec::new(),
            title: None,
        }
    }

    pub fn after(mut self, dep: impl Into<CellId>) -> Self {
        self.after.push(dep.into());
        self
    }
}

/// Per-DAG metadata carried through the scheduler untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotebookMeta {
    #[serde(default)]
    pub title: Option<String>,
}
