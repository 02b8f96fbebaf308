// src/notebook/refs.rs

//! `{{name}}` template references between cells.

use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::{Captures, Regex};

use crate::config::model::ShellCell;
use crate::dag::{DependencyFinder, FindDependenciesArgs};
use crate::errors::CellDagError;
use crate::notebook::state::NotebookState;
use crate::types::CellId;

static TEMPLATE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_-]*)\s*\}\}").expect("template pattern compiles")
});

/// Names referenced as `{{name}}` in a command, in order of appearance.
pub fn template_refs(cmd: &str) -> impl Iterator<Item = &str> {
    TEMPLATE_REF
        .captures_iter(cmd)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Dependencies of one shell cell: its `after` list, then every template
/// reference naming another known cell.
pub fn cell_dependencies(
    cell_id: &str,
    cell: &ShellCell,
    cells: &IndexMap<CellId, ShellCell>,
) -> Vec<CellId> {
    let explicit = cell.after.iter().map(String::as_str);
    let referenced = template_refs(&cell.cmd).filter(|name| cells.contains_key(*name));

    explicit
        .chain(referenced)
        .filter(|name| *name != cell_id)
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Substitute `{{name}}` references with the output of known cells.
///
/// `lookup` returns `None` for names that are not cells; those references
/// are left untouched. Known cells without output render as "".
pub fn render_command<'a, F>(cmd: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<Option<&'a str>>,
{
    TEMPLATE_REF
        .replace_all(cmd, |caps: &Captures<'_>| match lookup(&caps[1]) {
            Some(output) => output.unwrap_or("").to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Dependency finder for shell notebooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotebookFinder;

impl DependencyFinder<NotebookState, ShellCell> for NotebookFinder {
    type Error = CellDagError;

    fn find_dependencies(
        &self,
        args: FindDependenciesArgs<'_, NotebookState, ShellCell>,
    ) -> Result<Vec<CellId>, CellDagError> {
        Ok(cell_dependencies(args.cell_id, args.cell, args.cells))
    }
}
