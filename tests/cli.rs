// tests/cli.rs

use clap::Parser;

use celldag::cli::{CliArgs, Command};
use celldag::config::default_notebook_path;

#[test]
fn notebook_path_defaults_to_loader_default() {
    let args = CliArgs::try_parse_from(["celldag", "roots"]).unwrap();

    assert_eq!(args.notebook, default_notebook_path());
    assert!(args.dag.is_none());
    assert!(matches!(args.command, Command::Roots));
}

#[test]
fn explicit_notebook_dag_and_cell_are_parsed() {
    let args = CliArgs::try_parse_from([
        "celldag",
        "--notebook",
        "demos/Notebook.toml",
        "--dag",
        "report",
        "run",
        "header",
    ])
    .unwrap();

    assert_eq!(args.notebook.to_str(), Some("demos/Notebook.toml"));
    assert_eq!(args.dag.as_deref(), Some("report"));
    assert!(matches!(args.command, Command::Run { ref cell } if cell == "header"));
}
