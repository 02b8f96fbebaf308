// tests/notebook_config.rs

use std::io::Write;

use tempfile::NamedTempFile;

use celldag::config::{NotebookConfig, load_and_validate, parse_str};
use celldag::errors::CellDagError;
use celldag::notebook::Notebook;

fn validate(toml: &str) -> Result<NotebookConfig, CellDagError> {
    NotebookConfig::try_from(parse_str(toml)?)
}

fn expect_config_error(toml: &str, needle: &str) {
    match validate(toml) {
        Err(CellDagError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} lacks {needle:?}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn loads_notebook_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
current_dag = "report"

[dags.main]
title = "Numbers"

[dags.main.cells.A]
cmd = "echo 1"

[dags.main.cells.B]
cmd = "echo $(( {{{{A}}}} + 1 ))"
title = "Increment"

[dags.report.cells.summary]
cmd = "echo done"
"#
    )
    .unwrap();

    let config = load_and_validate(file.path()).unwrap();

    assert_eq!(config.current_dag_id.as_deref(), Some("report"));
    assert_eq!(config.dag_order, vec!["main", "report"]);

    let main = config.dag("main").unwrap();
    assert_eq!(main.id, "main");
    assert_eq!(main.meta.title.as_deref(), Some("Numbers"));
    let cells: Vec<&String> = main.cells.keys().collect();
    assert_eq!(cells, vec!["A", "B"]);
    assert_eq!(main.cells["B"].cmd, "echo $(( {{A}} + 1 ))");
    assert_eq!(main.cells["B"].title.as_deref(), Some("Increment"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = load_and_validate(dir.path().join("missing.toml"));

    assert!(matches!(result, Err(CellDagError::IoError(_))));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    assert!(matches!(
        parse_str("[dags.main\ncmd = "),
        Err(CellDagError::TomlError(_))
    ));
}

#[test]
fn defaults_current_dag_and_appends_unlisted_dags() {
    let config = validate(
        r#"
dag_order = ["second"]

[dags.first.cells.a]
cmd = "true"

[dags.second.cells.b]
cmd = "true"

[dags.third.cells.c]
cmd = "true"
"#,
    )
    .unwrap();

    assert_eq!(config.dag_order, vec!["second", "first", "third"]);
    assert_eq!(config.current_dag_id.as_deref(), Some("second"));
    let ids: Vec<&str> = config.dags_in_order().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["second", "first", "third"]);
}

#[test]
fn notebook_without_dags_is_rejected() {
    expect_config_error("", "at least one");
}

#[test]
fn unknown_or_repeated_dag_order_entries_are_rejected() {
    expect_config_error(
        r#"
dag_order = ["nope"]
[dags.main.cells.a]
cmd = "true"
"#,
        "unknown DAG 'nope'",
    );
    expect_config_error(
        r#"
dag_order = ["main", "main"]
[dags.main.cells.a]
cmd = "true"
"#,
        "more than once",
    );
}

#[test]
fn unknown_current_dag_is_rejected() {
    expect_config_error(
        r#"
current_dag = "other"
[dags.main.cells.a]
cmd = "true"
"#,
        "current_dag",
    );
}

#[test]
fn unknown_or_self_after_is_rejected() {
    expect_config_error(
        r#"
[dags.main.cells.A]
cmd = "echo A"
after = ["NonExistent"]
"#,
        "unknown dependency 'NonExistent'",
    );
    expect_config_error(
        r#"
[dags.main.cells.A]
cmd = "echo A"
after = ["A"]
"#,
        "itself",
    );
}

#[test]
fn template_cycle_returns_structured_error() {
    let result = validate(
        r#"
[dags.main.cells.A]
cmd = "echo {{B}}"

[dags.main.cells.B]
cmd = "echo {{A}}"
"#,
    );

    match result {
        Err(CellDagError::DagCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains("'main'"));
            assert!(msg.contains("A") || msg.contains("B"));
        }
        Err(e) => panic!("Expected DagCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn mixed_after_and_template_cycle_is_detected() {
    let result = validate(
        r#"
[dags.main.cells.A]
cmd = "echo {{C}}"

[dags.main.cells.B]
cmd = "true"
after = ["A"]

[dags.main.cells.C]
cmd = "echo {{B}}"
"#,
    );

    assert!(matches!(result, Err(CellDagError::DagCycle(_))));
}

#[test]
fn self_reference_and_unknown_names_are_not_dependencies() {
    let config = validate(
        r#"
[dags.main.cells.A]
cmd = "echo {{A}} {{HOME}}"
"#,
    )
    .unwrap();

    assert!(config.dag("main").unwrap().cells.contains_key("A"));
}

#[test]
fn notebook_resolves_current_dag_when_none_is_requested() {
    let config = validate(
        r#"
current_dag = "report"

[dags.main.cells.a]
cmd = "true"

[dags.report.cells.b]
cmd = "true"
"#,
    )
    .unwrap();
    let nb = Notebook::new(config);

    assert_eq!(nb.resolve_dag(None).unwrap(), "report");
    assert_eq!(nb.resolve_dag(Some("main")).unwrap(), "main");
}
