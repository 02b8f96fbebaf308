// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::loader::default_notebook_path;

/// Command-line arguments for `celldag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "celldag",
    version,
    about = "Run notebook cells in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the notebook file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_notebook_path())]
    pub notebook: PathBuf,

    /// DAG to operate on. Defaults to the notebook's `current_dag`.
    #[arg(long, value_name = "ID")]
    pub dag: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CELLDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate the notebook and print its DAGs, cells and dependencies.
    Check,
    /// Print cells with no dependencies.
    Roots,
    /// Print the full execution order.
    Order,
    /// Print the cells that re-run when CELL changes, in order.
    Downstream {
        #[arg(value_name = "CELL")]
        cell: String,
    },
    /// Run every cell in dependency order.
    RunAll,
    /// Run CELL, then everything downstream of it.
    Run {
        #[arg(value_name = "CELL")]
        cell: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
