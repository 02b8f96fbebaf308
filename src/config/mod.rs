// src/config/mod.rs

//! Notebook file loading and validation.
//!
//! - [`model`] holds the serde types mirroring the TOML layout.
//! - [`loader`] reads files and strings.
//! - [`validate`] turns a [`RawNotebook`] into a checked [`NotebookConfig`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_notebook_path, load_and_validate, load_from_path, parse_str};
pub use model::{NotebookConfig, NotebookMeta, RawDag, RawNotebook, ShellCell};
