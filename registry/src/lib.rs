//! Named schema registration and file-backed declarations.
//!
//! This crate wraps the core composition engine with the bookkeeping a
//! real schema set needs: a [`SchemaRegistry`] that composes
//! declarations against registered parents and serves them by name, and
//! a loader that reads JSON or YAML declaration files and resolves
//! their dependency order.
//!
//! # Quick start
//!
//! ```no_run
//! use document_schema_registry::{SchemaRegistry, from_dir, load_dir, register_all};
//!
//! // Load a whole directory, parents resolved automatically
//! let registry = from_dir("schemas/").unwrap();
//! if let Some(schema) = registry.get("BlogPost") {
//!     println!("{} paths", schema.namespaces().len());
//! }
//!
//! // Or keep the steps separate to reuse one registry across batches
//! let mut registry = SchemaRegistry::new();
//! let batch = load_dir("schemas/extra/").unwrap();
//! register_all(&mut registry, batch).unwrap();
//! ```
//!
//! Programmatic registration goes through
//! [`SchemaRegistry::register`]; see the crate-level example in
//! `document_schema_core` for declaration building.

mod error;
mod loader;
mod registry;

pub use error::{RegistryError, Result};
pub use loader::{DeclarationFile, from_dir, load_dir, load_file, register_all};
pub use registry::SchemaRegistry;
