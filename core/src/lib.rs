//! Core types, composition and validation for structural document schemas.
//!
//! This crate models the structure of nested, dynamically typed documents:
//!
//! - [`Declaration`] — one schema as written: a mandatory skeleton tree, an
//!   optional tree, default values, extra authorized kinds, and index
//!   descriptors.
//! - [`MapSchema`] / [`SchemaNode`] — the tree itself: named fields and
//!   `$kind` wildcard keys mapping to scalar kinds, nested maps, lists,
//!   tuples, literals or named references.
//! - [`ValueKind`] / [`AuthorizedKinds`] — the kind vocabulary and the set a
//!   schema is allowed to use.
//! - [`EffectiveSchema`] — a declaration composed with its ancestors, ready
//!   to flatten, materialize and index.
//! - [`IndexDescriptor`] — a secondary index over one or more dot-paths.
//!
//! Composition ([`compose`]) merges a declaration with already composed
//! ancestors, validates the merged trees against the authorized kinds
//! ([`validate_tree`]) and resolves every default path.
//!
//! Flattening ([`namespaces`], [`collapse`]) turns the trees into dot-path
//! views; [`EffectiveSchema::materialize`] builds a fresh document from
//! structural placeholders plus defaults.
//!
//! # Example
//!
//! ```
//! use document_schema_core::*;
//! use serde_json::json;
//!
//! // Declare a blog post: mandatory structure, an optional field with a
//! // default, and an index over the title
//! let declaration = Declaration::new()
//!     .with_skeleton(
//!         MapSchema::new()
//!             .with_field("title", ValueKind::String)
//!             .with_field(
//!                 "author",
//!                 MapSchema::new().with_field("name", ValueKind::String),
//!             ),
//!     )
//!     .with_optional(MapSchema::new().with_field("rank", ValueKind::Int))
//!     .with_default("rank", DefaultValue::literal(0))
//!     .with_index(IndexDescriptor::single("title"));
//!
//! let schema = compose("BlogPost", declaration, &[], &ComposeOptions::default()).unwrap();
//!
//! assert_eq!(schema.namespaces(), ["title", "author", "author.name", "rank"]);
//! schema.validate_indexes().unwrap();
//!
//! let doc = schema.materialize();
//! assert_eq!(doc["title"], json!(null));
//! assert_eq!(doc["rank"], json!(0));
//! ```

mod compose;
mod defaults;
mod error;
mod flatten;
mod generate;
mod index;
mod types;
mod validate;

pub use compose::{ComposeOptions, EffectiveSchema, compose};
pub use error::{Result, SchemaError};
pub use flatten::{collapse, namespaces};
pub use index::{IndexDescriptor, IndexDirection, IndexFields, validate_index};
pub use types::*;
pub use validate::validate_tree;
