//! Error types for registry operations.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! declaration file parsing, composition, and parent resolution.

use std::path::PathBuf;

use document_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading and registering schemas.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A declaration failed tree conversion, validation or composition.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A declaration file is structurally unusable (e.g. missing `name`).
    #[error("invalid declaration in {}: {reason}", .path.display())]
    InvalidDeclaration { path: PathBuf, reason: String },

    /// A declaration file with an extension other than json/yaml/yml.
    #[error("unsupported declaration file extension: {}", .path.display())]
    UnsupportedExtension { path: PathBuf },

    /// A declaration names a parent that is not registered.
    #[error("{schema}: unknown parent schema '{parent}'")]
    UnknownParent { schema: String, parent: String },

    /// A tree embeds a named sub-schema that is not registered.
    #[error("{schema}: unknown schema reference '{reference}'")]
    UnknownReference { schema: String, reference: String },

    /// Declarations left over after dependency resolution, either because
    /// a parent is missing from the set or the parent chain is cyclic.
    #[error("cannot resolve parents for: {}", .names.join(", "))]
    UnresolvedParents { names: Vec<String> },
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
