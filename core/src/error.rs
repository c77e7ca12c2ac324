//! Error types for schema composition and validation.
//!
//! Errors fall into four groups: structure errors (a node uses a shape or
//! kind the schema does not authorize), key errors (a malformed map key),
//! descriptor errors (a default registered for an unknown or wildcard
//! path), and index errors (a malformed or dangling index descriptor).

use serde_json::Value;
use thiserror::Error;

use crate::types::ValueKind;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while composing or validating a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A structure tree was declared as something other than a map.
    #[error("{owner}: structure must be a map of fields")]
    RootNotMap {
        /// Name of the schema being composed.
        owner: String,
    },

    /// A value position names a kind outside the authorized set.
    #[error("{owner}: {kind} is not an authorized type")]
    UnauthorizedType {
        /// Name of the schema being composed.
        owner: String,
        /// The offending kind.
        kind: ValueKind,
    },

    /// A field name contains a dot, which is reserved for path syntax.
    #[error("{owner}: {key} must not contain '.'")]
    DottedKey {
        /// Name of the schema being composed.
        owner: String,
        /// The offending field name.
        key: String,
    },

    /// A field name starts with `$`, which is reserved for wildcard keys.
    #[error("{owner}: {key} must not start with '$'")]
    ReservedKey {
        /// Name of the schema being composed.
        owner: String,
        /// The offending field name.
        key: String,
    },

    /// A wildcard key uses a kind outside the authorized set.
    #[error("{owner}: ${kind} is not an authorized key type")]
    UnauthorizedKeyType {
        /// Name of the schema being composed.
        owner: String,
        /// The offending key kind.
        kind: ValueKind,
    },

    /// A declaration file names a kind this crate does not know.
    #[error("{owner}: unknown type name '{name}'")]
    UnknownKind {
        /// Name of the schema being parsed.
        owner: String,
        /// The unrecognized name, as written.
        name: String,
    },

    /// A default was registered for a path outside the schema.
    #[error("Error in default_values: can't find {path} in skeleton")]
    UnknownDefaultPath {
        /// The dangling dot-path.
        path: String,
    },

    /// A default was registered for a path crossing a wildcard key.
    #[error("Error in default_values: {path} targets a wildcard key")]
    WildcardDefaultPath {
        /// The offending dot-path.
        path: String,
    },

    /// An index descriptor is not a map.
    #[error("index descriptor must be a map (got {found})")]
    IndexShape {
        /// Shape of the value found instead.
        found: String,
    },

    /// An index descriptor has no `fields` key.
    #[error("index descriptor is missing the `fields` key")]
    IndexFieldsMissing,

    /// The `fields` entry of an index descriptor is malformed.
    #[error("index fields must be a path or a list of (path, direction) pairs (got {found})")]
    IndexFieldsShape {
        /// Shape of the value found instead.
        found: String,
    },

    /// An index direction is not one of the five accepted tokens.
    #[error("index direction must be 1, -1, 0, 2 or \"2d\" (got {found})")]
    IndexDirection {
        /// The rejected direction value.
        found: Value,
    },

    /// An index references a path outside the schema.
    #[error("Error in indexes: can't find {path} in skeleton or optional")]
    UnknownIndexPath {
        /// The dangling dot-path.
        path: String,
    },
}
