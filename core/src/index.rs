//! Index descriptors and their validation.
//!
//! Declarations carry index descriptors that composition merges child
//! first without checking them; [`validate_index`] runs the path check
//! at registration time against the composed namespace list. Shape and
//! direction are enforced when a descriptor is parsed from its file
//! form via [`IndexDescriptor::from_value`].

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::types::Document;

/// Sort direction (or mode) of one indexed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirection {
    /// Ascending order, token `1`.
    Ascending,
    /// Descending order, token `-1`.
    Descending,
    /// Indexing disabled for this path, token `0`.
    Off,
    /// Index every element, token `2`.
    All,
    /// Two-dimensional geospatial index, token `"2d"`.
    Geo2d,
}

impl IndexDirection {
    /// The wire token for this direction.
    pub fn token(self) -> Value {
        match self {
            Self::Ascending => Value::from(1),
            Self::Descending => Value::from(-1),
            Self::Off => Value::from(0),
            Self::All => Value::from(2),
            Self::Geo2d => Value::from("2d"),
        }
    }

    /// The label used in generated index names.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ascending => "1",
            Self::Descending => "-1",
            Self::Off => "0",
            Self::All => "2",
            Self::Geo2d => "2d",
        }
    }

    /// Parses a direction token. Only the integers `1`, `-1`, `0`, `2`
    /// and the string `"2d"` are accepted; notably the string `"2"` is
    /// not a direction.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value.as_i64() {
            Some(1) => return Ok(Self::Ascending),
            Some(-1) => return Ok(Self::Descending),
            Some(0) => return Ok(Self::Off),
            Some(2) => return Ok(Self::All),
            _ => {}
        }
        if value.as_str() == Some("2d") {
            return Ok(Self::Geo2d);
        }
        Err(SchemaError::IndexDirection {
            found: value.clone(),
        })
    }
}

/// The indexed paths of one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexFields {
    /// A single path, indexed ascending.
    Single(String),
    /// An ordered list of `(path, direction)` pairs.
    Compound(Vec<(String, IndexDirection)>),
}

impl IndexFields {
    /// Iterates the indexed paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        let pairs: Vec<&str> = match self {
            Self::Single(path) => vec![path.as_str()],
            Self::Compound(pairs) => pairs.iter().map(|(path, _)| path.as_str()).collect(),
        };
        pairs.into_iter()
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(path) => Ok(Self::Single(path.clone())),
            Value::Array(items) => items
                .iter()
                .map(pair_from_value)
                .collect::<Result<Vec<_>>>()
                .map(Self::Compound),
            other => Err(SchemaError::IndexFieldsShape {
                found: shape_name(other).to_string(),
            }),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Single(path) => Value::String(path.clone()),
            Self::Compound(pairs) => Value::Array(
                pairs
                    .iter()
                    .map(|(path, direction)| {
                        Value::Array(vec![Value::String(path.clone()), direction.token()])
                    })
                    .collect(),
            ),
        }
    }
}

fn pair_from_value(item: &Value) -> Result<(String, IndexDirection)> {
    let Value::Array(pair) = item else {
        return Err(SchemaError::IndexFieldsShape {
            found: shape_name(item).to_string(),
        });
    };
    match pair.as_slice() {
        [Value::String(path), direction] => {
            Ok((path.clone(), IndexDirection::from_value(direction)?))
        }
        [_, _] => Err(SchemaError::IndexFieldsShape {
            found: "a pair with a non-string path".to_string(),
        }),
        _ => Err(SchemaError::IndexFieldsShape {
            found: format!("a {}-element entry", pair.len()),
        }),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// One declared index.
///
/// # Examples
///
/// ```
/// use document_schema_core::{IndexDescriptor, IndexDirection};
///
/// let by_title = IndexDescriptor::single("title").unique();
/// assert_eq!(by_title.name(), "title_1");
///
/// let compound = IndexDescriptor::compound(&[
///     ("rank", IndexDirection::Descending),
///     ("author.name", IndexDirection::Ascending),
/// ]);
/// assert_eq!(compound.name(), "rank_-1_author.name_1");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescriptor {
    /// The indexed paths.
    pub fields: IndexFields,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Expiry in seconds, for time-to-live indexes.
    pub ttl: Option<u64>,
    /// Whether paths are checked against the schema at registration.
    pub check: bool,
}

impl IndexDescriptor {
    /// An ascending index over a single path.
    pub fn single(path: &str) -> Self {
        Self {
            fields: IndexFields::Single(path.to_string()),
            unique: false,
            ttl: None,
            check: true,
        }
    }

    /// A compound index over `(path, direction)` pairs.
    pub fn compound(pairs: &[(&str, IndexDirection)]) -> Self {
        Self {
            fields: IndexFields::Compound(
                pairs
                    .iter()
                    .map(|(path, direction)| (path.to_string(), *direction))
                    .collect(),
            ),
            unique: false,
            ttl: None,
            check: true,
        }
    }

    /// Marks the index as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets a time-to-live in seconds.
    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl = Some(seconds);
        self
    }

    /// Disables the path existence check for this descriptor.
    pub fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }

    /// Iterates the indexed paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.paths()
    }

    /// The store-level name of this index: each path followed by its
    /// direction label, joined with `_`.
    pub fn name(&self) -> String {
        match &self.fields {
            IndexFields::Single(path) => format!("{path}_1"),
            IndexFields::Compound(pairs) => pairs
                .iter()
                .map(|(path, direction)| format!("{path}_{}", direction.label()))
                .collect::<Vec<_>>()
                .join("_"),
        }
    }

    /// Parses a descriptor from its file form, checking shape and
    /// directions. The descriptor must be a map carrying a `fields` key;
    /// `unique`, `ttl` and `check` are optional.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(SchemaError::IndexShape {
                found: shape_name(value).to_string(),
            });
        };
        let fields = match map.get("fields") {
            Some(raw) => IndexFields::from_value(raw)?,
            None => return Err(SchemaError::IndexFieldsMissing),
        };
        Ok(Self {
            fields,
            unique: map.get("unique").and_then(Value::as_bool).unwrap_or(false),
            ttl: map.get("ttl").and_then(Value::as_u64),
            check: map.get("check").and_then(Value::as_bool).unwrap_or(true),
        })
    }

    /// Serializes back to file form.
    pub fn to_value(&self) -> Value {
        let mut map = Document::new();
        map.insert("fields".to_string(), self.fields.to_value());
        if self.unique {
            map.insert("unique".to_string(), Value::Bool(true));
        }
        if let Some(seconds) = self.ttl {
            map.insert("ttl".to_string(), Value::from(seconds));
        }
        if !self.check {
            map.insert("check".to_string(), Value::Bool(false));
        }
        Value::Object(map)
    }
}

/// Validates one descriptor against a composed namespace list.
///
/// Every indexed path must be a namespace of the schema or one of the
/// identity fields, which are always legal. Descriptors with `check`
/// disabled skip this entirely.
pub fn validate_index(
    index: &IndexDescriptor,
    namespaces: &[String],
    identity_fields: &BTreeSet<String>,
) -> Result<()> {
    if !index.check {
        return Ok(());
    }
    for path in index.paths() {
        let known =
            identity_fields.contains(path) || namespaces.iter().any(|namespace| namespace == path);
        if !known {
            return Err(SchemaError::UnknownIndexPath {
                path: path.to_string(),
            });
        }
    }
    Ok(())
}
