//! Core types for declaring structural document schemas.
//!
//! This module defines the data model for schema declarations: the two
//! structure trees (mandatory skeleton and optional tree) built from
//! [`SchemaNode`]s, the dot-path default table, the authorized type set,
//! and the [`Declaration`] bundle that composition consumes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::index::IndexDescriptor;

/// A document instance: a JSON object with insertion-ordered keys.
pub type Document = serde_json::Map<String, Value>;

/// The dynamic type of a document value.
///
/// Kinds name the runtime shapes a schema position may hold. The base
/// kinds mirror JSON plus timestamps; the store-level extensions
/// (`Binary`, `ObjectId`, `Uuid`, `Regex`) are not authorized by default
/// and must be enabled per declaration.
///
/// # Examples
///
/// ```
/// use document_schema_core::ValueKind;
///
/// assert_eq!(ValueKind::parse("string"), Some(ValueKind::String));
/// assert!(ValueKind::Number.accepts(ValueKind::Int));
/// assert!(!ValueKind::Int.accepts(ValueKind::Float));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// The null value.
    Null,
    /// Booleans.
    Bool,
    /// Integers.
    Int,
    /// Floating-point numbers.
    Float,
    /// Umbrella kind covering [`Int`](ValueKind::Int) and
    /// [`Float`](ValueKind::Float).
    Number,
    /// UTF-8 strings.
    String,
    /// Timestamps.
    DateTime,
    /// Ordered sequences.
    List,
    /// String-keyed maps.
    Map,
    /// Raw byte blobs.
    Binary,
    /// Store object identifiers.
    ObjectId,
    /// UUIDs.
    Uuid,
    /// Regular expression values.
    Regex,
}

impl ValueKind {
    /// Canonical lowercase name, as written in declaration files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Number => "number",
            Self::String => "string",
            Self::DateTime => "datetime",
            Self::List => "list",
            Self::Map => "map",
            Self::Binary => "binary",
            Self::ObjectId => "objectid",
            Self::Uuid => "uuid",
            Self::Regex => "regex",
        }
    }

    /// Parses a canonical kind name. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "null" => Some(Self::Null),
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "datetime" => Some(Self::DateTime),
            "list" => Some(Self::List),
            "map" => Some(Self::Map),
            "binary" => Some(Self::Binary),
            "objectid" => Some(Self::ObjectId),
            "uuid" => Some(Self::Uuid),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }

    /// The kind of a concrete JSON value.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Self::Int
                } else {
                    Self::Float
                }
            }
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Map,
        }
    }

    /// Whether a value of kind `other` satisfies this kind.
    ///
    /// Kinds match exactly, except [`Number`](ValueKind::Number) which
    /// also accepts `Int` and `Float`.
    pub fn accepts(self, other: Self) -> bool {
        self == other || (self == Self::Number && matches!(other, Self::Int | Self::Float))
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of kinds a schema may use in type position.
///
/// Every schema starts from the base set (`null`, `bool`, `int`, `float`,
/// `number`, `string`, `datetime`, `list`, `map`) and may only grow it.
/// Membership is checked through [`ValueKind::accepts`], so a set holding
/// [`ValueKind::Number`] authorizes `int` and `float` as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedKinds(BTreeSet<ValueKind>);

impl AuthorizedKinds {
    /// The base authorized set shared by every schema.
    pub fn base() -> Self {
        Self(BTreeSet::from([
            ValueKind::Null,
            ValueKind::Bool,
            ValueKind::Int,
            ValueKind::Float,
            ValueKind::Number,
            ValueKind::String,
            ValueKind::DateTime,
            ValueKind::List,
            ValueKind::Map,
        ]))
    }

    /// Adds a single kind to the set.
    pub fn insert(&mut self, kind: ValueKind) {
        self.0.insert(kind);
    }

    /// Adds every kind from `kinds`.
    pub fn extend<I: IntoIterator<Item = ValueKind>>(&mut self, kinds: I) {
        self.0.extend(kinds);
    }

    /// Whether `kind` is authorized, exactly or through an umbrella kind.
    pub fn contains_kind(&self, kind: ValueKind) -> bool {
        self.0.iter().any(|member| member.accepts(kind))
    }

    /// Whether the runtime kind of `value` is authorized.
    pub fn contains_value(&self, value: &Value) -> bool {
        self.contains_kind(ValueKind::of_value(value))
    }

    /// Iterates the member kinds in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = ValueKind> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for AuthorizedKinds {
    fn default() -> Self {
        Self::base()
    }
}

/// A key in a map schema: either a concrete field name or a wildcard
/// matching every key of a given kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapKey {
    /// A literal field name.
    Field(String),
    /// A wildcard key, written `$kind` in declaration files (e.g.
    /// `$string` for a free-form string-keyed map).
    Wildcard(ValueKind),
}

impl MapKey {
    /// The dot-path segment for this key (`name` or `$kind`).
    pub fn segment(&self) -> String {
        match self {
            Self::Field(name) => name.clone(),
            Self::Wildcard(kind) => format!("${kind}"),
        }
    }

    /// Whether this is a wildcard key.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard(_))
    }
}

/// An ordered map of keys to schema nodes.
///
/// Entry order is declaration order and is preserved through composition
/// and flattening, so namespaces come out in the order fields were
/// declared.
///
/// # Examples
///
/// ```
/// use document_schema_core::{MapSchema, SchemaNode, ValueKind};
///
/// let skeleton = MapSchema::new()
///     .with_field("title", ValueKind::String)
///     .with_field("tags", SchemaNode::list_of(ValueKind::String))
///     .with_field("meta", MapSchema::new().with_wildcard(ValueKind::String, ValueKind::Int));
///
/// assert_eq!(skeleton.len(), 3);
/// assert!(skeleton.get_field("title").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapSchema {
    entries: Vec<(MapKey, SchemaNode)>,
}

impl MapSchema {
    /// Creates an empty map schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a concrete field entry.
    pub fn with_field(mut self, name: &str, node: impl Into<SchemaNode>) -> Self {
        self.insert(MapKey::Field(name.to_string()), node.into());
        self
    }

    /// Adds or replaces a wildcard entry.
    pub fn with_wildcard(mut self, kind: ValueKind, node: impl Into<SchemaNode>) -> Self {
        self.insert(MapKey::Wildcard(kind), node.into());
        self
    }

    /// Inserts an entry, replacing an existing one with the same key in
    /// place and appending otherwise.
    pub fn insert(&mut self, key: MapKey, node: SchemaNode) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((key, node)),
        }
    }

    /// Looks up an entry by key.
    pub fn get(&self, key: &MapKey) -> Option<&SchemaNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    /// Looks up a concrete field entry by name.
    pub fn get_field(&self, name: &str) -> Option<&SchemaNode> {
        self.entries.iter().find_map(|(k, n)| match k {
            MapKey::Field(f) if f == name => Some(n),
            _ => None,
        })
    }

    /// Whether an entry with this key exists.
    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Resolves the node at a dotted path of concrete field segments.
    ///
    /// Returns `None` when a segment is missing or the path runs through
    /// a non-map node; wildcard keys are never matched.
    pub fn at_path(&self, path: &str) -> Option<&SchemaNode> {
        let mut segments = path.split('.');
        let mut node = self.get_field(segments.next()?)?;
        for segment in segments {
            match node {
                SchemaNode::Map(inner) => node = inner.get_field(segment)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// The entries in declaration order.
    pub fn entries(&self) -> &[(MapKey, SchemaNode)] {
        &self.entries
    }

    /// Iterates `(key, node)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &SchemaNode)> {
        self.entries.iter().map(|(k, n)| (k, n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry uses a wildcard key.
    pub fn has_wildcard_key(&self) -> bool {
        self.entries.iter().any(|(k, _)| k.is_wildcard())
    }

    /// Whether this map is non-empty and concrete-keyed only.
    ///
    /// Structural maps are recursed into by flattening and default
    /// injection; wildcard-keyed and empty maps are opaque leaves.
    pub fn is_structural(&self) -> bool {
        !self.is_empty() && !self.has_wildcard_key()
    }

    /// Parses a map schema from its declaration-file form. `owner` names
    /// the schema being parsed and only appears in error messages.
    ///
    /// Keys starting with `$` are wildcard keys and must name a known
    /// kind; every other key is a concrete field. The value itself must
    /// be a JSON object.
    pub fn from_value(owner: &str, value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(SchemaError::RootNotMap {
                owner: owner.to_string(),
            });
        };
        let mut entries = Vec::with_capacity(map.len());
        for (key, raw) in map {
            let parsed = match key.strip_prefix('$') {
                Some(kind_name) => match ValueKind::parse(kind_name) {
                    Some(kind) => MapKey::Wildcard(kind),
                    None => {
                        return Err(SchemaError::UnknownKind {
                            owner: owner.to_string(),
                            name: key.clone(),
                        });
                    }
                },
                None => MapKey::Field(key.clone()),
            };
            entries.push((parsed, SchemaNode::from_value(owner, raw)?));
        }
        Ok(Self { entries })
    }

    /// Serializes back to declaration-file form.
    pub fn to_value(&self) -> Value {
        let mut map = Document::new();
        for (key, node) in &self.entries {
            map.insert(key.segment(), node.to_value());
        }
        Value::Object(map)
    }
}

impl From<MapSchema> for SchemaNode {
    fn from(map: MapSchema) -> Self {
        Self::Map(map)
    }
}

impl From<ValueKind> for SchemaNode {
    fn from(kind: ValueKind) -> Self {
        Self::Scalar(kind)
    }
}

/// A single position in a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Accepts any value. Written `null` in declaration files.
    Any,
    /// A value of the given kind.
    Scalar(ValueKind),
    /// A nested map with its own key schema.
    Map(MapSchema),
    /// A list, optionally constrained to an element schema. Written `[]`
    /// or `[element]` in declaration files.
    List(Option<Box<SchemaNode>>),
    /// A fixed-arity sequence, one schema per slot. Written as an array
    /// of two or more elements.
    Tuple(Vec<SchemaNode>),
    /// A concrete value standing for its own kind, e.g. `true` or `42`.
    Literal(Value),
    /// An embedded schema, referenced by registry name and treated as an
    /// opaque leaf by validation and generation.
    Reference(String),
}

impl SchemaNode {
    /// An unconstrained list.
    pub fn list() -> Self {
        Self::List(None)
    }

    /// A list constrained to one element schema.
    pub fn list_of(element: impl Into<SchemaNode>) -> Self {
        Self::List(Some(Box::new(element.into())))
    }

    /// A fixed-arity tuple.
    pub fn tuple<I: IntoIterator<Item = SchemaNode>>(slots: I) -> Self {
        Self::Tuple(slots.into_iter().collect())
    }

    /// A literal value node.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// A reference to another registered schema.
    pub fn reference(name: &str) -> Self {
        Self::Reference(name.to_string())
    }

    /// Parses a node from its declaration-file form.
    ///
    /// | JSON value               | Node                      |
    /// |--------------------------|---------------------------|
    /// | `null`                   | [`SchemaNode::Any`]       |
    /// | kind name string         | [`SchemaNode::Scalar`]    |
    /// | `{"$ref": "name"}`       | [`SchemaNode::Reference`] |
    /// | object                   | [`SchemaNode::Map`]       |
    /// | `[]` / `[elem]`          | [`SchemaNode::List`]      |
    /// | array of two or more     | [`SchemaNode::Tuple`]     |
    /// | bool / number            | [`SchemaNode::Literal`]   |
    pub fn from_value(owner: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Any),
            Value::String(name) => match ValueKind::parse(name) {
                Some(kind) => Ok(Self::Scalar(kind)),
                None => Err(SchemaError::UnknownKind {
                    owner: owner.to_string(),
                    name: name.clone(),
                }),
            },
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(Value::String(target)) = map.get("$ref") {
                        return Ok(Self::Reference(target.clone()));
                    }
                }
                MapSchema::from_value(owner, value).map(Self::Map)
            }
            Value::Array(items) => match items.as_slice() {
                [] => Ok(Self::List(None)),
                [element] => Ok(Self::list_of(Self::from_value(owner, element)?)),
                slots => slots
                    .iter()
                    .map(|slot| Self::from_value(owner, slot))
                    .collect::<Result<Vec<_>>>()
                    .map(Self::Tuple),
            },
            other => Ok(Self::Literal(other.clone())),
        }
    }

    /// Serializes back to declaration-file form.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Any => Value::Null,
            Self::Scalar(kind) => Value::String(kind.name().to_string()),
            Self::Map(map) => map.to_value(),
            Self::List(None) => Value::Array(Vec::new()),
            Self::List(Some(element)) => Value::Array(vec![element.to_value()]),
            Self::Tuple(slots) => Value::Array(slots.iter().map(Self::to_value).collect()),
            Self::Literal(value) => value.clone(),
            Self::Reference(name) => {
                let mut map = Document::new();
                map.insert("$ref".to_string(), Value::String(name.clone()));
                Value::Object(map)
            }
        }
    }
}

/// A default for one dot-path: a fixed value, a producer called at every
/// injection, or a per-element list of defaults.
///
/// # Examples
///
/// ```
/// use document_schema_core::DefaultValue;
/// use serde_json::json;
///
/// let fixed = DefaultValue::literal(json!({"lang": "en"}));
/// let fresh = DefaultValue::producer(|| json!(42));
///
/// assert_eq!(fixed.produce(), json!({"lang": "en"}));
/// assert_eq!(fresh.produce(), json!(42));
/// ```
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed value, deep-cloned into every document.
    Literal(Value),
    /// A function producing a fresh value per injection.
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
    /// Element-wise defaults for a list path.
    Items(Vec<DefaultValue>),
}

impl DefaultValue {
    /// A fixed default.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// A default computed at injection time.
    pub fn producer(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Producer(Arc::new(f))
    }

    /// Element-wise defaults for a list path.
    pub fn items<I: IntoIterator<Item = DefaultValue>>(items: I) -> Self {
        Self::Items(items.into_iter().collect())
    }

    /// Produces the value to inject. Literals are cloned, producers are
    /// called, item lists produce an array element by element.
    pub fn produce(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Producer(f) => f(),
            Self::Items(items) => Value::Array(items.iter().map(Self::produce).collect()),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
            Self::Items(items) => f.debug_tuple("Items").field(items).finish(),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

/// One schema declaration, before composition with its ancestors.
///
/// # Examples
///
/// ```
/// use document_schema_core::{Declaration, DefaultValue, MapSchema, ValueKind};
///
/// let decl = Declaration::new()
///     .with_skeleton(MapSchema::new().with_field("title", ValueKind::String))
///     .with_optional(MapSchema::new().with_field("rank", ValueKind::Int))
///     .with_default("rank", DefaultValue::literal(0));
///
/// assert_eq!(decl.skeleton.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Declaration {
    /// The mandatory structure tree.
    pub skeleton: MapSchema,
    /// The optional structure tree.
    pub optional: MapSchema,
    /// Defaults keyed by dot-path into skeleton or optional.
    pub default_values: BTreeMap<String, DefaultValue>,
    /// Kinds added to the base authorized set.
    pub extra_kinds: Vec<ValueKind>,
    /// Index descriptors, validated lazily at registration time.
    pub indexes: Vec<IndexDescriptor>,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the skeleton tree.
    pub fn with_skeleton(mut self, skeleton: MapSchema) -> Self {
        self.skeleton = skeleton;
        self
    }

    /// Sets the optional tree.
    pub fn with_optional(mut self, optional: MapSchema) -> Self {
        self.optional = optional;
        self
    }

    /// Registers a default for a dot-path.
    pub fn with_default(mut self, path: &str, default: DefaultValue) -> Self {
        self.default_values.insert(path.to_string(), default);
        self
    }

    /// Authorizes an extra kind beyond the base set.
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.extra_kinds.push(kind);
        self
    }

    /// Adds an index descriptor.
    pub fn with_index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }
}
