//! Dot-path views of schema trees.
//!
//! Turns a structure tree into its two flat views: the ordered namespace
//! list (every addressable path, parents before children) and the
//! collapsed map (leaf nodes keyed by concrete dot-path). Composition
//! builds both for the merged skeleton and optional trees.

use std::collections::BTreeMap;

use crate::types::{MapKey, MapSchema, SchemaNode};

/// Lists every dot-path of a tree, in declaration order, parents before
/// children. Wildcard keys contribute `$kind` segments.
///
/// Only non-empty nested maps are descended into; bare `map`-kind leaves
/// and empty maps contribute their own path and nothing below it.
///
/// # Examples
///
/// ```
/// use document_schema_core::{namespaces, MapSchema, ValueKind};
///
/// let tree = MapSchema::new().with_field(
///     "author",
///     MapSchema::new().with_field("name", ValueKind::String),
/// );
/// assert_eq!(namespaces(&tree), vec!["author", "author.name"]);
/// ```
pub fn namespaces(tree: &MapSchema) -> Vec<String> {
    let mut out = Vec::new();
    collect_paths(tree, "", &mut out);
    out
}

fn collect_paths(tree: &MapSchema, prefix: &str, out: &mut Vec<String>) {
    for (key, node) in tree.iter() {
        let path = join(prefix, &key.segment());
        out.push(path.clone());
        if let SchemaNode::Map(inner) = node {
            if !inner.is_empty() {
                collect_paths(inner, &path, out);
            }
        }
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

/// Collapses a tree to a map from concrete dot-path to leaf node.
///
/// Structural maps are recursed into. Wildcard-keyed and empty maps
/// collapse to an empty map marker at their own path, and paths crossing
/// a wildcard key are omitted entirely, so every key in the result is a
/// plain dotted field path.
pub fn collapse(tree: &MapSchema) -> BTreeMap<String, SchemaNode> {
    let mut out = BTreeMap::new();
    collapse_into(tree, "", &mut out);
    out
}

fn collapse_into(tree: &MapSchema, prefix: &str, out: &mut BTreeMap<String, SchemaNode>) {
    for (key, node) in tree.iter() {
        let name = match key {
            MapKey::Field(name) => name,
            MapKey::Wildcard(_) => continue,
        };
        let path = join(prefix, name);
        match node {
            SchemaNode::Map(inner) if inner.is_structural() => collapse_into(inner, &path, out),
            SchemaNode::Map(_) => {
                out.insert(path, SchemaNode::Map(MapSchema::new()));
            }
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}
