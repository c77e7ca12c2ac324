//! Default-value injection into generated documents.
//!
//! Defaults are applied path by path, skeleton tree before optional, and
//! never overwrite real content: a scalar default fills a null or
//! missing slot, a list default fills an empty list, and a map default
//! either replaces an empty map wholesale (wildcard-keyed and untyped
//! maps) or is distributed field by field into a structural map.
//! Producers run once per injection, so two documents never share a
//! produced value.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::{DefaultValue, Document, MapSchema, SchemaNode};

/// Applies every registered default to `doc`.
///
/// Paths are resolved against the skeleton first and the optional tree
/// second; composition has already checked that each path exists and
/// crosses no wildcard key.
pub(crate) fn apply_defaults(
    doc: &mut Document,
    defaults: &BTreeMap<String, DefaultValue>,
    skeleton: &MapSchema,
    optional: &MapSchema,
) {
    for (path, default) in defaults {
        let node = skeleton.at_path(path).or_else(|| optional.at_path(path));
        let Some(node) = node else {
            continue;
        };
        apply_path(doc, path, node, default, defaults);
    }
}

fn apply_path(
    doc: &mut Document,
    path: &str,
    node: &SchemaNode,
    default: &DefaultValue,
    defaults: &BTreeMap<String, DefaultValue>,
) {
    match path.rsplit_once('.') {
        Some((prefix, last)) => {
            let Some(parent) = descend(doc, prefix) else {
                return;
            };
            apply_slot(parent, last, node, default, path, defaults);
        }
        None => apply_slot(doc, path, node, default, path, defaults),
    }
}

/// Walks `doc` down a dotted prefix, creating missing intermediate maps.
/// Returns `None` when an existing non-map value blocks the path.
fn descend<'a>(doc: &'a mut Document, prefix: &str) -> Option<&'a mut Document> {
    let mut current = doc;
    for segment in prefix.split('.') {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Document::new()));
        if slot.is_null() {
            *slot = Value::Object(Document::new());
        }
        match slot {
            Value::Object(map) => current = map,
            _ => return None,
        }
    }
    Some(current)
}

fn apply_slot(
    map: &mut Document,
    key: &str,
    node: &SchemaNode,
    default: &DefaultValue,
    path: &str,
    defaults: &BTreeMap<String, DefaultValue>,
) {
    match node {
        SchemaNode::Map(inner) if inner.is_structural() => {
            let Value::Object(produced) = default.produce() else {
                return;
            };
            if matches!(map.get(key), None | Some(Value::Null)) {
                map.insert(key.to_string(), Value::Object(Document::new()));
            }
            let Some(Value::Object(child)) = map.get_mut(key) else {
                return;
            };
            for (field, value) in produced {
                let child_path = format!("{path}.{field}");
                // a default registered for the deeper path wins
                if defaults.contains_key(&child_path) {
                    continue;
                }
                let Some(child_node) = inner.get_field(&field) else {
                    continue;
                };
                apply_slot(
                    child,
                    &field,
                    child_node,
                    &DefaultValue::Literal(value),
                    &child_path,
                    defaults,
                );
            }
        }
        SchemaNode::Map(_) => {
            // wildcard-keyed and untyped maps take the default wholesale
            let vacant = match map.get(key) {
                None | Some(Value::Null) => true,
                Some(Value::Object(existing)) => existing.is_empty(),
                _ => false,
            };
            if vacant {
                map.insert(key.to_string(), default.produce());
            }
        }
        SchemaNode::List(_) => {
            if !map.contains_key(key) {
                map.insert(key.to_string(), Value::Array(Vec::new()));
            }
            let Some(Value::Array(items)) = map.get_mut(key) else {
                return;
            };
            if items.is_empty() {
                if let Value::Array(produced) = default.produce() {
                    items.extend(produced);
                }
            }
        }
        _ => {
            if matches!(map.get(key), None | Some(Value::Null)) {
                map.insert(key.to_string(), default.produce());
            }
        }
    }
}
