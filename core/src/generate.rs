//! Skeleton generation: filling documents with structural placeholders.
//!
//! Generation gives a document the shape its schema promises without
//! inventing content: nested maps become empty objects, lists become
//! empty arrays, tuples become null-filled arrays of their arity, and
//! every other position becomes null. Defaults are injected afterwards
//! by the composition layer.

use serde_json::Value;

use crate::types::{Document, MapKey, MapSchema, SchemaNode, ValueKind};

/// Fills `doc` with placeholders for every concrete entry of `tree`.
///
/// Existing values are never replaced, and nested maps are recursed into
/// so a partially populated document gains only its missing structure.
/// Wildcard entries are skipped entirely: their keys are unknown until
/// runtime. Running generation twice is a no-op.
pub(crate) fn generate_tree(doc: &mut Document, tree: &MapSchema) {
    for (key, node) in tree.iter() {
        let MapKey::Field(name) = key else {
            continue;
        };
        if !doc.contains_key(name) {
            doc.insert(name.clone(), placeholder(node));
        }
        if let SchemaNode::Map(inner) = node {
            if let Some(Value::Object(child)) = doc.get_mut(name) {
                generate_tree(child, inner);
            }
        }
    }
}

fn placeholder(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Map(_) | SchemaNode::Scalar(ValueKind::Map) => Value::Object(Document::new()),
        SchemaNode::List(_) | SchemaNode::Scalar(ValueKind::List) => Value::Array(Vec::new()),
        SchemaNode::Literal(Value::Array(_)) => Value::Array(Vec::new()),
        SchemaNode::Literal(Value::Object(_)) => Value::Object(Document::new()),
        SchemaNode::Tuple(slots) => Value::Array(vec![Value::Null; slots.len()]),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueKind;
    use serde_json::json;

    fn generated(tree: &MapSchema) -> Value {
        let mut doc = Document::new();
        generate_tree(&mut doc, tree);
        Value::Object(doc)
    }

    #[test]
    fn test_nested_maps_fill_deep() {
        let tree = MapSchema::new().with_field(
            "a",
            MapSchema::new()
                .with_field("b", MapSchema::new().with_field("c", ValueKind::Int))
                .with_field("d", ValueKind::String),
        );
        assert_eq!(
            generated(&tree),
            json!({"a": {"b": {"c": null}, "d": null}})
        );
    }

    #[test]
    fn test_placeholders_per_shape() {
        let tree = MapSchema::new()
            .with_field("scalar", ValueKind::Int)
            .with_field("bare_map", ValueKind::Map)
            .with_field("bare_list", ValueKind::List)
            .with_field("typed_list", SchemaNode::list_of(ValueKind::String))
            .with_field("open_list", SchemaNode::list())
            .with_field(
                "pair",
                SchemaNode::tuple([
                    SchemaNode::Scalar(ValueKind::Float),
                    SchemaNode::Scalar(ValueKind::Float),
                ]),
            )
            .with_field("flag", SchemaNode::literal(true))
            .with_field("samples", SchemaNode::Literal(json!([1, 2])))
            .with_field("anything", SchemaNode::Any)
            .with_field("profile", SchemaNode::reference("user"));

        assert_eq!(
            generated(&tree),
            json!({
                "scalar": null,
                "bare_map": {},
                "bare_list": [],
                "typed_list": [],
                "open_list": [],
                "pair": [null, null],
                "flag": null,
                "samples": [],
                "anything": null,
                "profile": null,
            })
        );
    }

    #[test]
    fn test_wildcard_entries_are_skipped() {
        let tree = MapSchema::new().with_field(
            "spam",
            MapSchema::new().with_wildcard(
                ValueKind::String,
                MapSchema::new().with_field("bla", ValueKind::Int),
            ),
        );
        assert_eq!(generated(&tree), json!({"spam": {}}));
    }

    #[test]
    fn test_existing_values_are_preserved() {
        let tree = MapSchema::new()
            .with_field("title", ValueKind::String)
            .with_field(
                "author",
                MapSchema::new()
                    .with_field("name", ValueKind::String)
                    .with_field("age", ValueKind::Int),
            );

        let mut doc = Document::new();
        doc.insert("title".into(), json!("kept"));
        doc.insert("author".into(), json!({"name": "alice"}));
        generate_tree(&mut doc, &tree);

        // existing values kept, missing nested structure filled in
        assert_eq!(
            Value::Object(doc),
            json!({"title": "kept", "author": {"name": "alice", "age": null}})
        );
    }

    #[test]
    fn test_generation_is_idempotent() {
        let tree = MapSchema::new()
            .with_field("a", MapSchema::new().with_field("b", ValueKind::Int))
            .with_field("tags", SchemaNode::list_of(ValueKind::String));

        let mut doc = Document::new();
        generate_tree(&mut doc, &tree);
        let once = doc.clone();
        generate_tree(&mut doc, &tree);
        assert_eq!(doc, once);
    }

    #[test]
    fn test_non_map_value_blocks_recursion() {
        let tree =
            MapSchema::new().with_field("a", MapSchema::new().with_field("b", ValueKind::Int));
        let mut doc = Document::new();
        doc.insert("a".into(), json!(5));
        generate_tree(&mut doc, &tree);
        assert_eq!(Value::Object(doc), json!({"a": 5}));
    }
}
