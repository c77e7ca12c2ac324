//! Structural validation of schema trees.
//!
//! Validates a declaration's skeleton and optional trees against the
//! authorized type set, catching malformed keys, unauthorized kinds in
//! key or value position, and unauthorized shapes before a schema is
//! composed.
//!
//! # Examples
//!
//! ```
//! use document_schema_core::*;
//!
//! let kinds = AuthorizedKinds::base();
//!
//! let good = MapSchema::new().with_field("title", ValueKind::String);
//! assert!(validate_tree("BlogPost", &good, &kinds).is_ok());
//!
//! // objectid is not in the base authorized set
//! let bad = MapSchema::new().with_field("author", ValueKind::ObjectId);
//! assert!(validate_tree("BlogPost", &bad, &kinds).is_err());
//! ```

use crate::error::{Result, SchemaError};
use crate::types::{AuthorizedKinds, MapKey, MapSchema, SchemaNode};

/// Validates one structure tree.
///
/// Walks every key and node depth-first in declaration order and fails
/// on the first violation:
///
/// - concrete keys must not contain `.` or start with `$`
/// - wildcard keys must use an authorized kind
/// - every kind in value position must be authorized
/// - literal values and schema references are accepted as leaves
pub fn validate_tree(owner: &str, tree: &MapSchema, kinds: &AuthorizedKinds) -> Result<()> {
    for (key, node) in tree.iter() {
        match key {
            MapKey::Field(name) => {
                if name.contains('.') {
                    return Err(SchemaError::DottedKey {
                        owner: owner.to_string(),
                        key: name.clone(),
                    });
                }
                if name.starts_with('$') {
                    return Err(SchemaError::ReservedKey {
                        owner: owner.to_string(),
                        key: name.clone(),
                    });
                }
            }
            MapKey::Wildcard(kind) => {
                if !kinds.contains_kind(*kind) {
                    return Err(SchemaError::UnauthorizedKeyType {
                        owner: owner.to_string(),
                        kind: *kind,
                    });
                }
            }
        }
        validate_node(owner, node, kinds)?;
    }
    Ok(())
}

fn validate_node(owner: &str, node: &SchemaNode, kinds: &AuthorizedKinds) -> Result<()> {
    match node {
        SchemaNode::Any | SchemaNode::Reference(_) => Ok(()),
        SchemaNode::Scalar(kind) => {
            if kinds.contains_kind(*kind) {
                Ok(())
            } else {
                Err(SchemaError::UnauthorizedType {
                    owner: owner.to_string(),
                    kind: *kind,
                })
            }
        }
        SchemaNode::Map(map) => validate_tree(owner, map, kinds),
        SchemaNode::List(None) => Ok(()),
        SchemaNode::List(Some(element)) => validate_node(owner, element, kinds),
        SchemaNode::Tuple(slots) => {
            for slot in slots {
                validate_node(owner, slot, kinds)?;
            }
            Ok(())
        }
        // A literal stands for its own runtime kind; JSON values only take
        // base kinds, which every authorized set contains.
        SchemaNode::Literal(_) => Ok(()),
    }
}
