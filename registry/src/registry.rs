//! Named schema registration with parent resolution.
//!
//! [`SchemaRegistry`] holds composed schemas by name. A declaration
//! registers against already registered parents and is composed on the
//! spot, so every lookup returns a ready
//! [`EffectiveSchema`](document_schema_core::EffectiveSchema). Parent
//! lists are ordered the way composition expects: nearest first.
//!
//! # Example
//!
//! ```
//! use document_schema_core::{Declaration, MapSchema, ValueKind};
//! use document_schema_registry::SchemaRegistry;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         "Article",
//!         Declaration::new()
//!             .with_skeleton(MapSchema::new().with_field("title", ValueKind::String)),
//!         &[],
//!     )
//!     .unwrap();
//! registry
//!     .register(
//!         "BlogPost",
//!         Declaration::new()
//!             .with_skeleton(MapSchema::new().with_field("body", ValueKind::String)),
//!         &["Article"],
//!     )
//!     .unwrap();
//!
//! let post = registry.get("BlogPost").unwrap();
//! assert_eq!(post.namespaces(), ["body", "title"]);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use document_schema_core::{
    ComposeOptions, Declaration, EffectiveSchema, MapSchema, SchemaNode, compose,
};
use tracing::{debug, info};

use crate::error::{RegistryError, Result};

/// In-memory collection of composed schemas with lookup by name.
///
/// Registration order is the dependency order: a parent must be
/// registered before any declaration naming it. Cycles therefore cannot
/// form. Composed schemas are shared via [`Arc`], so a child keeps the
/// parent version it was composed against even if that name is later
/// re-registered.
#[derive(Debug)]
pub struct SchemaRegistry {
    options: ComposeOptions,
    schemas: HashMap<String, Arc<EffectiveSchema>>,
}

impl SchemaRegistry {
    /// Registry with the default [`ComposeOptions`].
    pub fn new() -> Self {
        Self::with_options(ComposeOptions::default())
    }

    /// Registry with explicit composition options, shared by every
    /// schema registered here.
    pub fn with_options(options: ComposeOptions) -> Self {
        Self {
            options,
            schemas: HashMap::new(),
        }
    }

    /// Composes `declaration` with the named parents and stores the
    /// result under `name`.
    ///
    /// Parents are resolved against this registry and must already be
    /// registered. Named sub-schema references inside the trees must
    /// also be registered (the schema may reference itself). Registering
    /// an existing name replaces the stored schema; children composed
    /// against the old version are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownParent`] for an unregistered
    /// parent, [`RegistryError::UnknownReference`] for an unresolvable
    /// sub-schema reference, or [`RegistryError::Schema`] when
    /// composition itself fails.
    pub fn register(
        &mut self,
        name: &str,
        declaration: Declaration,
        parents: &[&str],
    ) -> Result<Arc<EffectiveSchema>> {
        debug!(schema = name, ?parents, "composing declaration");

        let mut ancestors = Vec::with_capacity(parents.len());
        for parent in parents {
            let ancestor =
                self.schemas
                    .get(*parent)
                    .ok_or_else(|| RegistryError::UnknownParent {
                        schema: name.to_string(),
                        parent: (*parent).to_string(),
                    })?;
            ancestors.push(Arc::clone(ancestor));
        }
        let borrowed: Vec<&EffectiveSchema> = ancestors.iter().map(Arc::as_ref).collect();

        let schema = compose(name, declaration, &borrowed, &self.options)?;
        self.check_tree(name, schema.skeleton())?;
        self.check_tree(name, schema.optional())?;

        let schema = Arc::new(schema);
        self.schemas.insert(name.to_string(), Arc::clone(&schema));
        info!(
            schema = name,
            namespaces = schema.namespaces().len(),
            indexes = schema.indexes().len(),
            "registered schema"
        );
        Ok(schema)
    }

    /// Looks up a composed schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<EffectiveSchema>> {
        self.schemas.get(name).cloned()
    }

    /// Returns `true` if a schema is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns an iterator over registered schema names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }

    /// The composition options every registration uses.
    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    fn check_tree(&self, owner: &str, tree: &MapSchema) -> Result<()> {
        tree.iter()
            .try_for_each(|(_, node)| self.check_node(owner, node))
    }

    fn check_node(&self, owner: &str, node: &SchemaNode) -> Result<()> {
        match node {
            SchemaNode::Reference(target) => {
                // a schema may embed itself (recursive documents)
                if target == owner || self.schemas.contains_key(target) {
                    Ok(())
                } else {
                    Err(RegistryError::UnknownReference {
                        schema: owner.to_string(),
                        reference: target.clone(),
                    })
                }
            }
            SchemaNode::Map(map) => self.check_tree(owner, map),
            SchemaNode::List(Some(element)) => self.check_node(owner, element),
            SchemaNode::Tuple(slots) => slots
                .iter()
                .try_for_each(|slot| self.check_node(owner, slot)),
            _ => Ok(()),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_schema_core::ValueKind;

    fn titled(field: &str) -> Declaration {
        Declaration::new().with_skeleton(MapSchema::new().with_field(field, ValueKind::String))
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SchemaRegistry::new();
        registry.register("Article", titled("title"), &[]).unwrap();

        assert!(registry.contains("Article"));
        assert_eq!(registry.len(), 1);
        let schema = registry.get("Article").unwrap();
        assert_eq!(schema.namespaces(), ["title"]);
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_unknown_parent_fails() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register("BlogPost", titled("body"), &["Article"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "BlogPost: unknown parent schema 'Article'"
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_parents_compose_nearest_first() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                "First",
                Declaration::new()
                    .with_skeleton(MapSchema::new().with_field("shared", ValueKind::Int)),
                &[],
            )
            .unwrap();
        registry
            .register(
                "Second",
                Declaration::new()
                    .with_skeleton(MapSchema::new().with_field("shared", ValueKind::String)),
                &[],
            )
            .unwrap();
        let child = registry
            .register("Child", Declaration::new(), &["First", "Second"])
            .unwrap();

        assert_eq!(
            child.skeleton().get_field("shared"),
            Some(&SchemaNode::Scalar(ValueKind::Int))
        );
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = SchemaRegistry::new();
        registry.register("Doc", titled("old"), &[]).unwrap();
        registry.register("Doc", titled("new"), &[]).unwrap();

        assert_eq!(registry.len(), 1);
        let schema = registry.get("Doc").unwrap();
        assert_eq!(schema.namespaces(), ["new"]);
    }

    #[test]
    fn test_child_keeps_parent_version_it_composed_against() {
        let mut registry = SchemaRegistry::new();
        registry.register("Parent", titled("v1"), &[]).unwrap();
        registry
            .register("Child", titled("own"), &["Parent"])
            .unwrap();
        registry.register("Parent", titled("v2"), &[]).unwrap();

        let child = registry.get("Child").unwrap();
        assert_eq!(child.namespaces(), ["own", "v1"]);
    }

    #[test]
    fn test_unknown_reference_fails() {
        let mut registry = SchemaRegistry::new();
        let decl = Declaration::new()
            .with_skeleton(MapSchema::new().with_field("author", SchemaNode::reference("Person")));
        let err = registry.register("BlogPost", decl, &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "BlogPost: unknown schema reference 'Person'"
        );
    }

    #[test]
    fn test_registered_and_self_references_resolve() {
        let mut registry = SchemaRegistry::new();
        registry.register("Person", titled("name"), &[]).unwrap();

        let decl = Declaration::new().with_skeleton(
            MapSchema::new()
                .with_field("author", SchemaNode::reference("Person"))
                .with_field("replies", SchemaNode::list_of(SchemaNode::reference("Comment"))),
        );
        assert!(registry.register("Comment", decl, &[]).is_ok());
    }

    #[test]
    fn test_composition_error_surfaces() {
        let mut registry = SchemaRegistry::new();
        let decl = Declaration::new()
            .with_skeleton(MapSchema::new().with_field("id", ValueKind::ObjectId));
        let err = registry.register("Doc", decl, &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Doc: objectid is not an authorized type"
        );
    }

    #[test]
    fn test_names_iterator() {
        let mut registry = SchemaRegistry::new();
        registry.register("A", titled("a"), &[]).unwrap();
        registry.register("B", titled("b"), &[]).unwrap();

        let mut names: Vec<&str> = registry.names().collect();
        names.sort();
        assert_eq!(names, ["A", "B"]);
    }
}
