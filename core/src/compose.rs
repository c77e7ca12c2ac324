//! Schema composition: merging a declaration with its ancestors.
//!
//! [`compose`] turns one [`Declaration`] plus an ordered list of already
//! composed ancestors into an [`EffectiveSchema`]: trees merged by
//! top-level key (the child wins, then earlier ancestors over later
//! ones), defaults and authorized kinds folded in, namespaces flattened,
//! and every default path checked. Index descriptors are merged child
//! first but deliberately not checked here; that happens at registration
//! time via [`EffectiveSchema::validate_indexes`].
//!
//! # Example
//!
//! ```
//! use document_schema_core::*;
//!
//! let options = ComposeOptions::default();
//!
//! let article = Declaration::new()
//!     .with_skeleton(MapSchema::new().with_field("title", ValueKind::String));
//! let article = compose("Article", article, &[], &options).unwrap();
//!
//! let post = Declaration::new()
//!     .with_skeleton(MapSchema::new().with_field("body", ValueKind::String));
//! let post = compose("BlogPost", post, &[&article], &options).unwrap();
//!
//! assert_eq!(post.namespaces(), ["body", "title"]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::defaults::apply_defaults;
use crate::error::{Result, SchemaError};
use crate::flatten::{collapse, namespaces};
use crate::generate::generate_tree;
use crate::index::{IndexDescriptor, validate_index};
use crate::types::{
    AuthorizedKinds, Declaration, DefaultValue, Document, MapSchema, SchemaNode,
};
use crate::validate::validate_tree;

/// Knobs shared by every schema composed for the same store.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Store-managed fields that index descriptors may always reference,
    /// even though no schema declares them.
    pub identity_fields: BTreeSet<String>,
}

impl ComposeOptions {
    /// Options with no identity fields.
    pub fn bare() -> Self {
        Self {
            identity_fields: BTreeSet::new(),
        }
    }

    /// Adds an identity field.
    pub fn with_identity_field(mut self, name: &str) -> Self {
        self.identity_fields.insert(name.to_string());
        self
    }
}

impl Default for ComposeOptions {
    /// The conventional store fields `_id`, `_ns`, `_revision` and
    /// `_version`.
    fn default() -> Self {
        Self {
            identity_fields: ["_id", "_ns", "_revision", "_version"]
                .map(String::from)
                .into(),
        }
    }
}

/// A fully composed schema.
///
/// Produced by [`compose`], this is the unit the registry stores and
/// documents are materialized from: merged trees, the merged default
/// table, the authorized kind set, the merged index descriptors, and the
/// flattened dot-path views.
#[derive(Debug, Clone)]
pub struct EffectiveSchema {
    name: String,
    skeleton: MapSchema,
    optional: MapSchema,
    default_values: BTreeMap<String, DefaultValue>,
    authorized: AuthorizedKinds,
    indexes: Vec<IndexDescriptor>,
    namespaces: Vec<String>,
    collapsed: BTreeMap<String, SchemaNode>,
    identity_fields: BTreeSet<String>,
}

impl EffectiveSchema {
    /// The schema name, as passed to [`compose`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The merged mandatory tree.
    pub fn skeleton(&self) -> &MapSchema {
        &self.skeleton
    }

    /// The merged optional tree.
    pub fn optional(&self) -> &MapSchema {
        &self.optional
    }

    /// The merged default table.
    pub fn default_values(&self) -> &BTreeMap<String, DefaultValue> {
        &self.default_values
    }

    /// The authorized kind set, ancestors included.
    pub fn authorized_kinds(&self) -> &AuthorizedKinds {
        &self.authorized
    }

    /// The merged index descriptors, child first.
    pub fn indexes(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    /// Every addressable dot-path: skeleton paths in declaration order,
    /// then optional paths.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Leaf nodes keyed by concrete dot-path, skeleton and optional
    /// combined (optional wins on a duplicate path).
    pub fn collapsed(&self) -> &BTreeMap<String, SchemaNode> {
        &self.collapsed
    }

    /// The identity fields carried over from [`ComposeOptions`].
    pub fn identity_fields(&self) -> &BTreeSet<String> {
        &self.identity_fields
    }

    /// Resolves the node at a concrete dot-path, skeleton first.
    pub fn node_at(&self, path: &str) -> Option<&SchemaNode> {
        self.skeleton
            .at_path(path)
            .or_else(|| self.optional.at_path(path))
    }

    /// Fills `doc` with structural placeholders, skeleton tree first,
    /// then the optional tree. Existing values are kept.
    pub fn generate_into(&self, doc: &mut Document) {
        generate_tree(doc, &self.skeleton);
        generate_tree(doc, &self.optional);
    }

    /// Injects registered defaults into `doc` without overwriting real
    /// content. Safe to run repeatedly.
    pub fn apply_defaults(&self, doc: &mut Document) {
        apply_defaults(doc, &self.default_values, &self.skeleton, &self.optional);
    }

    /// Builds a fresh document: structural placeholders plus defaults.
    pub fn materialize(&self) -> Document {
        let mut doc = Document::new();
        self.generate_into(&mut doc);
        self.apply_defaults(&mut doc);
        doc
    }

    /// Validates every merged index descriptor against the namespace
    /// list, failing on the first dangling path.
    pub fn validate_indexes(&self) -> Result<()> {
        for index in &self.indexes {
            validate_index(index, &self.namespaces, &self.identity_fields)?;
        }
        Ok(())
    }
}

/// Composes a declaration with its already composed ancestors.
///
/// `ancestors` is ordered nearest first, the way a schema lists its
/// parents. Merging is shallow, per top-level key of each tree: the
/// declaration's own entry wins outright, then the first ancestor
/// declaring the key, and so on. Defaults follow the same precedence;
/// authorized kinds are unioned; index descriptors are concatenated
/// child first without deduplication.
///
/// Fails when a merged tree violates the authorized set, or when a
/// default path is missing from the namespaces or crosses a wildcard
/// key. Index descriptors are not checked here.
pub fn compose(
    name: &str,
    own: Declaration,
    ancestors: &[&EffectiveSchema],
    options: &ComposeOptions,
) -> Result<EffectiveSchema> {
    let Declaration {
        skeleton,
        optional,
        default_values,
        extra_kinds,
        indexes,
    } = own;

    let skeleton = merge_trees(skeleton, ancestors.iter().map(|a| &a.skeleton));
    let optional = merge_trees(optional, ancestors.iter().map(|a| &a.optional));

    let mut defaults = default_values;
    for ancestor in ancestors {
        for (path, default) in &ancestor.default_values {
            defaults
                .entry(path.clone())
                .or_insert_with(|| default.clone());
        }
    }

    let mut authorized = AuthorizedKinds::base();
    authorized.extend(extra_kinds);
    for ancestor in ancestors {
        authorized.extend(ancestor.authorized.iter());
    }

    let mut merged_indexes = indexes;
    for ancestor in ancestors {
        merged_indexes.extend(ancestor.indexes.iter().cloned());
    }

    validate_tree(name, &skeleton, &authorized)?;
    validate_tree(name, &optional, &authorized)?;

    let mut paths = namespaces(&skeleton);
    paths.extend(namespaces(&optional));

    let mut collapsed_paths = collapse(&skeleton);
    collapsed_paths.extend(collapse(&optional));

    for path in defaults.keys() {
        if path.split('.').any(|segment| segment.starts_with('$')) {
            return Err(SchemaError::WildcardDefaultPath { path: path.clone() });
        }
        if !paths.iter().any(|namespace| namespace == path) {
            return Err(SchemaError::UnknownDefaultPath { path: path.clone() });
        }
    }

    Ok(EffectiveSchema {
        name: name.to_string(),
        skeleton,
        optional,
        default_values: defaults,
        authorized,
        indexes: merged_indexes,
        namespaces: paths,
        collapsed: collapsed_paths,
        identity_fields: options.identity_fields.clone(),
    })
}

fn merge_trees<'a, I>(own: MapSchema, ancestors: I) -> MapSchema
where
    I: Iterator<Item = &'a MapSchema>,
{
    let mut merged = own;
    for ancestor in ancestors {
        for (key, node) in ancestor.iter() {
            if !merged.contains_key(key) {
                merged.insert(key.clone(), node.clone());
            }
        }
    }
    merged
}
