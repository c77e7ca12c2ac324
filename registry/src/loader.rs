//! File-backed schema declarations.
//!
//! A declaration file holds one schema in JSON or YAML: a `name`, an
//! optional `parents` list, the `skeleton` and `optional` trees in their
//! file form, plus `default_values`, `extra_kinds` and `indexes`.
//!
//! ```yaml
//! name: BlogPost
//! parents: [Article]
//! skeleton:
//!   title: string
//!   author:
//!     name: string
//!   tags: [string]
//! optional:
//!   rank: int
//! default_values:
//!   rank: 0
//! indexes:
//!   - fields: title
//!     unique: true
//! ```
//!
//! Files load individually ([`load_file`]) or per directory
//! ([`load_dir`]), and [`register_all`] resolves parent order for a
//! whole batch regardless of the order files were discovered in.
//!
//! # Loading patterns
//!
//! ```no_run
//! use document_schema_registry::from_dir;
//!
//! // One call: load a directory, resolve parents, compose everything
//! let registry = from_dir("schemas/").unwrap();
//! let post = registry.get("BlogPost").unwrap();
//! println!("{:?}", post.namespaces());
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use document_schema_core::{
    Declaration, DefaultValue, IndexDescriptor, MapSchema, ValueKind,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::registry::SchemaRegistry;

/// One schema declaration as read from a file.
///
/// Trees stay in [`Value`] form until [`declaration`](Self::declaration)
/// converts them, so a batch can be loaded completely before any name
/// resolution happens.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclarationFile {
    /// Registration name, also the target of sub-schema references.
    pub name: String,
    /// Parent schema names, nearest first.
    #[serde(default)]
    pub parents: Vec<String>,
    /// The mandatory tree in file form; `null` or absent means empty.
    #[serde(default)]
    pub skeleton: Value,
    /// The optional tree in file form.
    #[serde(default)]
    pub optional: Value,
    /// Literal defaults keyed by dot-path.
    #[serde(default)]
    pub default_values: BTreeMap<String, Value>,
    /// Kinds added to the base authorized set.
    #[serde(default)]
    pub extra_kinds: Vec<ValueKind>,
    /// Index descriptors in file form.
    #[serde(default)]
    pub indexes: Vec<Value>,
}

impl DeclarationFile {
    /// Converts the file form into a [`Declaration`].
    ///
    /// # Errors
    ///
    /// Fails when a tree is not an object, a kind name is unknown, or an
    /// index descriptor is misshapen.
    pub fn declaration(&self) -> document_schema_core::Result<Declaration> {
        let mut declaration = Declaration::new()
            .with_skeleton(tree_from_value(&self.name, &self.skeleton)?)
            .with_optional(tree_from_value(&self.name, &self.optional)?);
        for (path, value) in &self.default_values {
            declaration = declaration.with_default(path, DefaultValue::literal(value.clone()));
        }
        for kind in &self.extra_kinds {
            declaration = declaration.with_kind(*kind);
        }
        for index in &self.indexes {
            declaration = declaration.with_index(IndexDescriptor::from_value(index)?);
        }
        Ok(declaration)
    }
}

fn tree_from_value(owner: &str, value: &Value) -> document_schema_core::Result<MapSchema> {
    if value.is_null() {
        return Ok(MapSchema::new());
    }
    MapSchema::from_value(owner, value)
}

/// Loads a single declaration file, dispatching on its extension
/// (`.json`, `.yaml` or `.yml`).
///
/// # Errors
///
/// Returns [`RegistryError::UnsupportedExtension`] for any other
/// extension, [`RegistryError::Io`] if the file cannot be read, or a
/// parse error from the matching format.
pub fn load_file(path: impl AsRef<Path>) -> Result<DeclarationFile> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let declaration: DeclarationFile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_reader(reader)?,
        Some("yaml") | Some("yml") => serde_yaml::from_reader(reader)?,
        _ => {
            return Err(RegistryError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }
    };

    if declaration.name.is_empty() {
        return Err(RegistryError::InvalidDeclaration {
            path: path.to_path_buf(),
            reason: "empty schema name".to_string(),
        });
    }
    debug!(schema = %declaration.name, path = %path.display(), "loaded declaration");
    Ok(declaration)
}

/// Loads every `*.json`, `*.yaml` and `*.yml` file in a directory.
///
/// Files are read in name order for determinism; other extensions are
/// skipped. Name order is not dependency order — pass the result to
/// [`register_all`], which sorts that out.
pub fn load_dir(path: impl AsRef<Path>) -> Result<Vec<DeclarationFile>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(path.as_ref())?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("json") | Some("yaml") | Some("yml")
            )
        })
        .collect();
    paths.sort();

    let mut declarations = Vec::with_capacity(paths.len());
    for path in paths {
        declarations.push(load_file(path)?);
    }
    Ok(declarations)
}

/// Registers a batch of declarations, resolving parent order.
///
/// Passes over the batch repeatedly, registering every declaration whose
/// parents are all present, until the batch is drained or a pass makes
/// no progress.
///
/// # Errors
///
/// Returns [`RegistryError::UnresolvedParents`] naming the leftover
/// declarations when a parent is missing from both the batch and the
/// registry, or when the parent chain is cyclic. Composition errors
/// propagate from [`SchemaRegistry::register`].
pub fn register_all(
    registry: &mut SchemaRegistry,
    declarations: Vec<DeclarationFile>,
) -> Result<()> {
    let mut pending = declarations;
    while !pending.is_empty() {
        debug!(remaining = pending.len(), "resolving declaration batch");
        let mut deferred = Vec::with_capacity(pending.len());
        let mut progressed = false;

        for file in pending {
            if file.parents.iter().all(|parent| registry.contains(parent)) {
                let declaration = file.declaration()?;
                let parents: Vec<&str> = file.parents.iter().map(String::as_str).collect();
                registry.register(&file.name, declaration, &parents)?;
                progressed = true;
            } else {
                deferred.push(file);
            }
        }

        if !progressed {
            let mut names: Vec<String> = deferred.into_iter().map(|d| d.name).collect();
            names.sort();
            return Err(RegistryError::UnresolvedParents { names });
        }
        pending = deferred;
    }
    Ok(())
}

/// Loads a directory of declarations into a fresh registry with default
/// composition options.
pub fn from_dir(path: impl AsRef<Path>) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    let declarations = load_dir(path)?;
    register_all(&mut registry, declarations)?;
    Ok(registry)
}
