use std::fs;
use std::path::PathBuf;
use std::process::Output;

use serde_json::{Value, json};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("docschema_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Runs the docschema binary with the given arguments.
fn docschema(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_docschema"))
        .args(args)
        .output()
        .expect("failed to run docschema")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A parent declaration with a title field and a default.
fn write_article_json(dir: &TempDir) -> PathBuf {
    let json = json!({
        "name": "Article",
        "skeleton": {"title": "string"},
        "default_values": {"title": "untitled"},
        "indexes": [{"fields": "title", "unique": true}]
    });
    let path = dir.join("article.json");
    fs::write(&path, serde_json::to_string_pretty(&json).unwrap())
        .expect("failed to write declaration");
    path
}

/// A child declaration inheriting from Article, in YAML.
fn write_post_yaml(dir: &TempDir) -> PathBuf {
    let yaml = "\
name: BlogPost
parents: [Article]
skeleton:
  body: string
optional:
  rank: int
default_values:
  rank: 0
";
    let path = dir.join("post.yaml");
    fs::write(&path, yaml).expect("failed to write declaration");
    path
}

/// A standalone declaration with nested structure.
fn write_nested_yaml(dir: &TempDir) -> PathBuf {
    let yaml = "\
name: Doc
skeleton:
  zebra: string
  apple: int
  mango:
    ripe: bool
";
    let path = dir.join("doc.yaml");
    fs::write(&path, yaml).expect("failed to write declaration");
    path
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_reports_file_and_schema_counts() {
    let dir = TempDir::new("validate_counts");
    write_article_json(&dir);
    write_post_yaml(&dir);

    let output = docschema(&["validate", dir.path().to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(
        stdout_of(&output),
        "Validated 2 declaration file(s) for 2 schema(s).\n"
    );
}

#[test]
fn validate_fails_on_missing_parent() {
    let dir = TempDir::new("validate_missing_parent");
    fs::write(dir.join("orphan.yaml"), "name: Orphan\nparents: [Ghost]\n")
        .expect("failed to write declaration");

    let output = docschema(&["validate", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert_eq!(
        stderr_of(&output),
        "error: cannot resolve parents for: Orphan\n"
    );
}

#[test]
fn validate_fails_on_dangling_index_path() {
    let dir = TempDir::new("validate_dangling_index");
    let json = json!({
        "name": "Doc",
        "skeleton": {"title": "string"},
        "indexes": [{"fields": "ghost"}]
    });
    fs::write(dir.join("doc.json"), json.to_string()).expect("failed to write declaration");

    let output = docschema(&["validate", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert_eq!(
        stderr_of(&output),
        "error: Doc: Error in indexes: can't find ghost in skeleton or optional\n"
    );
}

// ---------------------------------------------------------------------------
// namespaces
// ---------------------------------------------------------------------------

#[test]
fn namespaces_table_lists_paths_in_declaration_order() {
    let dir = TempDir::new("namespaces_table");
    let decl = write_nested_yaml(&dir);

    let output = docschema(&[
        "namespaces",
        decl.to_str().unwrap(),
        "--format",
        "table",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "zebra\napple\nmango\nmango.ripe\n");
}

#[test]
fn namespaces_json_includes_inherited_paths() {
    let dir = TempDir::new("namespaces_json");
    write_article_json(&dir);
    write_post_yaml(&dir);

    let output = docschema(&[
        "namespaces",
        dir.path().to_str().unwrap(),
        "--schema",
        "BlogPost",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let parsed: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(parsed, json!(["body", "title", "rank"]));
}

#[test]
fn inspection_requires_schema_flag_when_ambiguous() {
    let dir = TempDir::new("ambiguous_schema");
    write_article_json(&dir);
    write_post_yaml(&dir);

    let output = docschema(&["namespaces", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert_eq!(
        stderr_of(&output),
        "error: --schema is required when several schemas are loaded (Article, BlogPost)\n"
    );
}

// ---------------------------------------------------------------------------
// collapse
// ---------------------------------------------------------------------------

#[test]
fn collapse_json_maps_leaf_paths_to_shapes() {
    let dir = TempDir::new("collapse_json");
    let decl = write_nested_yaml(&dir);

    let output = docschema(&["collapse", decl.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let parsed: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(
        parsed,
        json!({
            "apple": "int",
            "mango.ripe": "bool",
            "zebra": "string",
        })
    );
}

#[test]
fn collapse_table_aligns_paths() {
    let dir = TempDir::new("collapse_table");
    let decl = write_nested_yaml(&dir);

    let output = docschema(&["collapse", decl.to_str().unwrap(), "--format", "table"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    // paths sort lexicographically and pad to the widest
    assert_eq!(
        stdout_of(&output),
        "apple       \"int\"\nmango.ripe  \"bool\"\nzebra       \"string\"\n"
    );
}

// ---------------------------------------------------------------------------
// materialize
// ---------------------------------------------------------------------------

#[test]
fn materialize_applies_inherited_defaults() {
    let dir = TempDir::new("materialize_defaults");
    write_article_json(&dir);
    write_post_yaml(&dir);

    let output = docschema(&[
        "materialize",
        dir.path().to_str().unwrap(),
        "--schema",
        "BlogPost",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let parsed: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(
        parsed,
        json!({"body": null, "title": "untitled", "rank": 0})
    );
}

#[test]
fn materialize_no_defaults_leaves_placeholders() {
    let dir = TempDir::new("materialize_bare");
    write_article_json(&dir);
    write_post_yaml(&dir);

    let output = docschema(&[
        "materialize",
        dir.path().to_str().unwrap(),
        "--schema",
        "BlogPost",
        "--no-defaults",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let parsed: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(parsed, json!({"body": null, "title": null, "rank": null}));
}

#[test]
fn materialize_yaml_output_parses() {
    let dir = TempDir::new("materialize_yaml");
    let decl = write_nested_yaml(&dir);

    let output = docschema(&[
        "materialize",
        decl.to_str().unwrap(),
        "--format",
        "yaml",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let parsed: Value = serde_yaml::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(
        parsed,
        json!({"zebra": null, "apple": null, "mango": {"ripe": null}})
    );
}

// ---------------------------------------------------------------------------
// indexes
// ---------------------------------------------------------------------------

#[test]
fn indexes_json_carries_generated_names() {
    let dir = TempDir::new("indexes_json");
    let decl = write_article_json(&dir);

    let output = docschema(&["indexes", decl.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let parsed: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(
        parsed,
        json!([{"name": "title_1", "fields": "title", "unique": true}])
    );
}

#[test]
fn indexes_table_shows_names_and_options() {
    let dir = TempDir::new("indexes_table");
    let decl = write_article_json(&dir);

    let output = docschema(&["indexes", decl.to_str().unwrap(), "--format", "table"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "title_1  \"title\"  unique\n");
}

#[test]
fn indexes_rejects_unknown_paths() {
    let dir = TempDir::new("indexes_unknown");
    let json = json!({
        "name": "Doc",
        "skeleton": {"title": "string"},
        "indexes": [{"fields": [["title", 1], ["ghost", -1]]}]
    });
    fs::write(dir.join("doc.json"), json.to_string()).expect("failed to write declaration");

    let output = docschema(&["indexes", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert_eq!(
        stderr_of(&output),
        "error: Error in indexes: can't find ghost in skeleton or optional\n"
    );
}
