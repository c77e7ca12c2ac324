use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use document_schema_core::{Document, EffectiveSchema};
use document_schema_registry::{
    DeclarationFile, SchemaRegistry, load_dir, load_file, register_all,
};
use serde_json::Value;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "docschema")]
#[command(about = "Inspect and validate document schema declarations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compose a declaration set and validate its index descriptors.
    Validate(ValidateArgs),
    /// Print the flattened namespace list of one schema.
    Namespaces(NamespacesArgs),
    /// Print the collapsed path-to-node map of one schema.
    Collapse(CollapseArgs),
    /// Print a freshly generated document for one schema.
    Materialize(MaterializeArgs),
    /// Validate index descriptors and print them with generated names.
    Indexes(IndexesArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Declaration files and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct NamespacesArgs {
    /// Declaration files and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Schema to inspect; defaults to the only one loaded.
    #[arg(long)]
    schema: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct CollapseArgs {
    /// Declaration files and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Schema to inspect; defaults to the only one loaded.
    #[arg(long)]
    schema: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct MaterializeArgs {
    /// Declaration files and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Schema to materialize; defaults to the only one loaded.
    #[arg(long)]
    schema: Option<String>,
    /// Generate structural placeholders only, skipping defaults.
    #[arg(long)]
    no_defaults: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct IndexesArgs {
    /// Declaration files and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Schema to inspect; defaults to the only one loaded.
    #[arg(long)]
    schema: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Namespaces(args) => run_namespaces(args),
        Command::Collapse(args) => run_collapse(args),
        Command::Materialize(args) => run_materialize(args),
        Command::Indexes(args) => run_indexes(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let (registry, file_count) = build_registry(&args.inputs)?;

    let mut names: Vec<&str> = registry.names().collect();
    names.sort();
    for name in &names {
        if let Some(schema) = registry.get(name) {
            schema
                .validate_indexes()
                .map_err(|e| format!("{name}: {e}"))?;
        }
    }

    println!(
        "Validated {file_count} declaration file(s) for {} schema(s).",
        registry.len()
    );
    Ok(())
}

fn run_namespaces(args: NamespacesArgs) -> Result<(), String> {
    let (registry, _) = build_registry(&args.inputs)?;
    let schema = select_schema(&registry, args.schema.as_deref())?;

    match args.format {
        CliOutputFormat::Json => println!("{}", to_json(&serde_json::json!(schema.namespaces()))?),
        CliOutputFormat::Yaml => print!("{}", to_yaml(&serde_json::json!(schema.namespaces()))?),
        CliOutputFormat::Table => {
            for path in schema.namespaces() {
                println!("{path}");
            }
        }
    }
    Ok(())
}

fn run_collapse(args: CollapseArgs) -> Result<(), String> {
    let (registry, _) = build_registry(&args.inputs)?;
    let schema = select_schema(&registry, args.schema.as_deref())?;

    match args.format {
        CliOutputFormat::Table => {
            let width = schema
                .collapsed()
                .keys()
                .map(String::len)
                .max()
                .unwrap_or(0);
            for (path, node) in schema.collapsed() {
                let shape = compact(&node.to_value())?;
                println!("{path:<width$}  {shape}");
            }
        }
        format => {
            let mut rendered = Document::new();
            for (path, node) in schema.collapsed() {
                rendered.insert(path.clone(), node.to_value());
            }
            print_value(&Value::Object(rendered), format)?;
        }
    }
    Ok(())
}

fn run_materialize(args: MaterializeArgs) -> Result<(), String> {
    let (registry, _) = build_registry(&args.inputs)?;
    let schema = select_schema(&registry, args.schema.as_deref())?;

    let doc = if args.no_defaults {
        let mut doc = Document::new();
        schema.generate_into(&mut doc);
        doc
    } else {
        schema.materialize()
    };

    match args.format {
        CliOutputFormat::Table => {
            let mut rows = Vec::new();
            flatten_document("", &doc, &mut rows);
            let width = rows.iter().map(|(path, _)| path.len()).max().unwrap_or(0);
            for (path, rendered) in rows {
                println!("{path:<width$}  {rendered}");
            }
        }
        format => print_value(&Value::Object(doc), format)?,
    }
    Ok(())
}

fn run_indexes(args: IndexesArgs) -> Result<(), String> {
    let (registry, _) = build_registry(&args.inputs)?;
    let schema = select_schema(&registry, args.schema.as_deref())?;
    schema.validate_indexes().map_err(|e| e.to_string())?;

    match args.format {
        CliOutputFormat::Table => {
            let width = schema
                .indexes()
                .iter()
                .map(|index| index.name().len())
                .max()
                .unwrap_or(0);
            for index in schema.indexes() {
                let name = index.name();
                let descriptor = index.to_value();
                let fields = compact(descriptor.get("fields").unwrap_or(&Value::Null))?;
                let mut options = String::new();
                if index.unique {
                    options.push_str("  unique");
                }
                if let Some(ttl) = index.ttl {
                    options.push_str(&format!("  ttl={ttl}"));
                }
                if !index.check {
                    options.push_str("  check=false");
                }
                println!("{name:<width$}  {fields}{options}");
            }
        }
        format => {
            let rendered: Vec<Value> = schema
                .indexes()
                .iter()
                .map(|index| {
                    let mut entry = Document::new();
                    entry.insert("name".to_string(), Value::String(index.name()));
                    if let Value::Object(map) = index.to_value() {
                        entry.extend(map);
                    }
                    Value::Object(entry)
                })
                .collect();
            print_value(&Value::Array(rendered), format)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loads declaration files from a mix of file and directory paths.
fn load_inputs(inputs: &[PathBuf]) -> Result<Vec<DeclarationFile>, String> {
    let mut batch = Vec::new();
    for input in inputs {
        if input.is_dir() {
            batch.extend(load_dir(input).map_err(|e| e.to_string())?);
        } else {
            batch.push(load_file(input).map_err(|e| e.to_string())?);
        }
    }
    Ok(batch)
}

/// Loads and registers every input declaration; returns the registry and
/// the number of files read.
fn build_registry(inputs: &[PathBuf]) -> Result<(SchemaRegistry, usize), String> {
    let batch = load_inputs(inputs)?;
    let file_count = batch.len();
    let mut registry = SchemaRegistry::new();
    register_all(&mut registry, batch).map_err(|e| e.to_string())?;
    Ok((registry, file_count))
}

/// Picks the schema to inspect: the named one, or the only one loaded.
fn select_schema(
    registry: &SchemaRegistry,
    name: Option<&str>,
) -> Result<Arc<EffectiveSchema>, String> {
    if let Some(name) = name {
        return registry
            .get(name)
            .ok_or_else(|| format!("schema '{name}' is not in the loaded set"));
    }
    let mut names: Vec<&str> = registry.names().collect();
    if names.len() > 1 {
        names.sort();
        return Err(format!(
            "--schema is required when several schemas are loaded ({})",
            names.join(", ")
        ));
    }
    names
        .first()
        .and_then(|only| registry.get(only))
        .ok_or_else(|| "no declarations loaded".to_string())
}

fn print_value(value: &Value, format: CliOutputFormat) -> Result<(), String> {
    match format {
        CliOutputFormat::Yaml => print!("{}", to_yaml(value)?),
        _ => println!("{}", to_json(value)?),
    }
    Ok(())
}

fn to_json(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

fn to_yaml(value: &Value) -> Result<String, String> {
    serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
}

fn compact(value: &Value) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Flattens a document into `(dot-path, compact value)` rows for table
/// output. Empty maps and lists are leaves.
fn flatten_document(prefix: &str, doc: &Document, rows: &mut Vec<(String, String)>) {
    for (key, value) in doc {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_document(&path, inner, rows),
            other => rows.push((path, other.to_string())),
        }
    }
}
