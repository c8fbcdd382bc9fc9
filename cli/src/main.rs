use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use json_form_core::{ObjectModel, PropertyModel, PropertyValue, Scalar, Token, TokenList};
use json_form_document::{Document, EditorConfig, locate_schema};
use json_form_schema::JsonType;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "json-form")]
#[command(about = "Schema-driven JSON document editing", version)]
struct Cli {
    /// Editor configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a document holding a schema's default values.
    New(NewArgs),
    /// Print a document's properties as a tree.
    Show(ShowArgs),
    /// Set one property and save the document.
    Set(SetArgs),
    /// Rewrite a document in canonical form.
    Format(FormatArgs),
    /// Validate a document against its schema.
    Validate(ValidateArgs),
    /// Print which schema a document binds to and how it was found.
    SchemaPath(SchemaPathArgs),
}

#[derive(Debug, Args)]
struct NewArgs {
    /// JSON schema file.
    #[arg(long)]
    schema: PathBuf,
    /// Output document path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DocumentArgs {
    /// JSON document file.
    document: PathBuf,
    /// Schema file, skipping discovery.
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ShowArgs {
    #[command(flatten)]
    input: DocumentArgs,
}

#[derive(Debug, Args)]
struct SetArgs {
    #[command(flatten)]
    input: DocumentArgs,
    /// Dotted property path (e.g. window.width).
    path: String,
    /// New value; parsed as JSON, falling back to plain text.
    value: String,
    /// Write to this file instead of updating the document in place.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FormatArgs {
    #[command(flatten)]
    input: DocumentArgs,
    /// Output path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    input: DocumentArgs,
}

#[derive(Debug, Args)]
struct SchemaPathArgs {
    /// JSON document file.
    document: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::New(args) => run_new(args, &config),
        Command::Show(args) => run_show(args, &config),
        Command::Set(args) => run_set(args, &config),
        Command::Format(args) => run_format(args, &config),
        Command::Validate(args) => run_validate(args, &config),
        Command::SchemaPath(args) => run_schema_path(args, &config),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, String> {
    match path {
        Some(path) => EditorConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

fn open_document(args: &DocumentArgs, config: &EditorConfig) -> Result<Document, String> {
    let document = match &args.schema {
        Some(schema) => Document::open_with_schema(&args.document, schema),
        None => Document::open(&args.document, config),
    };
    document.map_err(|err| format!("Failed to open '{}': {err}", args.document.display()))
}

fn run_new(args: NewArgs, config: &EditorConfig) -> Result<(), String> {
    let mut document = Document::create(&args.schema)
        .map_err(|err| format!("Failed to load schema '{}': {err}", args.schema.display()))?;

    match args.output {
        Some(output) => {
            document
                .save_as(&output, config)
                .map_err(|err| format!("Failed to write '{}': {err}", output.display()))?;
            println!("Created '{}'.", output.display());
        }
        None => println!("{}", document.to_json_string(config.indent).map_err(|e| e.to_string())?),
    }
    Ok(())
}

fn run_show(args: ShowArgs, config: &EditorConfig) -> Result<(), String> {
    let document = open_document(&args.input, config)?;
    let mut lines = Vec::new();
    describe_object(document.data(), "", &mut lines);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn describe_object(object: &Rc<ObjectModel>, padding: &str, lines: &mut Vec<String>) {
    let nested = format!("{padding}  ");
    for property in object.properties() {
        let marker = if property.is_required() { "*" } else { "" };
        match property.value() {
            PropertyValue::Object(child) => {
                lines.push(format!("{padding}{}{marker}:", property.name()));
                describe_object(&child, &nested, lines);
            }
            PropertyValue::Array(list) => {
                lines.push(format!("{padding}{}{marker}: [{}]", property.name(), list.len()));
                describe_list(&list, &nested, lines);
            }
            PropertyValue::Scalar(scalar) => {
                lines.push(format!("{padding}{}{marker}: {}", property.name(), scalar.to_json()));
            }
            PropertyValue::Null => lines.push(format!("{padding}{}{marker}: null", property.name())),
        }
    }
}

fn describe_list(list: &Rc<TokenList>, padding: &str, lines: &mut Vec<String>) {
    let nested = format!("{padding}    ");
    for item in list.items() {
        let ordinal = item.ordinal().unwrap_or_default();
        match item.token() {
            Token::Object(object) => {
                lines.push(format!("{padding}{ordinal}."));
                describe_object(&object, &nested, lines);
            }
            Token::Array(inner) => {
                lines.push(format!("{padding}{ordinal}. [{}]", inner.len()));
                describe_list(&inner, &nested, lines);
            }
            Token::Value(value) => {
                let text = value.map_or_else(|| "null".to_string(), |scalar| scalar.to_json().to_string());
                lines.push(format!("{padding}{ordinal}. {text}"));
            }
        }
    }
}

fn run_set(args: SetArgs, config: &EditorConfig) -> Result<(), String> {
    let mut document = open_document(&args.input, config)?;
    let property = document.property(&args.path).map_err(|err| err.to_string())?;
    let value = parse_value(&property, &args.value)?;
    drop(property);

    document.set_value(&args.path, value).map_err(|err| err.to_string())?;

    let saved = match &args.output {
        Some(output) => document.save_as(output, config),
        None => document.save(config),
    };
    let report = saved.map_err(|err| format!("Failed to save: {err}"))?;
    println!("Set '{}' in '{}'.", args.path, document.display_title());

    if let Some(report) = report.filter(|report| !report.is_valid()) {
        eprintln!("{report}");
    }
    Ok(())
}

/// String properties take the text verbatim; others parse it as a JSON
/// scalar, falling back to text.
fn parse_value(property: &PropertyModel, raw: &str) -> Result<PropertyValue, String> {
    let actual = property.schema().actual();
    if property.is_base64() || actual.types().contains(JsonType::STRING) {
        return Ok(raw.into());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => Ok(PropertyValue::Null),
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Err(format!(
            "'{}' takes a single value, not {value}",
            property.name()
        )),
        Ok(value) => Ok(Scalar::from_json(&value).into()),
        Err(err) => {
            debug!(property = property.name(), error = %err, "value is not JSON; storing text");
            Ok(raw.into())
        }
    }
}

fn run_format(args: FormatArgs, config: &EditorConfig) -> Result<(), String> {
    let mut document = open_document(&args.input, config)?;
    match args.output {
        Some(output) => {
            document
                .save_as(&output, config)
                .map_err(|err| format!("Failed to write '{}': {err}", output.display()))?;
            println!("Formatted into '{}'.", output.display());
        }
        None => println!("{}", document.to_json_string(config.indent).map_err(|e| e.to_string())?),
    }
    Ok(())
}

fn run_validate(args: ValidateArgs, config: &EditorConfig) -> Result<(), String> {
    let document = open_document(&args.input, config)?;
    let report = document
        .data()
        .validate_async()
        .wait()
        .map_err(|err| err.to_string())?;

    if report.is_valid() {
        println!("'{}' is valid.", args.input.document.display());
        return Ok(());
    }
    println!("{report}");
    Err(format!(
        "'{}' has {} validation error(s)",
        args.input.document.display(),
        report.errors().len()
    ))
}

fn run_schema_path(args: SchemaPathArgs, config: &EditorConfig) -> Result<(), String> {
    let raw = fs::read_to_string(&args.document)
        .map_err(|err| format!("Failed to read '{}': {err}", args.document.display()))?;
    let data: Value = serde_json::from_str(&raw)
        .map_err(|err| format!("Failed to parse '{}': {err}", args.document.display()))?;
    let source = locate_schema(&args.document, &data, config).map_err(|err| err.to_string())?;
    println!("{source}");
    Ok(())
}
