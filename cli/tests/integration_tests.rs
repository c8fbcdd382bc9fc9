use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("json_form_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
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

fn json_form(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_json-form"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run json-form")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn read_json(path: &PathBuf) -> serde_json::Value {
    let raw = fs::read_to_string(path).expect("failed to read output");
    serde_json::from_str(&raw).expect("output is not JSON")
}

/// Writes `person.schema.json` into `dir` and returns its path.
fn write_person_schema(dir: &TempDir) -> PathBuf {
    let schema = serde_json::json!({
        "title": "Person",
        "type": "object",
        "required": ["name", "active"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "active": {"type": "boolean"},
            "age": {"type": "integer", "minimum": 0},
            "photo": {"type": "string", "contentEncoding": "base64"},
            "tags": {"type": "array", "items": {"type": "string"}},
            "address": {
                "type": "object",
                "required": ["city"],
                "properties": {"city": {"type": "string"}}
            }
        }
    });
    let path = dir.join("person.schema.json");
    fs::write(&path, serde_json::to_string_pretty(&schema).unwrap()).expect("failed to write schema");
    path
}

fn write_document(dir: &TempDir, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).expect("failed to write document");
    path
}

// ---------------------------------------------------------------------------
// new / format
// ---------------------------------------------------------------------------

#[test]
fn new_prints_default_document() {
    let dir = TempDir::new("new_stdout");
    let schema = write_person_schema(&dir);

    let output = json_form(&["new", "--schema", schema.to_str().unwrap()]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value, serde_json::json!({"name": "", "active": false, "photo": ""}));
}

#[test]
fn new_writes_output_file() {
    let dir = TempDir::new("new_file");
    let schema = write_person_schema(&dir);
    let out = dir.join("person.json");

    let output = json_form(&["new", "--schema", schema.to_str().unwrap(), "--output", out.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(read_json(&out)["active"], serde_json::json!(false));
}

#[test]
fn format_drops_unknown_members_and_reorders() {
    let dir = TempDir::new("format");
    write_person_schema(&dir);
    let doc = write_document(
        &dir,
        "person.json",
        serde_json::json!({"tags": ["a"], "zzz": 1, "active": true, "name": "Bob"}),
    );

    let output = json_form(&["format", doc.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("{\n  \"name\": \"Bob\",\n  \"active\": true"));
    assert!(!text.contains("zzz"));
}

// ---------------------------------------------------------------------------
// show / set
// ---------------------------------------------------------------------------

#[test]
fn show_lists_properties_with_ordinals() {
    let dir = TempDir::new("show");
    write_person_schema(&dir);
    let doc = write_document(
        &dir,
        "person.json",
        serde_json::json!({
            "name": "Bob",
            "active": true,
            "photo": "aGVsbG8=",
            "tags": ["a", "b"],
            "address": {"city": "Oslo"}
        }),
    );

    let output = json_form(&["show", doc.to_str().unwrap()]);
    assert!(output.status.success());
    let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();
    assert_eq!(
        lines,
        [
            "name*: \"Bob\"",
            "active*: true",
            "age: null",
            "photo: \"hello\"",
            "tags: [2]",
            "  1. \"a\"",
            "  2. \"b\"",
            "address:",
            "  city*: \"Oslo\"",
        ]
    );
}

#[test]
fn set_updates_document_in_place() {
    let dir = TempDir::new("set");
    write_person_schema(&dir);
    let doc = write_document(&dir, "person.json", serde_json::json!({"name": "Bob", "active": true}));
    let doc_arg = doc.to_str().unwrap();

    assert!(json_form(&["set", doc_arg, "age", "42"]).status.success());
    assert!(json_form(&["set", doc_arg, "name", "42"]).status.success());
    assert!(json_form(&["set", doc_arg, "photo", "hello"]).status.success());

    let saved = read_json(&doc);
    assert_eq!(saved["age"], serde_json::json!(42));
    assert_eq!(saved["name"], serde_json::json!("42"));
    assert_eq!(saved["photo"], serde_json::json!("aGVsbG8="));
}

#[test]
fn set_rejects_unknown_path() {
    let dir = TempDir::new("set_unknown");
    write_person_schema(&dir);
    let doc = write_document(&dir, "person.json", serde_json::json!({"name": "Bob"}));

    let output = json_form(&["set", doc.to_str().unwrap(), "address.zip", "1234"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no property at path: address.zip"));
}

// ---------------------------------------------------------------------------
// validate / schema-path
// ---------------------------------------------------------------------------

#[test]
fn validate_reports_errors_and_fails() {
    let dir = TempDir::new("validate");
    write_person_schema(&dir);
    let doc = write_document(&dir, "person.json", serde_json::json!({"name": "", "active": true, "age": -1}));

    let output = json_form(&["validate", doc.to_str().unwrap()]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "#/name: StringTooShort\n#/age: NumberTooSmall\n");
}

#[test]
fn validate_accepts_valid_document() {
    let dir = TempDir::new("validate_ok");
    let schema = write_person_schema(&dir);
    let doc = write_document(&dir, "other.json", serde_json::json!({"name": "Bob", "active": true}));

    let output = json_form(&["validate", doc.to_str().unwrap(), "--schema", schema.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("is valid"));
}

#[test]
fn schema_path_reports_discovery() {
    let dir = TempDir::new("schema_path");
    write_person_schema(&dir);
    let by_default = write_document(&dir, "person.json", serde_json::json!({}));
    let by_property = write_document(&dir, "other.json", serde_json::json!({"$schema": "person.schema.json"}));
    let orphan = write_document(&dir, "orphan.json", serde_json::json!({}));

    let output = json_form(&["schema-path", by_default.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).trim_end().ends_with("(default location)"));

    let output = json_form(&["schema-path", by_property.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).trim_end().ends_with("($schema property)"));

    let output = json_form(&["schema-path", orphan.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no schema found"));
}

#[test]
fn config_file_controls_indent() {
    let dir = TempDir::new("config");
    let schema = write_person_schema(&dir);
    let config = dir.join("json-form.yml");
    fs::write(&config, "indent: 0\n").expect("failed to write config");

    let output = json_form(&[
        "--config",
        config.to_str().unwrap(),
        "new",
        "--schema",
        schema.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "{\"name\":\"\",\"active\":false,\"photo\":\"\"}\n");
}
