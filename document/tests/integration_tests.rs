use std::path::Path;

use json_form_document::{Document, DocumentError, EditorConfig, SchemaSource, UNTITLED};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn schema() -> Value {
    json!({
        "title": "Settings",
        "type": "object",
        "required": ["name", "window"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "window": {
                "type": "object",
                "required": ["width"],
                "properties": {"width": {"type": "integer", "default": 800}}
            },
            "secret": {"type": "string", "contentEncoding": "base64"}
        }
    })
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

#[test]
fn test_open_with_default_location_schema() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("settings.json");
    write_json(&dir.path().join("settings.schema.json"), &schema());
    write_json(&doc_path, &json!({"name": "prod", "extra": true}));

    let doc = Document::open(&doc_path, &EditorConfig::default()).unwrap();
    assert!(matches!(doc.schema_source(), SchemaSource::DefaultLocation(_)));
    assert_eq!(doc.path(), Some(doc_path.as_path()));
    assert!(!doc.is_dirty());
    assert!(!doc.is_read_only());
    assert_eq!(doc.display_title(), "settings.json");
    // A required object missing from the file is kept as an explicit null.
    assert_eq!(
        doc.data().to_json(),
        json!({"name": "prod", "window": null, "secret": ""})
    );
}

#[test]
fn test_open_through_schema_property() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("schemas")).unwrap();
    write_json(&dir.path().join("schemas").join("settings.json"), &schema());
    let doc_path = dir.path().join("prod.json");
    write_json(&doc_path, &json!({"$schema": "schemas/settings.json", "name": "x"}));

    let doc = Document::open(&doc_path, &EditorConfig::default()).unwrap();
    assert_eq!(
        doc.schema_source(),
        &SchemaSource::SchemaProperty(dir.path().join("schemas").join("settings.json"))
    );
}

#[test]
fn test_open_without_schema_fails() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("orphan.json");
    write_json(&doc_path, &json!({}));

    let err = Document::open(&doc_path, &EditorConfig::default()).unwrap_err();
    assert!(matches!(err, DocumentError::SchemaNotFound(_)));
}

#[test]
fn test_broken_schema_surfaces() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("doc.json");
    let schema_path = dir.path().join("broken.json");
    write_json(&doc_path, &json!({}));
    write_json(&schema_path, &json!({"properties": {"a": {"$ref": "#/definitions/missing"}}}));

    let err = Document::open_with_schema(&doc_path, &schema_path).unwrap_err();
    assert!(matches!(err, DocumentError::SchemaError(_)));
}

#[test]
fn test_read_only_file_refuses_save() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("locked.json");
    let schema_path = dir.path().join("schema.json");
    write_json(&schema_path, &schema());
    write_json(&doc_path, &json!({"name": "locked"}));

    let mut permissions = std::fs::metadata(&doc_path).unwrap().permissions();
    permissions.set_readonly(true);
    std::fs::set_permissions(&doc_path, permissions).unwrap();

    let mut doc = Document::open_with_schema(&doc_path, &schema_path).unwrap();
    assert!(doc.is_read_only());
    let err = doc.save(&EditorConfig::default()).unwrap_err();
    assert!(matches!(err, DocumentError::ReadOnly(_)));

    // Save-as writes a new file, which is editable.
    let copy = dir.path().join("copy.json");
    doc.save_as(&copy, &EditorConfig::default()).unwrap();
    assert!(!doc.is_read_only());
    assert_eq!(read_json(&copy)["name"], json!("locked"));

    let mut permissions = std::fs::metadata(&doc_path).unwrap().permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    std::fs::set_permissions(&doc_path, permissions).unwrap();
}

// ---------------------------------------------------------------------------
// Editing and saving
// ---------------------------------------------------------------------------

#[test]
fn test_create_edit_save_as() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("settings.schema.json");
    write_json(&schema_path, &schema());

    let mut doc = Document::create(&schema_path).unwrap();
    assert_eq!(doc.display_title(), UNTITLED);
    assert!(matches!(
        doc.save(&EditorConfig::default()),
        Err(DocumentError::NotFileBacked)
    ));

    doc.set_value("window.width", 1024_i64).unwrap();
    doc.set_value("secret", "hunter2").unwrap();
    assert!(doc.is_dirty());
    assert_eq!(doc.display_title(), format!("{UNTITLED}*"));

    let config = EditorConfig {
        validate_on_save: true,
        ..EditorConfig::default()
    };
    let out = dir.path().join("settings.json");
    let report = doc.save_as(&out, &config).unwrap().unwrap();
    assert_eq!(report.text(), "#/name: StringTooShort");
    assert!(!doc.is_dirty());
    assert_eq!(doc.display_title(), "settings.json");

    let saved = read_json(&out);
    assert_eq!(saved["window"], json!({"width": 1024}));
    assert_eq!(saved["secret"], json!("aHVudGVyMg=="));
    assert!(std::fs::read_to_string(&out).unwrap().starts_with("{\n  \"name\""));

    let reopened = Document::open(&out, &EditorConfig::default()).unwrap();
    assert_eq!(reopened.property("secret").unwrap().value().as_str(), Some("hunter2"));
}

#[test]
fn test_property_paths() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("s.json");
    write_json(&schema_path, &schema());
    let doc = Document::create(&schema_path).unwrap();

    assert_eq!(doc.property("window.width").unwrap().name(), "width");
    assert!(matches!(
        doc.property("window.height"),
        Err(DocumentError::PropertyNotFound(path)) if path == "window.height"
    ));
    assert!(matches!(
        doc.property("name.first"),
        Err(DocumentError::PropertyNotFound(_))
    ));
}

#[test]
fn test_root_view_writes_mark_dirty() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("s.json");
    write_json(&schema_path, &schema());
    let doc = Document::create(&schema_path).unwrap();

    let name = doc.data().property("name").unwrap();
    name.set_value("edited").unwrap();
    assert!(doc.is_dirty());
}

#[test]
fn test_save_schema_as_copies_source() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("s.json");
    write_json(&schema_path, &schema());
    let doc = Document::create(&schema_path).unwrap();

    let copy = dir.path().join("copy.schema.json");
    doc.save_schema_as(&copy).unwrap();
    assert_eq!(read_json(&copy), schema());
}

#[test]
fn test_failed_save_as_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("s.json");
    let doc_path = dir.path().join("doc.json");
    write_json(&schema_path, &schema());
    write_json(&doc_path, &json!({"name": "kept"}));

    let mut doc = Document::open_with_schema(&doc_path, &schema_path).unwrap();
    doc.set_read_only(true);
    let unreachable = dir.path().join("missing").join("doc.json");
    let err = doc.save_as(&unreachable, &EditorConfig::default()).unwrap_err();
    assert!(matches!(err, DocumentError::IoError(_)));
    assert_eq!(doc.path(), Some(doc_path.as_path()));
    assert!(doc.is_read_only());

    let mut untitled = Document::create(&schema_path).unwrap();
    untitled.set_value("name", "draft").unwrap();
    assert!(untitled.save_as(&unreachable, &EditorConfig::default()).is_err());
    assert_eq!(untitled.path(), None);
    assert_eq!(untitled.display_title(), format!("{UNTITLED}*"));
}
