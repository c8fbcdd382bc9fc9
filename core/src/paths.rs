//! Companion schema file locations.
//!
//! Both helpers are pure path computations; neither touches the file system.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use serde_json::Value;

/// Suffix of the companion schema next to a document.
pub const SCHEMA_SUFFIX: &str = ".schema.json";

/// Resolves the document's `$schema` member against its directory.
///
/// Returns `None` when the document has no string `$schema`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use json_form_core::schema_property_path;
/// use serde_json::json;
///
/// let doc = Path::new("data").join("person.json");
/// let found = schema_property_path(&doc, &json!({"$schema": "schemas/person.json"}));
/// assert_eq!(found, Some(Path::new("data").join("schemas").join("person.json")));
///
/// assert_eq!(schema_property_path(&doc, &json!({"$schema": 1})), None);
/// ```
pub fn schema_property_path(document: &Path, data: &Value) -> Option<PathBuf> {
    let reference = data.get("$schema")?.as_str()?;
    let relative = reference.replace('/', &MAIN_SEPARATOR.to_string());
    Some(directory(document).join(relative))
}

/// `<dir>/<stem>.schema.json` for a document at `<dir>/<stem>.<ext>`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use json_form_core::default_schema_path;
///
/// let doc = Path::new("data").join("person.json");
/// assert_eq!(default_schema_path(&doc), Path::new("data").join("person.schema.json"));
/// ```
pub fn default_schema_path(document: &Path) -> PathBuf {
    companion_path(document, SCHEMA_SUFFIX)
}

/// `<dir>/<stem><suffix>` for a document at `<dir>/<stem>.<ext>`.
pub fn companion_path(document: &Path, suffix: &str) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    directory(document).join(format!("{stem}{suffix}"))
}

fn directory(document: &Path) -> &Path {
    document.parent().unwrap_or_else(|| Path::new(""))
}
