//! Open, edit and save JSON documents bound to a schema.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use json_form_core::{
    ChangeEvent, ObjectModel, PropertyModel, PropertyValue, Subscription, ValidationReport,
};
use json_form_schema::{JsonSchema, Schema};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::error::{DocumentError, Result};
use crate::loader::{SchemaSource, locate_schema};

/// Title shown for a document that has no file yet.
pub const UNTITLED: &str = "Untitled";

/// A JSON document, its schema and its object model.
///
/// Writes made through [`Document::set_value`] or through any view of a
/// root-level property mark the document dirty; saving clears the flag.
///
/// # Examples
///
/// ```no_run
/// use json_form_document::{Document, EditorConfig};
///
/// let config = EditorConfig::default();
/// let mut doc = Document::open("settings.json", &config).unwrap();
/// doc.set_value("window.width", 1024_i64).unwrap();
/// assert!(doc.is_dirty());
/// doc.save(&config).unwrap();
/// ```
pub struct Document {
    path: Option<PathBuf>,
    schema_source: SchemaSource,
    schema: Schema,
    data: Rc<ObjectModel>,
    read_only: bool,
    dirty: Rc<Cell<bool>>,
    _tracker: Subscription<ChangeEvent>,
}

impl Document {
    fn new(path: Option<PathBuf>, schema_source: SchemaSource, schema: Schema, data: Rc<ObjectModel>) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        let tracker = data.subscribe(move |_| flag.set(true));
        Self {
            path,
            schema_source,
            schema,
            data,
            read_only: false,
            dirty,
            _tracker: tracker,
        }
    }

    /// Creates an unsaved document holding the schema's defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be read or compiled.
    pub fn create(schema_path: impl AsRef<Path>) -> Result<Self> {
        let schema_path = schema_path.as_ref();
        let schema = JsonSchema::from_file(schema_path)?;
        let data = ObjectModel::from_schema(&schema);
        debug!(schema = %schema_path.display(), "created document from schema");
        Ok(Self::new(
            None,
            SchemaSource::Explicit(schema_path.to_path_buf()),
            schema,
            data,
        ))
    }

    /// Opens a document, discovering its schema.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::SchemaNotFound`] if no schema can be located,
    /// or an I/O, JSON, schema or model error if a file cannot be read.
    pub fn open(path: impl AsRef<Path>, config: &EditorConfig) -> Result<Self> {
        let path = path.as_ref();
        let raw = read_json(path)?;
        let source = locate_schema(path, &raw, config)?;
        Self::load(path, &raw, source)
    }

    /// Opens a document against a known schema.
    pub fn open_with_schema(path: impl AsRef<Path>, schema_path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = read_json(path)?;
        Self::load(path, &raw, SchemaSource::Explicit(schema_path.as_ref().to_path_buf()))
    }

    fn load(path: &Path, raw: &Value, source: SchemaSource) -> Result<Self> {
        let schema = JsonSchema::from_file(source.path())?;
        let data = ObjectModel::from_value(raw, &schema)?;
        let read_only = std::fs::metadata(path)?.permissions().readonly();
        info!(document = %path.display(), schema = %source, read_only, "opened document");

        let mut document = Self::new(Some(path.to_path_buf()), source, schema, data);
        document.read_only = read_only;
        Ok(document)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_source(&self) -> &SchemaSource {
        &self.schema_source
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The root object.
    pub fn data(&self) -> &Rc<ObjectModel> {
        &self.data
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Whether there are edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Resolves a dotted path such as `window.width` to a property view.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::PropertyNotFound`] if a segment is not
    /// declared, or an intermediate segment does not hold an object.
    pub fn property(&self, path: &str) -> Result<PropertyModel> {
        let not_found = || DocumentError::PropertyNotFound(path.to_string());
        let mut segments = path.split('.');
        let last = segments.next_back().ok_or_else(not_found)?;

        let mut object = Rc::clone(&self.data);
        for segment in segments {
            let nested = match object.get(segment) {
                Some(PropertyValue::Object(nested)) => nested,
                _ => return Err(not_found()),
            };
            object = nested;
        }
        object.property(last).ok_or_else(not_found)
    }

    /// Writes through the property view at `path` and marks the document
    /// dirty.
    pub fn set_value(&self, path: &str, value: impl Into<PropertyValue>) -> Result<ChangeEvent> {
        let event = self.property(path)?.set_value(value)?;
        self.dirty.set(true);
        Ok(event)
    }

    pub fn validate(&self) -> ValidationReport {
        self.data.validate()
    }

    pub fn to_json_string(&self, indent: usize) -> Result<String> {
        Ok(self.data.to_json_string(indent)?)
    }

    /// Writes the document back to its file.
    ///
    /// Returns the validation report when `validate_on_save` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::ReadOnly`] for read-only documents and
    /// [`DocumentError::NotFileBacked`] for documents never saved.
    pub fn save(&mut self, config: &EditorConfig) -> Result<Option<ValidationReport>> {
        let path = self.path.clone().ok_or(DocumentError::NotFileBacked)?;
        if self.read_only {
            return Err(DocumentError::ReadOnly(path));
        }
        let mut text = self.to_json_string(config.indent)?;
        text.push('\n');
        std::fs::write(&path, text)?;
        self.dirty.set(false);
        info!(document = %path.display(), "saved document");

        Ok(config.validate_on_save.then(|| self.validate()))
    }

    /// Writes the document to `path`, which becomes its file.
    ///
    /// On failure the document keeps its previous file and read-only state.
    pub fn save_as(&mut self, path: impl AsRef<Path>, config: &EditorConfig) -> Result<Option<ValidationReport>> {
        let previous_path = self.path.replace(path.as_ref().to_path_buf());
        let previous_read_only = std::mem::replace(&mut self.read_only, false);
        let saved = self.save(config);
        if saved.is_err() {
            self.path = previous_path;
            self.read_only = previous_read_only;
        }
        saved
    }

    /// Writes a copy of the schema's source to `path`.
    pub fn save_schema_as(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self.schema.document().source())?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// File name, or [`UNTITLED`], with `*` appended when dirty.
    pub fn display_title(&self) -> String {
        let name = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string());
        if self.is_dirty() { format!("{name}*") } else { name }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("schema_source", &self.schema_source)
            .field("read_only", &self.read_only)
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
