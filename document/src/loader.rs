//! Schema discovery for documents.
//!
//! A document's schema is looked up in order:
//!
//! 1. the default location, `<dir>/<stem>.schema.json` (suffix configurable
//!    through [`SchemaDiscovery`](crate::SchemaDiscovery));
//! 2. the document's `$schema` member, resolved against its directory.
//!
//! Callers that already know the schema use [`SchemaSource::Explicit`].

use std::fmt;
use std::path::{Path, PathBuf};

use json_form_core::{companion_path, schema_property_path};
use serde_json::Value;
use tracing::debug;

use crate::config::EditorConfig;
use crate::error::{DocumentError, Result};

/// Describes where a document's schema was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Given by the caller.
    Explicit(PathBuf),
    /// Found next to the document under the default name.
    DefaultLocation(PathBuf),
    /// Named by the document's `$schema` member.
    SchemaProperty(PathBuf),
}

impl SchemaSource {
    pub fn path(&self) -> &Path {
        match self {
            SchemaSource::Explicit(path)
            | SchemaSource::DefaultLocation(path)
            | SchemaSource::SchemaProperty(path) => path,
        }
    }

    /// Short label for how the schema was found.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaSource::Explicit(_) => "explicit",
            SchemaSource::DefaultLocation(_) => "default location",
            SchemaSource::SchemaProperty(_) => "$schema property",
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path().display(), self.kind())
    }
}

/// Finds the schema for the document at `document` whose parsed content is
/// `data`.
///
/// Only candidates that exist on disk are accepted.
///
/// # Errors
///
/// Returns [`DocumentError::SchemaNotFound`] when no candidate exists.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use json_form_document::{EditorConfig, locate_schema};
/// use serde_json::json;
///
/// let source = locate_schema(
///     Path::new("data/person.json"),
///     &json!({"$schema": "schemas/person.json"}),
///     &EditorConfig::default(),
/// ).unwrap();
/// println!("using {source}");
/// ```
pub fn locate_schema(document: &Path, data: &Value, config: &EditorConfig) -> Result<SchemaSource> {
    let default = companion_path(document, &config.schema.default_suffix);
    if default.is_file() {
        debug!(schema = %default.display(), "found schema at default location");
        return Ok(SchemaSource::DefaultLocation(default));
    }
    debug!(candidate = %default.display(), "no schema at default location");

    if config.schema.use_schema_property {
        if let Some(candidate) = schema_property_path(document, data) {
            if candidate.is_file() {
                debug!(schema = %candidate.display(), "found schema through $schema");
                return Ok(SchemaSource::SchemaProperty(candidate));
            }
            debug!(candidate = %candidate.display(), "$schema names a missing file");
        }
    }

    Err(DocumentError::SchemaNotFound(document.to_path_buf()))
}
