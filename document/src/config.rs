//! Editor configuration.
//!
//! Controls how documents are written and how their schemas are found.
//! Every section and field is optional in the file; missing values take
//! their defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! indent: 4
//! validate_on_save: true
//! schema:
//!   default_suffix: .schema.json
//!   use_schema_property: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use json_form_core::SCHEMA_SUFFIX;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How a document's schema is discovered.
///
/// # Examples
///
/// ```
/// # use json_form_document::SchemaDiscovery;
/// let discovery = SchemaDiscovery::default();
/// assert_eq!(discovery.default_suffix, ".schema.json");
/// assert!(discovery.use_schema_property);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDiscovery {
    /// Suffix replacing the document's extension to form the default
    /// schema location.
    pub default_suffix: String,
    /// Fall back to the document's `$schema` member.
    pub use_schema_property: bool,
}

impl Default for SchemaDiscovery {
    fn default() -> Self {
        Self {
            default_suffix: SCHEMA_SUFFIX.to_string(),
            use_schema_property: true,
        }
    }
}

/// Top-level editor configuration.
///
/// # Examples
///
/// ```no_run
/// use json_form_document::EditorConfig;
///
/// let config = EditorConfig::load("json-form.yml").unwrap();
/// println!("indenting with {} spaces", config.indent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Spaces per indentation level in saved documents; `0` writes compact
    /// JSON.
    pub indent: usize,
    /// Validate after every save and return the report.
    pub validate_on_save: bool,
    /// Schema discovery settings.
    pub schema: SchemaDiscovery,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            validate_on_save: false,
            schema: SchemaDiscovery::default(),
        }
    }
}

impl EditorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DocumentError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DocumentError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DocumentError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DocumentError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
