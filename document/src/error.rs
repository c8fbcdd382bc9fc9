//! Error types for document operations.
//!
//! Covers every way opening, editing, or saving a document can fail: I/O,
//! serialization, schema compilation, model errors, and schema discovery.

use std::path::PathBuf;

use json_form_core::ModelError;
use json_form_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur while working with a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The companion schema could not be compiled.
    #[error("schema error: {0}")]
    SchemaError(#[from] SchemaError),

    /// Object model failure (e.g., the document root is not an object).
    #[error("model error: {0}")]
    ModelError(#[from] ModelError),

    /// Neither the default location nor `$schema` points at a schema file.
    #[error("no schema found for {}", .0.display())]
    SchemaNotFound(PathBuf),

    /// A dotted property path does not lead to a declared property.
    #[error("no property at path: {0}")]
    PropertyNotFound(String),

    /// Save was requested for a document that has never been written.
    #[error("document has no file path; use save-as")]
    NotFileBacked,

    /// Save was requested for a document opened read-only.
    #[error("document is read-only: {}", .0.display())]
    ReadOnly(PathBuf),
}

/// Convenience alias for results with [`DocumentError`].
pub type Result<T> = std::result::Result<T, DocumentError>;
