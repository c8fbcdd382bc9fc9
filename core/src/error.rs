//! Error types for object model operations.

use thiserror::Error;

/// Errors raised while building or mutating an object model.
///
/// Structural mismatches between data and schema are not errors: they
/// coerce to [`PropertyValue::Null`](crate::PropertyValue::Null).
#[derive(Debug, Error)]
pub enum ModelError {
    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A document root was expected to be a JSON object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(String),

    /// Write to a name the schema does not declare.
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// List position past the end.
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The background validation worker went away without a report.
    #[error("validation worker stopped before producing a report")]
    ValidationAborted,
}

/// Convenience alias for results with [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;
