//! Error types for schema loading and reference resolution.

use thiserror::Error;

/// Errors that can occur while loading or compiling a JSON Schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The schema text is not valid JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A schema location holds something other than an object or boolean.
    #[error("invalid schema at {pointer}: {reason}")]
    InvalidSchema { pointer: String, reason: String },

    /// A `pattern` keyword does not compile as a regular expression.
    #[error("invalid pattern at {pointer}: {source}")]
    InvalidPattern {
        pointer: String,
        #[source]
        source: regex::Error,
    },

    /// A local `$ref` points at a location that is not a schema.
    #[error("unresolved reference '{reference}' at {pointer}")]
    UnresolvedReference { pointer: String, reference: String },

    /// A `$ref` points outside the document (remote or relative file).
    #[error("unsupported reference '{reference}' at {pointer}: only local references are resolved")]
    UnsupportedReference { pointer: String, reference: String },

    /// A chain of `$ref` indirections loops back on itself.
    #[error("reference cycle detected at {0}")]
    ReferenceCycle(String),
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
