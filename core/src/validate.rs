//! Validation of object models and error-tree reports.
//!
//! Validation always runs against a JSON snapshot taken on the calling
//! thread, so a background run never observes a half-applied mutation.
//! Composite errors (`allOf`/`anyOf`/`oneOf`) are flattened into an indented
//! text tree:
//!
//! ```text
//! #/name: StringExpected
//! #/contact: NotOneOf
//!   Email:
//!     #/contact/email: PropertyRequired
//!   Schema:
//!     #/contact/phone: PropertyRequired
//! ```

use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use json_form_schema::ValidationError;
use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::object::ObjectModel;

/// Outcome of one validation run.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
    text: String,
}

impl ValidationReport {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        let text = render_errors(&errors, "").join("\n");
        Self { errors, text }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The rendered tree; empty for a valid document.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Renders `errors` one line each, prefixed with `padding`.
///
/// Each composite error is followed by one heading per child schema (its
/// title, or `Schema`) and that schema's errors four spaces deeper.
///
/// # Examples
///
/// ```
/// use json_form_core::render_errors;
/// use json_form_schema::JsonSchema;
/// use serde_json::json;
///
/// let schema = JsonSchema::from_value(json!({
///     "anyOf": [{"title": "Text", "type": "string"}, {"type": "integer"}]
/// })).unwrap();
/// let errors = schema.validate(&json!(true));
///
/// assert_eq!(render_errors(&errors, ""), [
///     "#: NotAnyOf",
///     "  Text:",
///     "    #: StringExpected",
///     "  Schema:",
///     "    #: IntegerExpected",
/// ]);
/// ```
pub fn render_errors(errors: &[ValidationError], padding: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for error in errors {
        lines.push(format!("{padding}{}: {}", error.path, error.kind));
        for child in &error.children {
            let title = child.schema.title().unwrap_or("Schema");
            lines.push(format!("{padding}  {title}:"));
            lines.extend(render_errors(&child.errors, &format!("{padding}    ")));
        }
    }
    lines
}

/// A validation running on the rayon pool.
#[derive(Debug)]
pub struct ValidationTask {
    receiver: Receiver<ValidationReport>,
}

impl ValidationTask {
    /// Blocks until the report is ready.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ValidationAborted`] if the worker stopped
    /// without sending a report.
    pub fn wait(self) -> Result<ValidationReport> {
        self.receiver.recv().map_err(|_| ModelError::ValidationAborted)
    }

    /// Returns the report if it is already available.
    pub fn try_take(&self) -> Result<Option<ValidationReport>> {
        match self.receiver.try_recv() {
            Ok(report) => Ok(Some(report)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ModelError::ValidationAborted),
        }
    }
}

impl ObjectModel {
    /// Validates the current state on the calling thread.
    pub fn validate(&self) -> ValidationReport {
        let report = ValidationReport::new(self.schema().validate(&self.to_json()));
        debug!(errors = report.errors().len(), "validated document");
        report
    }

    /// Snapshots the current state and validates it in the background.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_form_core::ObjectModel;
    /// use json_form_schema::JsonSchema;
    /// use serde_json::json;
    ///
    /// let schema = JsonSchema::from_value(json!({
    ///     "required": ["age"],
    ///     "properties": {"age": {"type": "integer", "minimum": 0}}
    /// })).unwrap();
    /// let model = ObjectModel::from_value(&json!({"age": -1}), &schema).unwrap();
    ///
    /// let task = model.validate_async();
    /// model.set("age", 30_i64).unwrap();
    ///
    /// let report = task.wait().unwrap();
    /// assert_eq!(report.text(), "#/age: NumberTooSmall");
    /// ```
    pub fn validate_async(&self) -> ValidationTask {
        let snapshot = self.to_json();
        let schema = self.schema().clone();
        let (sender, receiver) = mpsc::channel();
        rayon::spawn(move || {
            let report = ValidationReport::new(schema.validate(&snapshot));
            info!(errors = report.errors().len(), "background validation finished");
            // The caller may have dropped the task.
            let _ = sender.send(report);
        });
        ValidationTask { receiver }
    }
}
