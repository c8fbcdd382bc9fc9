//! Per-property views over an object.

use std::fmt;
use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use json_form_schema::{JsonType, Property, Schema, format};
use tracing::debug;

use crate::error::Result;
use crate::events::{ChangeEvent, ChangeStream, PropertyChange, Subscription};
use crate::object::ObjectModel;
use crate::types::{PropertyValue, Scalar};

/// Extension key naming the transfer encoding of a string property.
pub const CONTENT_ENCODING: &str = "contentEncoding";

/// A view of one property of an [`ObjectModel`].
///
/// Views hold no state of their own and can be created and dropped freely.
/// While alive, a view re-publishes every change of its owner as
/// [`PropertyChange::Value`]; dropping it unsubscribes.
///
/// # Examples
///
/// ```
/// use json_form_core::ObjectModel;
/// use json_form_schema::JsonSchema;
/// use serde_json::json;
///
/// let schema = JsonSchema::from_value(json!({
///     "properties": {"blob": {"type": "string", "contentEncoding": "base64"}}
/// })).unwrap();
/// let model = ObjectModel::from_schema(&schema);
///
/// let blob = model.property("blob").unwrap();
/// blob.set_value("hello").unwrap();
/// assert_eq!(model.get("blob").unwrap().as_str(), Some("aGVsbG8="));
/// assert_eq!(blob.value().as_str(), Some("hello"));
/// ```
pub struct PropertyModel {
    property: Property,
    parent: Rc<ObjectModel>,
    changes: Rc<ChangeStream<PropertyChange>>,
    _owner: Subscription<ChangeEvent>,
}

impl PropertyModel {
    pub fn new(parent: Rc<ObjectModel>, property: Property) -> Self {
        let changes = Rc::new(ChangeStream::new());
        let stream = Rc::downgrade(&changes);
        let owner = parent.subscribe(move |_| {
            if let Some(stream) = stream.upgrade() {
                stream.emit(&PropertyChange::Value);
            }
        });
        Self {
            property,
            parent,
            changes,
            _owner: owner,
        }
    }

    pub fn name(&self) -> &str {
        self.property.name()
    }

    pub fn parent(&self) -> &Rc<ObjectModel> {
        &self.parent
    }

    /// The property's own schema node.
    pub fn schema(&self) -> &Schema {
        self.property.schema()
    }

    pub fn is_required(&self) -> bool {
        self.property.is_required()
    }

    /// The `contentEncoding` extension, if the schema sets one.
    pub fn content_encoding(&self) -> Option<String> {
        let own = self.property.schema().extension(CONTENT_ENCODING).cloned();
        let value = own.or_else(|| self.property.actual().extension(CONTENT_ENCODING).cloned())?;
        match value {
            serde_json::Value::String(text) => Some(text),
            other => Some(other.to_string()),
        }
    }

    /// Whether values are stored as base64 text.
    ///
    /// Only a plain `string` type qualifies; a nullable string does not.
    pub fn is_base64(&self) -> bool {
        let actual = self.property.actual();
        actual.types() == JsonType::STRING
            && (self.content_encoding().as_deref() == Some("base64")
                || actual.format() == Some(format::BYTE))
    }

    /// The current value, decoded when the property is base64.
    ///
    /// Stored text that is not valid base64 reads as `""`.
    pub fn value(&self) -> PropertyValue {
        let Some(stored) = self.parent.get(self.name()) else {
            return PropertyValue::Null;
        };
        if !self.is_base64() {
            return stored;
        }
        match stored {
            PropertyValue::Scalar(scalar) => decode(self.name(), &scalar).into(),
            other => other,
        }
    }

    /// Writes `value` into the owner, base64-encoding it when required.
    ///
    /// Publishes [`PropertyChange::Value`] then [`PropertyChange::HasValue`]
    /// and returns the owner's change record.
    pub fn set_value(&self, value: impl Into<PropertyValue>) -> Result<ChangeEvent> {
        let mut value = value.into();
        if self.is_base64() {
            if let PropertyValue::Scalar(scalar) = &value {
                value = encode(scalar).into();
            }
        }
        let event = self.parent.set(self.name(), value)?;
        self.changes.emit(&PropertyChange::Value);
        self.changes.emit(&PropertyChange::HasValue);
        Ok(event)
    }

    pub fn has_value(&self) -> bool {
        !self.value().is_null()
    }

    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&PropertyChange) + 'static) -> Subscription<PropertyChange> {
        self.changes.subscribe(listener)
    }
}

impl fmt::Debug for PropertyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyModel")
            .field("name", &self.name())
            .field("required", &self.is_required())
            .field("value", &self.value())
            .finish()
    }
}

fn encode(scalar: &Scalar) -> String {
    STANDARD.encode(scalar.to_string())
}

fn decode(name: &str, scalar: &Scalar) -> String {
    match STANDARD.decode(scalar.to_string()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            debug!(property = name, error = %err, "stored value is not base64; reading as empty");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use json_form_schema::JsonSchema;
    use serde_json::json;

    use super::*;

    fn model() -> Rc<ObjectModel> {
        let schema = JsonSchema::from_value(json!({
            "required": ["name"],
            "properties": {
                "name": {"type": "string"},
                "blob": {"type": "string", "format": "byte"},
                "note": {"type": "string", "contentEncoding": "base64"},
                "count": {"type": "integer", "contentEncoding": "base64"},
                "nullable": {"type": ["string", "null"], "contentEncoding": "base64"}
            }
        }))
        .unwrap();
        ObjectModel::from_value(&json!({"name": "Bob"}), &schema).unwrap()
    }

    #[test]
    fn test_base64_detection() {
        let model = model();
        assert!(!model.property("name").unwrap().is_base64());
        assert!(model.property("blob").unwrap().is_base64());
        assert!(model.property("note").unwrap().is_base64());
        assert!(!model.property("count").unwrap().is_base64());
        assert!(!model.property("nullable").unwrap().is_base64());
        assert_eq!(
            model.property("note").unwrap().content_encoding().as_deref(),
            Some("base64")
        );
        assert_eq!(model.property("name").unwrap().content_encoding(), None);
    }

    #[test]
    fn test_invalid_base64_reads_empty() {
        let model = model();
        let note = model.property("note").unwrap();
        model.set("note", "%%% not base64").unwrap();
        assert_eq!(note.value().as_str(), Some(""));
        assert!(note.has_value());
    }

    #[test]
    fn test_base64_null_stays_null() {
        let model = model();
        let blob = model.property("blob").unwrap();
        blob.set_value(PropertyValue::Null).unwrap();
        assert!(blob.value().is_null());
        assert!(!blob.has_value());
    }

    #[test]
    fn test_set_value_notifications() {
        let model = model();
        let name = model.property("name").unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let _sub = name.subscribe(move |change| sink.borrow_mut().push(*change));

        let event = name.set_value("Alice").unwrap();
        assert_eq!(event.property, "name");
        // The owner's change is relayed first, then the view's own pair.
        assert_eq!(
            *log.borrow(),
            [PropertyChange::Value, PropertyChange::Value, PropertyChange::HasValue]
        );
    }

    #[test]
    fn test_owner_changes_are_relayed() {
        let model = model();
        let name = model.property("name").unwrap();
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let _sub = name.subscribe(move |_| *sink.borrow_mut() += 1);

        model.set("count", 3_i64).unwrap();
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_dropped_view_unsubscribes() {
        let model = model();
        let view = model.property("name").unwrap();
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let _sub = view.subscribe(move |_| *sink.borrow_mut() += 1);

        drop(view);
        model.set("name", "Eve").unwrap();
        assert_eq!(*seen.borrow(), 0);
    }
}
