//! Schema-typed objects.
//!
//! An [`ObjectModel`] is an ordered map whose keys are exactly the property
//! names its schema declares, in declaration order. It is built either from
//! the schema alone ([`ObjectModel::from_schema`]) or from a JSON object
//! read against the schema ([`ObjectModel::from_json`]), and written back
//! with [`ObjectModel::to_json`].
//!
//! Shapes that disagree with the schema never fail the build: a scalar where
//! an object or array was expected becomes [`PropertyValue::Null`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use json_form_schema::{JsonSchema, JsonType, NodeId, Property, Schema};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::defaults::default_value;
use crate::error::{ModelError, Result};
use crate::events::{ChangeEvent, ChangeStream, Subscription};
use crate::property::PropertyModel;
use crate::token::{Token, TokenList, TokenModel};
use crate::types::{PropertyValue, Scalar};

/// An ordered, schema-typed JSON object.
///
/// # Examples
///
/// ```
/// use json_form_core::ObjectModel;
/// use json_form_schema::JsonSchema;
/// use serde_json::json;
///
/// let schema = JsonSchema::from_value(json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {
///         "name": {"type": "string"},
///         "tags": {"type": "array", "items": {"type": "string"}}
///     }
/// })).unwrap();
///
/// let blank = ObjectModel::from_schema(&schema);
/// assert_eq!(blank.to_json(), json!({"name": ""}));
///
/// let bob = ObjectModel::from_value(&json!({"name": "Bob", "tags": ["a", "b"]}), &schema).unwrap();
/// let tags = bob.get("tags").unwrap();
/// let second = tags.as_array().unwrap().get(1).unwrap();
/// assert_eq!(second.ordinal(), Some(2));
/// ```
pub struct ObjectModel {
    schema: Schema,
    properties: Vec<Property>,
    values: RefCell<Vec<PropertyValue>>,
    changes: ChangeStream<ChangeEvent>,
}

impl ObjectModel {
    fn with_values(schema: Schema, properties: Vec<Property>, values: Vec<PropertyValue>) -> Rc<Self> {
        Rc::new(Self {
            schema,
            properties,
            values: RefCell::new(values),
            changes: ChangeStream::new(),
        })
    }

    /// Synthesizes a default-valued object for `schema`.
    ///
    /// Required nested objects are built recursively and required arrays
    /// start empty; optional objects and arrays are `Null`; scalars get
    /// their [default](crate::default_value).
    pub fn from_schema(schema: &Schema) -> Rc<Self> {
        build_default(&schema.actual(), &mut Vec::new())
    }

    /// Reads `raw` against `schema`. Members the schema does not declare are
    /// dropped.
    pub fn from_json(raw: &Map<String, Value>, schema: &Schema) -> Rc<Self> {
        let schema = schema.actual();
        let properties = schema.properties();
        let values = properties
            .iter()
            .map(|property| value_from_json(property, raw.get(property.name())))
            .collect();
        Self::with_values(schema, properties, values)
    }

    /// Like [`from_json`](Self::from_json) for any JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotAnObject`] if `raw` is not a JSON object.
    pub fn from_value(raw: &Value, schema: &Schema) -> Result<Rc<Self>> {
        match raw {
            Value::Object(map) => Ok(Self::from_json(map, schema)),
            other => Err(ModelError::NotAnObject(json_kind(other).to_string())),
        }
    }

    /// Parses document text and reads it against `schema`.
    pub fn from_json_str(text: &str, schema: &Schema) -> Result<Rc<Self>> {
        let raw: Value = serde_json::from_str(text)?;
        Self::from_value(&raw, schema)
    }

    /// The resolved schema this object is typed by.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Declared properties, in declaration order.
    pub fn declared(&self) -> &[Property] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<PropertyValue> {
        let index = self.position(name)?;
        self.values.borrow().get(index).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(Property::name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Snapshot of every `(name, value)` pair in declaration order.
    pub fn entries(&self) -> Vec<(String, PropertyValue)> {
        let values = self.values.borrow();
        self.properties
            .iter()
            .zip(values.iter())
            .map(|(property, value)| (property.name().to_string(), value.clone()))
            .collect()
    }

    /// Stores `value` under `name` and publishes the change.
    ///
    /// The returned event is the undo record for this write; passing it to
    /// [`revert`](Self::revert) restores the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownProperty`] if the schema does not declare
    /// `name`.
    pub fn set(&self, name: &str, value: impl Into<PropertyValue>) -> Result<ChangeEvent> {
        let index = self
            .position(name)
            .ok_or_else(|| ModelError::UnknownProperty(name.to_string()))?;
        let new_value = value.into();
        let old_value = {
            let mut values = self.values.borrow_mut();
            std::mem::replace(&mut values[index], new_value.clone())
        };
        let event = ChangeEvent {
            property: name.to_string(),
            old_value,
            new_value,
        };
        self.changes.emit(&event);
        Ok(event)
    }

    /// Undoes `event` with a single new write.
    pub fn revert(&self, event: &ChangeEvent) -> Result<ChangeEvent> {
        self.set(&event.property, event.old_value.clone())
    }

    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&ChangeEvent) + 'static) -> Subscription<ChangeEvent> {
        self.changes.subscribe(listener)
    }

    /// One view per declared property.
    pub fn properties(self: &Rc<Self>) -> Vec<PropertyModel> {
        self.properties
            .iter()
            .map(|property| PropertyModel::new(Rc::clone(self), property.clone()))
            .collect()
    }

    pub fn property(self: &Rc<Self>, name: &str) -> Option<PropertyModel> {
        let property = self.properties.iter().find(|p| p.name() == name)?;
        Some(PropertyModel::new(Rc::clone(self), property.clone()))
    }

    /// Serializes the object in declaration order.
    ///
    /// Optional properties holding `Null` are omitted; required ones are
    /// written as `null`.
    pub fn to_json(&self) -> Value {
        let values = self.values.borrow();
        let mut map = Map::new();
        for (property, value) in self.properties.iter().zip(values.iter()) {
            if value.is_null() && !property.is_required() {
                continue;
            }
            map.insert(property.name().to_string(), value.to_json());
        }
        Value::Object(map)
    }

    /// Serializes to text; `indent` spaces per level, or compact when zero.
    pub fn to_json_string(&self, indent: usize) -> Result<String> {
        let value = self.to_json();
        if indent == 0 {
            return Ok(serde_json::to_string(&value)?);
        }
        let indent = " ".repeat(indent);
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        value.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name() == name)
    }
}

impl fmt::Debug for ObjectModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.borrow();
        f.debug_map()
            .entries(self.properties.iter().map(Property::name).zip(values.iter()))
            .finish()
    }
}

/// `ancestors` holds the schemas currently being synthesized, so a required
/// property that refers back to one of them stops the recursion.
fn build_default(schema: &Schema, ancestors: &mut Vec<NodeId>) -> Rc<ObjectModel> {
    ancestors.push(schema.id());
    let properties = schema.properties();
    let values = properties
        .iter()
        .map(|property| {
            let actual = property.actual();
            let types = actual.types();
            if types.contains(JsonType::OBJECT) {
                if !property.is_required() {
                    PropertyValue::Null
                } else if ancestors.contains(&actual.id()) {
                    warn!(property = property.name(), "required property is recursive; leaving it null");
                    PropertyValue::Null
                } else {
                    PropertyValue::Object(build_default(&actual, ancestors))
                }
            } else if types.contains(JsonType::ARRAY) {
                if property.is_required() {
                    PropertyValue::Array(TokenList::new())
                } else {
                    PropertyValue::Null
                }
            } else {
                default_value(property)
            }
        })
        .collect();
    ancestors.pop();
    ObjectModel::with_values(schema.clone(), properties, values)
}

fn value_from_json(property: &Property, raw: Option<&Value>) -> PropertyValue {
    let actual = property.actual();
    let types = actual.types();
    let name = property.name();

    if types.contains(JsonType::ARRAY) {
        return match raw {
            Some(Value::Array(items)) => {
                PropertyValue::Array(tokens_from_json(items, &item_schema(&actual)))
            }
            Some(other) => {
                debug!(property = name, found = json_kind(other), "expected an array; using null");
                PropertyValue::Null
            }
            None => PropertyValue::Null,
        };
    }

    if types.contains(JsonType::OBJECT) || types.is_empty() {
        return match raw {
            Some(Value::Object(map)) => PropertyValue::Object(ObjectModel::from_json(map, &actual)),
            Some(Value::Null) | None => PropertyValue::Null,
            Some(other) => {
                debug!(property = name, found = json_kind(other), "expected an object; using null");
                PropertyValue::Null
            }
        };
    }

    match raw {
        Some(value @ (Value::Object(_) | Value::Array(_))) => {
            debug!(property = name, found = json_kind(value), "expected a scalar; using null");
            PropertyValue::Null
        }
        Some(value) => Scalar::from_json(value).into(),
        None => default_value(property),
    }
}

fn tokens_from_json(items: &[Value], item: &Schema) -> Rc<TokenList> {
    let tokens = items
        .iter()
        .map(|raw| {
            let token = match raw {
                Value::Object(map) => Token::Object(ObjectModel::from_json(map, item)),
                Value::Array(nested) => Token::Array(tokens_from_json(nested, &item_schema(&item.actual()))),
                scalar => Token::Value(Scalar::from_json(scalar)),
            };
            TokenModel::new(token, Some(item.clone()))
        })
        .collect();
    TokenList::from_items(tokens)
}

fn item_schema(array: &Schema) -> Schema {
    array.item().unwrap_or_else(JsonSchema::permissive)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;

    fn person() -> Schema {
        JsonSchema::from_value(json!({
            "type": "object",
            "required": ["name", "address", "aliases"],
            "properties": {
                "name": {"type": "string"},
                "active": {"type": "boolean", "default": true},
                "address": {
                    "type": "object",
                    "required": ["city"],
                    "properties": {"city": {"type": "string"}, "zip": {"type": "string"}}
                },
                "employer": {"type": "object", "properties": {"name": {"type": "string"}}},
                "aliases": {"type": "array", "items": {"type": "string"}},
                "notes": {"type": "array"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_from_schema_fills_required_structure() {
        let model = ObjectModel::from_schema(&person());
        assert_eq!(
            model.keys().collect::<Vec<_>>(),
            ["name", "active", "address", "employer", "aliases", "notes"]
        );
        assert!(model.get("employer").unwrap().is_null());
        assert!(model.get("notes").unwrap().is_null());
        assert!(model.get("aliases").unwrap().as_array().unwrap().is_empty());
        assert_eq!(
            model.to_json(),
            json!({
                "name": "",
                "active": true,
                "address": {"city": "", "zip": ""},
                "aliases": []
            })
        );
    }

    #[test]
    fn test_from_json_coerces_mismatched_shapes() {
        let raw = json!({
            "name": {"first": "Bob"},
            "address": "Main Street",
            "aliases": "bobby",
            "notes": null,
            "extra": 1
        });
        let model = ObjectModel::from_value(&raw, &person()).unwrap();
        assert!(model.get("name").unwrap().is_null());
        assert!(model.get("address").unwrap().is_null());
        assert!(model.get("aliases").unwrap().is_null());
        assert!(model.get("notes").unwrap().is_null());
        assert!(!model.contains("extra"));
        assert_eq!(model.get("active").unwrap(), PropertyValue::from(true));
    }

    #[test]
    fn test_required_null_is_written() {
        let model = ObjectModel::from_value(&json!({"name": null}), &person()).unwrap();
        let out = model.to_json();
        assert_eq!(out["name"], Value::Null);
        assert!(out.get("address").is_some_and(Value::is_null));
        assert!(out.get("employer").is_none());
    }

    #[test]
    fn test_untyped_property_keeps_objects_only() {
        let schema = JsonSchema::from_value(json!({"properties": {"any": {}}})).unwrap();
        let nested = ObjectModel::from_value(&json!({"any": {"x": 1}}), &schema).unwrap();
        assert!(nested.get("any").unwrap().as_object().is_some());

        let scalar = ObjectModel::from_value(&json!({"any": 5}), &schema).unwrap();
        assert!(scalar.get("any").unwrap().is_null());
    }

    #[test]
    fn test_array_items_keep_item_schema() {
        let schema = JsonSchema::from_value(json!({
            "properties": {
                "points": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"x": {"type": "integer"}}}
                },
                "matrix": {"type": "array", "items": {"type": "array", "items": {"type": "number"}}},
                "loose": {"type": "array"}
            }
        }))
        .unwrap();
        let raw = json!({
            "points": [{"x": 1, "y": 2}],
            "matrix": [[1, 2], [3]],
            "loose": [{"k": "v"}, 3]
        });
        let model = ObjectModel::from_value(&raw, &schema).unwrap();

        let points = model.get("points").unwrap();
        let first = points.as_array().unwrap().get(0).unwrap();
        assert!(first.schema().is_some_and(|s| s.types() == JsonType::OBJECT));
        assert_eq!(first.to_json(), json!({"x": 1}));

        assert_eq!(model.to_json()["matrix"], json!([[1, 2], [3]]));
        assert_eq!(model.to_json()["loose"], json!([{}, 3]));
    }

    #[test]
    fn test_set_emits_and_reverts() {
        let model = ObjectModel::from_schema(&person());
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let _sub = model.subscribe(move |_| sink.set(sink.get() + 1));

        let event = model.set("name", "Alice").unwrap();
        assert_eq!(event.old_value.as_str(), Some(""));
        assert_eq!(event.new_value.as_str(), Some("Alice"));

        model.revert(&event).unwrap();
        assert_eq!(model.get("name").unwrap().as_str(), Some(""));
        assert_eq!(count.get(), 2);

        let err = model.set("nickname", "Al").unwrap_err();
        assert!(matches!(err, ModelError::UnknownProperty(name) if name == "nickname"));
    }

    #[test]
    fn test_recursive_required_property_stops() {
        let schema = JsonSchema::from_value(json!({
            "type": "object",
            "required": ["child"],
            "properties": {"label": {"type": "string"}, "child": {"$ref": "#"}}
        }))
        .unwrap();
        let model = ObjectModel::from_schema(&schema);
        assert_eq!(model.to_json(), json!({"label": "", "child": null}));
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let err = ObjectModel::from_json_str("[1, 2]", &person()).unwrap_err();
        assert!(matches!(err, ModelError::NotAnObject(kind) if kind == "array"));
        assert!(matches!(
            ObjectModel::from_json_str("{", &person()),
            Err(ModelError::JsonError(_))
        ));
    }

    #[test]
    fn test_to_json_string_indent() {
        let schema = JsonSchema::from_value(json!({
            "required": ["a"],
            "properties": {"a": {"type": "integer", "default": 1}}
        }))
        .unwrap();
        let model = ObjectModel::from_schema(&schema);
        assert_eq!(model.to_json_string(0).unwrap(), r#"{"a":1}"#);
        assert_eq!(model.to_json_string(4).unwrap(), "{\n    \"a\": 1\n}");
    }
}
