//! Default values for scalar properties with no source data.

use json_form_schema::{JsonType, Property, format};
use serde_json::Value;
use tracing::warn;

use crate::types::{PropertyValue, Scalar};

/// Synthesizes the value a scalar property starts with.
///
/// Checked in order: the explicit `default`, then `false` for booleans, the
/// zero timestamp for `date-time` and `date` strings, the zero duration for
/// `time` strings, `""` for other strings, and `Null` for everything else.
///
/// # Examples
///
/// ```
/// use json_form_core::{PropertyValue, Scalar, default_value};
/// use json_form_schema::JsonSchema;
/// use serde_json::json;
///
/// let schema = JsonSchema::from_value(json!({
///     "properties": {
///         "active": {"type": "boolean"},
///         "created": {"type": "string", "format": "date-time"},
///         "count": {"type": "integer"}
///     }
/// })).unwrap();
///
/// let value = |name| default_value(&schema.property(name).unwrap());
/// assert_eq!(value("active"), PropertyValue::from(false));
/// assert_eq!(value("created"), PropertyValue::Scalar(Scalar::zero_timestamp()));
/// assert_eq!(value("count"), PropertyValue::Null);
/// ```
pub fn default_value(property: &Property) -> PropertyValue {
    let actual = property.actual();
    let explicit = property
        .schema()
        .default_value()
        .or_else(|| actual.default_value());

    if let Some(default) = explicit {
        return explicit_default(property.name(), default);
    }

    let types = actual.types();
    if types.contains(JsonType::BOOLEAN) {
        return false.into();
    }
    if types.contains(JsonType::STRING) {
        return match actual.format() {
            Some(format::DATE_TIME | format::DATE) => Scalar::zero_timestamp().into(),
            Some(format::TIME) => Scalar::zero_duration().into(),
            _ => "".into(),
        };
    }
    PropertyValue::Null
}

fn explicit_default(name: &str, default: &Value) -> PropertyValue {
    match default {
        Value::Object(_) | Value::Array(_) => {
            warn!(property = name, "ignoring compound default for scalar property");
            PropertyValue::Null
        }
        other => Scalar::from_json(other).into(),
    }
}
