//! Value types held by the object model.
//!
//! A property of an [`ObjectModel`](crate::ObjectModel) holds a
//! [`PropertyValue`]: nothing, a [`Scalar`], a nested object, or an ordered
//! [`TokenList`](crate::TokenList). Scalars convert to and from raw JSON
//! values; date-time and duration scalars only arise from default synthesis
//! and serialize as strings.

use std::fmt;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::{Number, Value};

use crate::object::ObjectModel;
use crate::token::TokenList;

/// Layout used when writing [`Scalar::DateTime`] values.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A leaf value.
///
/// # Examples
///
/// ```
/// use json_form_core::Scalar;
/// use serde_json::json;
///
/// assert_eq!(Scalar::from_json(&json!("Bob")), Some(Scalar::from("Bob")));
/// assert_eq!(Scalar::from_json(&json!(null)), None);
/// assert_eq!(Scalar::zero_timestamp().to_json(), json!("0001-01-01T00:00:00"));
/// assert_eq!(Scalar::zero_duration().to_json(), json!("00:00:00"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(Number),
    String(String),
    /// Timestamp without offset.
    DateTime(NaiveDateTime),
    /// Time span, written as `[-][d.]hh:mm:ss[.fffffff]`.
    Duration(TimeDelta),
}

impl Scalar {
    /// The zero-valued timestamp, `0001-01-01T00:00:00`.
    pub fn zero_timestamp() -> Self {
        let zero = NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Scalar::DateTime(zero)
    }

    /// The zero-length duration, `00:00:00`.
    pub fn zero_duration() -> Self {
        Scalar::Duration(TimeDelta::zero())
    }

    /// Takes a raw JSON scalar as-is.
    ///
    /// Returns `None` for `null`, objects, and arrays.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::String(s) => Value::String(s.clone()),
            Scalar::DateTime(_) | Scalar::Duration(_) => Value::String(self.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
            Scalar::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
            Scalar::Duration(d) => f.write_str(&format_duration(*d)),
        }
    }
}

fn format_duration(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let duration = duration.abs();
    let total = duration.num_seconds();
    let (days, hours) = (total / 86_400, total / 3_600 % 24);
    let (minutes, seconds) = (total / 60 % 60, total % 60);
    let ticks = duration.subsec_nanos() / 100;

    let mut out = String::from(sign);
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if ticks > 0 {
        out.push_str(&format!(".{ticks:07}"));
    }
    out
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

/// The value stored under one property of an object.
///
/// `Object` and `Array` share their target; two values are equal when they
/// point at the same object or list.
#[derive(Debug, Clone, Default)]
pub enum PropertyValue {
    /// No value; optional properties absent from the source hold this.
    #[default]
    Null,
    Scalar(Scalar),
    Object(Rc<ObjectModel>),
    Array(Rc<TokenList>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            PropertyValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_object(&self) -> Option<&Rc<ObjectModel>> {
        match self {
            PropertyValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Rc<TokenList>> {
        match self {
            PropertyValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Serializes the value; nested objects and lists are written in full.
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Null => Value::Null,
            PropertyValue::Scalar(s) => s.to_json(),
            PropertyValue::Object(o) => o.to_json(),
            PropertyValue::Array(a) => a.to_json(),
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyValue::Null, PropertyValue::Null) => true,
            (PropertyValue::Scalar(a), PropertyValue::Scalar(b)) => a == b,
            (PropertyValue::Object(a), PropertyValue::Object(b)) => Rc::ptr_eq(a, b),
            (PropertyValue::Array(a), PropertyValue::Array(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Scalar> for PropertyValue {
    fn from(value: Scalar) -> Self {
        PropertyValue::Scalar(value)
    }
}

impl From<Option<Scalar>> for PropertyValue {
    fn from(value: Option<Scalar>) -> Self {
        value.map_or(PropertyValue::Null, PropertyValue::Scalar)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Scalar(value.into())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Scalar(value.into())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Scalar(value.into())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Scalar(value.into())
    }
}

impl From<Rc<ObjectModel>> for PropertyValue {
    fn from(value: Rc<ObjectModel>) -> Self {
        PropertyValue::Object(value)
    }
}

impl From<Rc<TokenList>> for PropertyValue {
    fn from(value: Rc<TokenList>) -> Self {
        PropertyValue::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scalar_from_json_keeps_raw_value() {
        assert_eq!(Scalar::from_json(&json!(true)), Some(Scalar::Bool(true)));
        assert_eq!(Scalar::from_json(&json!(2.5)).unwrap().to_json(), json!(2.5));
        assert_eq!(Scalar::from_json(&json!([1])), None);
        assert_eq!(Scalar::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_duration_layout() {
        assert_eq!(format_duration(TimeDelta::zero()), "00:00:00");
        assert_eq!(format_duration(TimeDelta::seconds(90_061)), "1.01:01:01");
        assert_eq!(format_duration(TimeDelta::seconds(-75)), "-00:01:15");
        assert_eq!(format_duration(TimeDelta::milliseconds(1_500)), "00:00:01.5000000");
    }

    #[test]
    fn test_property_value_conversions() {
        assert!(PropertyValue::from(None::<Scalar>).is_null());
        assert_eq!(PropertyValue::from("x").as_str(), Some("x"));
        assert_eq!(PropertyValue::from(3_i64).to_json(), json!(3));
        assert_eq!(PropertyValue::default(), PropertyValue::Null);
    }
}
