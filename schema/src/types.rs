//! Type flags and well-known format names.

use bitflags::bitflags;
use serde_json::Value;

bitflags! {
    /// Set of JSON types a schema admits.
    ///
    /// An empty set ([`JsonType::NONE`]) means the schema does not constrain
    /// the type at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_form_schema::JsonType;
    /// use serde_json::json;
    ///
    /// let ty = JsonType::from_keyword(&json!(["string", "null"]));
    /// assert!(ty.contains(JsonType::STRING));
    /// assert!(ty.matches(&json!(null)));
    /// assert!(!ty.matches(&json!(3)));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct JsonType: u8 {
        const ARRAY = 1;
        const BOOLEAN = 1 << 1;
        const INTEGER = 1 << 2;
        const NULL = 1 << 3;
        const NUMBER = 1 << 4;
        const OBJECT = 1 << 5;
        const STRING = 1 << 6;
    }
}

impl JsonType {
    /// No type constraint.
    pub const NONE: Self = Self::empty();

    /// Maps a single JSON Schema type name to its flag.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "array" => Some(Self::ARRAY),
            "boolean" => Some(Self::BOOLEAN),
            "integer" => Some(Self::INTEGER),
            "null" => Some(Self::NULL),
            "number" => Some(Self::NUMBER),
            "object" => Some(Self::OBJECT),
            "string" => Some(Self::STRING),
            _ => None,
        }
    }

    /// Parses the value of a `type` keyword (a name or a list of names).
    ///
    /// Unknown names are ignored.
    pub fn from_keyword(value: &Value) -> Self {
        match value {
            Value::String(name) => Self::from_type_name(name).unwrap_or(Self::NONE),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .filter_map(Self::from_type_name)
                .fold(Self::NONE, |acc, ty| acc | ty),
            _ => Self::NONE,
        }
    }

    /// Returns the flag describing the shape of `value`.
    ///
    /// Integral numbers report [`JsonType::INTEGER`].
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::NULL,
            Value::Bool(_) => Self::BOOLEAN,
            Value::Number(n) if is_integral(n) => Self::INTEGER,
            Value::Number(_) => Self::NUMBER,
            Value::String(_) => Self::STRING,
            Value::Array(_) => Self::ARRAY,
            Value::Object(_) => Self::OBJECT,
        }
    }

    /// Returns `true` if `value` is admitted by this type set.
    ///
    /// An empty set admits everything; `number` admits integers.
    pub fn matches(self, value: &Value) -> bool {
        if self.is_empty() {
            return true;
        }
        let actual = Self::of(value);
        self.contains(actual) || (actual == Self::INTEGER && self.contains(Self::NUMBER))
    }
}

fn is_integral(number: &serde_json::Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return true;
    }
    number.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Well-known `format` values consumed by the form model and validator.
pub mod format {
    /// RFC 3339 timestamp.
    pub const DATE_TIME: &str = "date-time";
    /// Calendar date.
    pub const DATE: &str = "date";
    /// Time of day or duration.
    pub const TIME: &str = "time";
    /// Base64 encoded binary data.
    pub const BYTE: &str = "byte";
    /// Alias of [`BYTE`] used by some generators.
    pub const BASE64: &str = "base64";
}
