//! Validation of JSON values against compiled schemas.
//!
//! Findings are collected as [`ValidationError`] values rather than returned
//! as `Err`. Combinator keywords (`allOf`, `anyOf`, `oneOf`) produce a single
//! composite error carrying the error collection of every child schema.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::node::{AdditionalProperties, NodeId};
use crate::schema::Schema;
use crate::types::{JsonType, format};

/// Category of a validation finding.
///
/// `Display` renders the variant name, which is what reports show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// The value matches none of several admitted types.
    NoTypeValidates,
    StringExpected,
    NumberExpected,
    IntegerExpected,
    BooleanExpected,
    ObjectExpected,
    ArrayExpected,
    NullExpected,
    NotInEnumeration,
    StringTooShort,
    StringTooLong,
    PatternMismatch,
    DateTimeExpected,
    DateExpected,
    TimeExpected,
    Base64Expected,
    NumberTooSmall,
    NumberTooBig,
    NumberNotMultipleOf,
    PropertyRequired,
    NoAdditionalPropertiesAllowed,
    TooFewItems,
    TooManyItems,
    ItemsNotUnique,
    NotAllOf,
    NotAnyOf,
    NotOneOf,
    ExcludedSchemaValidates,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors reported by one child schema of a composite error.
#[derive(Debug, Clone)]
pub struct ChildSchemaErrors {
    pub schema: Schema,
    pub errors: Vec<ValidationError>,
}

/// One validation finding.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {path}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Member name (or `name[index]` for array items) the error is about.
    pub property: Option<String>,
    /// Location of the offending value, e.g. `#/address/street` or `#/tags[1]`.
    pub path: String,
    /// Per-child-schema errors; non-empty only for composite kinds.
    pub children: Vec<ChildSchemaErrors>,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, property: Option<&str>, path: &str) -> Self {
        Self {
            kind,
            property: property.map(String::from),
            path: path.to_string(),
            children: Vec::new(),
        }
    }

    /// Returns `true` if this error carries nested child-schema errors.
    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }
}

pub(crate) fn validate(schema: &Schema, value: &Value) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_node(schema, value, None, "#", &mut errors);
    errors
}

fn validate_node(
    schema: &Schema,
    value: &Value,
    property: Option<&str>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let schema = schema.actual();
    let node = schema.node();

    if !node.types.matches(value) {
        errors.push(ValidationError::new(type_error(node.types), property, path));
        return;
    }

    if let Some(allowed) = &node.enumeration {
        if !allowed.contains(value) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NotInEnumeration,
                property,
                path,
            ));
        }
    }

    match value {
        Value::String(text) => validate_string(&schema, text, property, path, errors),
        Value::Number(number) => {
            if let Some(number) = number.as_f64() {
                validate_number(&schema, number, property, path, errors);
            }
        }
        Value::Object(map) => validate_object(&schema, map, path, errors),
        Value::Array(items) => validate_array(&schema, items, property, path, errors),
        Value::Null | Value::Bool(_) => {}
    }

    validate_combinators(&schema, value, property, path, errors);
}

fn type_error(types: JsonType) -> ValidationErrorKind {
    use ValidationErrorKind::*;

    if types == JsonType::STRING {
        StringExpected
    } else if types == JsonType::NUMBER {
        NumberExpected
    } else if types == JsonType::INTEGER {
        IntegerExpected
    } else if types == JsonType::BOOLEAN {
        BooleanExpected
    } else if types == JsonType::OBJECT {
        ObjectExpected
    } else if types == JsonType::ARRAY {
        ArrayExpected
    } else if types == JsonType::NULL {
        NullExpected
    } else {
        NoTypeValidates
    }
}

fn validate_string(
    schema: &Schema,
    text: &str,
    property: Option<&str>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let node = schema.node();
    let length = text.chars().count();

    if node.min_length.is_some_and(|min| length < min) {
        errors.push(ValidationError::new(ValidationErrorKind::StringTooShort, property, path));
    }
    if node.max_length.is_some_and(|max| length > max) {
        errors.push(ValidationError::new(ValidationErrorKind::StringTooLong, property, path));
    }
    if node.pattern.as_ref().is_some_and(|re| !re.is_match(text)) {
        errors.push(ValidationError::new(ValidationErrorKind::PatternMismatch, property, path));
    }

    let kind = match node.format.as_deref() {
        Some(format::DATE_TIME) if !is_date_time(text) => Some(ValidationErrorKind::DateTimeExpected),
        Some(format::DATE) if !is_date(text) => Some(ValidationErrorKind::DateExpected),
        Some(format::TIME) if !is_time(text) => Some(ValidationErrorKind::TimeExpected),
        Some(format::BYTE | format::BASE64) if STANDARD.decode(text).is_err() => {
            Some(ValidationErrorKind::Base64Expected)
        }
        _ => None,
    };
    if let Some(kind) = kind {
        errors.push(ValidationError::new(kind, property, path));
    }
}

fn is_date_time(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// Dates also accept a full timestamp, which is how date defaults are written.
fn is_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() || is_date_time(text)
}

/// Times accept a time of day or a `[-][d.]hh:mm:ss[.f]` duration.
fn is_time(text: &str) -> bool {
    if NaiveTime::parse_from_str(text, "%H:%M:%S%.f").is_ok() {
        return true;
    }
    let text = text.strip_prefix('-').unwrap_or(text);
    let clock = match text.split_once('.') {
        Some((days, rest)) if !days.is_empty() && days.bytes().all(|b| b.is_ascii_digit()) => rest,
        _ => text,
    };
    let clock = clock.split_once('.').map_or(clock, |(whole, _)| whole);
    let parts: Vec<&str> = clock.split(':').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit()))
}

fn validate_number(
    schema: &Schema,
    number: f64,
    property: Option<&str>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let node = schema.node();

    let too_small = node.minimum.is_some_and(|min| number < min)
        || node.exclusive_minimum.is_some_and(|min| number <= min);
    if too_small {
        errors.push(ValidationError::new(ValidationErrorKind::NumberTooSmall, property, path));
    }

    let too_big = node.maximum.is_some_and(|max| number > max)
        || node.exclusive_maximum.is_some_and(|max| number >= max);
    if too_big {
        errors.push(ValidationError::new(ValidationErrorKind::NumberTooBig, property, path));
    }

    if let Some(step) = node.multiple_of {
        let quotient = number / step;
        if (quotient - quotient.round()).abs() > 1e-9 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NumberNotMultipleOf,
                property,
                path,
            ));
        }
    }
}

fn validate_object(
    schema: &Schema,
    map: &Map<String, Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let properties = schema.properties();

    for declared in &properties {
        let name = declared.name();
        let member_path = format!("{path}/{name}");
        match map.get(name) {
            Some(member) => validate_node(declared.schema(), member, Some(name), &member_path, errors),
            None if declared.is_required() => errors.push(ValidationError::new(
                ValidationErrorKind::PropertyRequired,
                Some(name),
                &member_path,
            )),
            None => {}
        }
    }

    // `required` may name members that `properties` does not declare.
    for name in &schema.node().required {
        if map.contains_key(name) || properties.iter().any(|p| p.name() == name) {
            continue;
        }
        errors.push(ValidationError::new(
            ValidationErrorKind::PropertyRequired,
            Some(name),
            &format!("{path}/{name}"),
        ));
    }

    let additional = schema.node().additional_properties;
    if additional == AdditionalProperties::Allowed {
        return;
    }
    for (name, member) in map {
        if properties.iter().any(|p| p.name() == name) {
            continue;
        }
        let member_path = format!("{path}/{name}");
        match additional {
            AdditionalProperties::Denied => errors.push(ValidationError::new(
                ValidationErrorKind::NoAdditionalPropertiesAllowed,
                Some(name),
                &member_path,
            )),
            AdditionalProperties::Schema(id) => {
                let extra = child(schema, id);
                validate_node(&extra, member, Some(name), &member_path, errors);
            }
            AdditionalProperties::Allowed => {}
        }
    }
}

fn validate_array(
    schema: &Schema,
    items: &[Value],
    property: Option<&str>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let node = schema.node();

    if node.min_items.is_some_and(|min| items.len() < min) {
        errors.push(ValidationError::new(ValidationErrorKind::TooFewItems, property, path));
    }
    if node.max_items.is_some_and(|max| items.len() > max) {
        errors.push(ValidationError::new(ValidationErrorKind::TooManyItems, property, path));
    }
    if node.unique_items {
        let duplicated = items
            .iter()
            .enumerate()
            .any(|(i, item)| items[i + 1..].contains(item));
        if duplicated {
            errors.push(ValidationError::new(ValidationErrorKind::ItemsNotUnique, property, path));
        }
    }

    if let Some(item_schema) = schema.item() {
        for (index, item) in items.iter().enumerate() {
            let item_property = format!("{}[{index}]", property.unwrap_or_default());
            let item_path = format!("{path}[{index}]");
            validate_node(&item_schema, item, Some(&item_property), &item_path, errors);
        }
    }
}

fn validate_combinators(
    schema: &Schema,
    value: &Value,
    property: Option<&str>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let node = schema.node();

    if !node.all_of.is_empty() {
        let children = child_errors(schema, &node.all_of, value, property, path);
        if children.iter().any(|c| !c.errors.is_empty()) {
            errors.push(composite(ValidationErrorKind::NotAllOf, property, path, children));
        }
    }

    if !node.any_of.is_empty() {
        let children = child_errors(schema, &node.any_of, value, property, path);
        if children.iter().all(|c| !c.errors.is_empty()) {
            errors.push(composite(ValidationErrorKind::NotAnyOf, property, path, children));
        }
    }

    if !node.one_of.is_empty() {
        let children = child_errors(schema, &node.one_of, value, property, path);
        if children.iter().filter(|c| c.errors.is_empty()).count() != 1 {
            errors.push(composite(ValidationErrorKind::NotOneOf, property, path, children));
        }
    }

    if let Some(excluded) = node.not {
        let mut nested = Vec::new();
        validate_node(&child(schema, excluded), value, property, path, &mut nested);
        if nested.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::ExcludedSchemaValidates,
                property,
                path,
            ));
        }
    }
}

fn child_errors(
    schema: &Schema,
    ids: &[NodeId],
    value: &Value,
    property: Option<&str>,
    path: &str,
) -> Vec<ChildSchemaErrors> {
    ids.iter()
        .map(|id| {
            let child_schema = child(schema, *id).actual();
            let mut errors = Vec::new();
            validate_node(&child_schema, value, property, path, &mut errors);
            ChildSchemaErrors {
                schema: child_schema,
                errors,
            }
        })
        .collect()
}

fn child(schema: &Schema, id: NodeId) -> Schema {
    schema.at(id)
}

fn composite(
    kind: ValidationErrorKind,
    property: Option<&str>,
    path: &str,
    children: Vec<ChildSchemaErrors>,
) -> ValidationError {
    ValidationError {
        children,
        ..ValidationError::new(kind, property, path)
    }
}
