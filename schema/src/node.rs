//! Compiled schema nodes.
//!
//! A [`SchemaNode`] is one schema location of a compiled document. Child
//! schemas are referenced by [`NodeId`] into the owning
//! [`JsonSchema`](crate::JsonSchema) arena, which lets recursive schemas
//! point back at their ancestors without reference-counted cycles.

use regex::Regex;
use serde_json::{Map, Value};

use crate::JsonType;

/// Index of a node inside its compiled [`JsonSchema`](crate::JsonSchema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// How an object schema treats members it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdditionalProperties {
    /// Undeclared members are accepted (the default).
    #[default]
    Allowed,
    /// `additionalProperties: false`.
    Denied,
    /// Undeclared members must match the given schema.
    Schema(NodeId),
}

/// One compiled schema location.
///
/// Fields mirror the keywords the form model and validator consume. Keys
/// that are not keywords are kept verbatim in
/// [`extension_data`](SchemaNode::extension_data).
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    /// JSON pointer of this node inside the document (e.g. `#/properties/name`).
    pub pointer: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Admitted types; empty when `type` is absent.
    pub types: JsonType,
    pub format: Option<String>,
    /// Raw `default` value.
    pub default: Option<Value>,
    /// Declared properties in declaration order.
    pub properties: Vec<(String, NodeId)>,
    /// Names listed in the `required` array.
    pub required: Vec<String>,
    /// Draft 3 style `"required": true` on the property schema itself.
    pub required_flag: bool,
    /// Array item schema (first entry for tuple-style `items`).
    pub item: Option<NodeId>,
    /// Raw `$ref` text.
    pub reference: Option<String>,
    pub enumeration: Option<Vec<Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
    pub additional_properties: AdditionalProperties,
    pub all_of: Vec<NodeId>,
    pub any_of: Vec<NodeId>,
    pub one_of: Vec<NodeId>,
    pub not: Option<NodeId>,
    /// `definitions` / `$defs` entries.
    pub definitions: Vec<(String, NodeId)>,
    /// Vendor keys such as `contentEncoding`.
    pub extension_data: Map<String, Value>,
}

impl SchemaNode {
    /// Looks up a declared property by name.
    pub fn property(&self, name: &str) -> Option<NodeId> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, id)| *id)
    }

    /// Returns `true` if `name` appears in this node's `required` array.
    pub fn requires(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}
