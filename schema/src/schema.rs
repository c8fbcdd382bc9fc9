//! Compiled schema documents and node handles.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::compile::Compiler;
use crate::error::Result;
use crate::node::{NodeId, SchemaNode};
use crate::types::JsonType;
use crate::validator::{self, ValidationError};

/// A compiled, reference-resolved JSON Schema document.
///
/// The document is immutable once compiled and is shared between handles
/// through an [`Arc`], so it can be handed to a background validator.
#[derive(Debug)]
pub struct JsonSchema {
    nodes: Vec<SchemaNode>,
    actual: Vec<NodeId>,
    root: NodeId,
    source: Value,
}

impl JsonSchema {
    /// Compiles a schema from a parsed JSON value and returns its root.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`](crate::SchemaError) if a schema location is
    /// malformed, a pattern does not compile, or a `$ref` cannot be resolved.
    pub fn from_value(source: Value) -> Result<Schema> {
        let compiled = Compiler::default().compile(&source)?;
        let document = Arc::new(Self {
            nodes: compiled.nodes,
            actual: compiled.actual,
            root: compiled.root,
            source,
        });
        let id = document.root;
        Ok(Schema { document, id })
    }

    /// Parses and compiles schema text.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_form_schema::{JsonSchema, JsonType};
    ///
    /// let schema = JsonSchema::parse(r#"{
    ///     "type": "object",
    ///     "required": ["name"],
    ///     "properties": {"name": {"type": "string"}}
    /// }"#).unwrap();
    ///
    /// let name = schema.property("name").unwrap();
    /// assert!(name.is_required());
    /// assert_eq!(name.actual().types(), JsonType::STRING);
    /// ```
    pub fn parse(text: &str) -> Result<Schema> {
        let source: Value = serde_json::from_str(text)?;
        Self::from_value(source)
    }

    /// Reads and compiles a schema file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Schema> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// A schema that admits any value and declares nothing.
    ///
    /// Stands in for a missing `items` schema.
    pub fn permissive() -> Schema {
        let node = SchemaNode {
            pointer: "#".to_string(),
            ..SchemaNode::default()
        };
        let document = Arc::new(Self {
            nodes: vec![node],
            actual: vec![NodeId(0)],
            root: NodeId(0),
            source: Value::Object(Map::new()),
        });
        Schema {
            document,
            id: NodeId(0),
        }
    }

    /// Returns the node stored at `id`.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Returns the number of compiled schema locations.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the document holds no nodes (never after compile).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The JSON the document was compiled from.
    pub fn source(&self) -> &Value {
        &self.source
    }
}

/// Handle to one node of a compiled [`JsonSchema`].
///
/// Cloning is cheap. Two handles are equal when they point at the same node
/// of the same document.
#[derive(Clone)]
pub struct Schema {
    document: Arc<JsonSchema>,
    id: NodeId,
}

impl Schema {
    pub(crate) fn at(&self, id: NodeId) -> Schema {
        Schema {
            document: Arc::clone(&self.document),
            id,
        }
    }

    /// The compiled document this node belongs to.
    pub fn document(&self) -> &Arc<JsonSchema> {
        &self.document
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The root node of the document.
    pub fn root(&self) -> Schema {
        self.at(self.document.root)
    }

    /// The raw compiled node, without reference resolution.
    pub fn node(&self) -> &SchemaNode {
        self.document.node(self.id)
    }

    /// Resolves `$ref` indirection to the node that actually describes the
    /// value.
    pub fn actual(&self) -> Schema {
        self.at(self.document.actual[self.id.0])
    }

    /// Returns `true` if this node is a `$ref` to another node.
    pub fn is_reference(&self) -> bool {
        self.document.actual[self.id.0] != self.id
    }

    pub fn pointer(&self) -> &str {
        &self.node().pointer
    }

    pub fn types(&self) -> JsonType {
        self.node().types
    }

    pub fn title(&self) -> Option<&str> {
        self.node().title.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.node().format.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.node().default.as_ref()
    }

    /// The array item schema, unresolved.
    pub fn item(&self) -> Option<Schema> {
        self.node().item.map(|id| self.at(id))
    }

    /// Looks up a vendor extension key such as `contentEncoding`.
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.node().extension_data.get(key)
    }

    /// Declared properties of the resolved node, in declaration order.
    pub fn properties(&self) -> Vec<Property> {
        let actual = self.actual();
        let node = actual.node();
        node.properties
            .iter()
            .map(|(name, id)| {
                let schema = actual.at(*id);
                let required = node.requires(name) || schema.node().required_flag;
                Property::new(name.clone(), schema, required)
            })
            .collect()
    }

    /// Looks up one declared property of the resolved node.
    pub fn property(&self, name: &str) -> Option<Property> {
        let actual = self.actual();
        let node = actual.node();
        let schema = actual.at(node.property(name)?);
        let required = node.requires(name) || schema.node().required_flag;
        Some(Property::new(name.to_string(), schema, required))
    }

    /// The source JSON of this node.
    pub fn to_value(&self) -> Option<&Value> {
        let pointer = self.pointer().strip_prefix('#').unwrap_or_default();
        self.document.source.pointer(pointer)
    }

    /// Validates `value` against this node.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_form_schema::{JsonSchema, ValidationErrorKind};
    /// use serde_json::json;
    ///
    /// let schema = JsonSchema::from_value(json!({
    ///     "type": "object",
    ///     "required": ["name"],
    ///     "properties": {"name": {"type": "string"}}
    /// })).unwrap();
    ///
    /// let errors = schema.validate(&json!({}));
    /// assert_eq!(errors.len(), 1);
    /// assert_eq!(errors[0].kind, ValidationErrorKind::PropertyRequired);
    /// assert_eq!(errors[0].path, "#/name");
    /// ```
    pub fn validate(&self, value: &Value) -> Vec<ValidationError> {
        validator::validate(self, value)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.document, &other.document) && self.id == other.id
    }
}

impl Eq for Schema {}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("pointer", &self.pointer())
            .field("types", &self.types())
            .finish()
    }
}

/// One declared property of an object schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    schema: Schema,
    required: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, schema: Schema, required: bool) -> Self {
        Self {
            name: name.into(),
            schema,
            required,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property's own schema node, possibly a `$ref`.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The property's schema with references resolved.
    pub fn actual(&self) -> Schema {
        self.schema.actual()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}
