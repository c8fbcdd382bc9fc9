//! JSON Schema engine for schema-driven form models.
//!
//! This crate compiles JSON Schema documents into an immutable node arena and
//! exposes the per-node metadata a form model needs:
//!
//! - [`JsonSchema`]: a compiled document with every local `$ref` resolved
//!   eagerly; reference cycles are rejected at compile time.
//! - [`Schema`]: a cheap handle to one node. [`Schema::actual`] follows
//!   reference indirection, [`Schema::properties`] lists declared properties
//!   in declaration order with their required flag.
//! - [`JsonType`]: the type bitset, and [`format`] names.
//! - [`Schema::validate`]: validation producing [`ValidationError`] values,
//!   with composite errors for `allOf`/`anyOf`/`oneOf`.
//!
//! Only the keywords the model consumes and the common validation keywords
//! are understood; everything else is kept as extension data.
//!
//! # Example
//!
//! ```
//! use json_form_schema::{JsonSchema, JsonType};
//! use serde_json::json;
//!
//! let schema = JsonSchema::from_value(json!({
//!     "type": "object",
//!     "properties": {
//!         "payload": {"type": "string", "contentEncoding": "base64"},
//!         "owner": {"$ref": "#/definitions/Person"}
//!     },
//!     "definitions": {
//!         "Person": {"type": "object", "properties": {"name": {"type": "string"}}}
//!     }
//! })).unwrap();
//!
//! let owner = schema.property("owner").unwrap();
//! assert!(owner.actual().types().contains(JsonType::OBJECT));
//! assert_eq!(owner.actual().properties()[0].name(), "name");
//!
//! let payload = schema.property("payload").unwrap();
//! assert_eq!(payload.schema().extension("contentEncoding"), Some(&json!("base64")));
//! ```

mod compile;
mod error;
mod node;
mod schema;
mod types;
mod validator;

pub use error::{Result, SchemaError};
pub use node::{AdditionalProperties, NodeId, SchemaNode};
pub use schema::{JsonSchema, Property, Schema};
pub use types::{JsonType, format};
pub use validator::{ChildSchemaErrors, ValidationError, ValidationErrorKind};
