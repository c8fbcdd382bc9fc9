//! Schema-driven, observable object model for editing JSON documents.
//!
//! This crate turns a JSON document and its [`json_form_schema`] schema into
//! a typed object graph that always has the schema's shape:
//!
//! - [`ObjectModel`]: an ordered map keyed by the schema's declared
//!   properties. Built from the schema alone ([`ObjectModel::from_schema`])
//!   or from JSON ([`ObjectModel::from_json`]), written back with
//!   [`ObjectModel::to_json`].
//! - [`TokenList`] / [`TokenModel`]: array items; each item knows the list
//!   it lives in through a weak back-reference.
//! - [`PropertyModel`]: a transient view of one property adding base64
//!   content encoding and change relaying.
//! - [`ValidationReport`]: validation results rendered as an indented error
//!   tree, computed synchronously or on the rayon pool.
//! - [`schema_property_path`] / [`default_schema_path`]: where a document's
//!   companion schema lives.
//!
//! Every mutation goes through [`ObjectModel::set`], which returns and
//! publishes one [`ChangeEvent`]; [`ObjectModel::revert`] undoes it.
//!
//! Models use `Rc`/`RefCell` and stay on the thread that built them. Only
//! JSON snapshots cross to the validation worker.
//!
//! # Example
//!
//! ```
//! use json_form_core::ObjectModel;
//! use json_form_schema::JsonSchema;
//! use serde_json::json;
//!
//! let schema = JsonSchema::from_value(json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {
//!         "name": {"type": "string", "minLength": 1},
//!         "tags": {"type": "array", "items": {"type": "string"}}
//!     }
//! })).unwrap();
//!
//! let model = ObjectModel::from_schema(&schema);
//! assert_eq!(model.to_json(), json!({"name": ""}));
//! assert_eq!(model.validate().text(), "#/name: StringTooShort");
//!
//! let name = model.property("name").unwrap();
//! let change = name.set_value("Bob").unwrap();
//! assert!(model.validate().is_valid());
//!
//! model.revert(&change).unwrap();
//! assert_eq!(model.get("name").unwrap().as_str(), Some(""));
//! ```

mod defaults;
mod error;
mod events;
mod object;
mod paths;
mod property;
mod token;
mod types;
mod validate;

pub use defaults::default_value;
pub use error::{ModelError, Result};
pub use events::{ChangeEvent, ChangeStream, ListChange, PropertyChange, Subscription};
pub use object::ObjectModel;
pub use paths::{SCHEMA_SUFFIX, companion_path, default_schema_path, schema_property_path};
pub use property::{CONTENT_ENCODING, PropertyModel};
pub use token::{Token, TokenList, TokenModel};
pub use types::{DATE_TIME_FORMAT, PropertyValue, Scalar};
pub use validate::{ValidationReport, ValidationTask, render_errors};
