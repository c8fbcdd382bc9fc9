//! Document lifecycle for schema-driven JSON editing.
//!
//! This crate ties a document file to its schema and object model:
//!
//! - [`Document`]: open, create, edit through dotted property paths, and
//!   save, with dirty and read-only tracking.
//! - [`locate_schema`]: finds a document's schema at the default
//!   `<stem>.schema.json` location or through its `$schema` member.
//! - [`EditorConfig`]: YAML configuration for indentation, validation on
//!   save, and schema discovery.
//!
//! # Quick start
//!
//! ```no_run
//! use json_form_document::{Document, EditorConfig};
//!
//! let config = EditorConfig::load("json-form.yml").unwrap_or_default();
//! let mut doc = Document::open("settings.json", &config).unwrap();
//! println!("{} uses {}", doc.display_title(), doc.schema_source());
//!
//! doc.set_value("name", "production").unwrap();
//! if let Some(report) = doc.save(&config).unwrap() {
//!     println!("{report}");
//! }
//! ```

mod config;
mod document;
mod error;
mod loader;

pub use config::{EditorConfig, SchemaDiscovery};
pub use document::{Document, UNTITLED};
pub use error::{DocumentError, Result};
pub use loader::{SchemaSource, locate_schema};
