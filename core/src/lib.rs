#![deny(missing_docs)]

//! # API Model Core
//!
//! Turns parsed JSON payloads into schema-aware, read-only models.
//!
//! ```
//! use apimodel_core::Model;
//! use serde_json::json;
//!
//! let book = Model::from_json(json!({"bookTitle": "Dune"})).unwrap();
//! assert_eq!(book.resolve("book_title").unwrap().as_str(), Some("Dune"));
//! assert!(book.get("book_title").is_none());
//! ```

/// Shared error types.
pub mod error;

/// Property name normalization.
pub mod inflector;

/// Schema lookup contracts and the OpenAPI implementation.
pub mod schema;

/// Cast attribute values.
pub mod value;

/// Models and their shapes.
pub mod model;

/// Recursive model construction.
pub mod builder;

/// Shape caching by component name.
pub mod registry;

pub use builder::ObjectBuilder;
pub use error::{ModelError, ModelResult};
pub use inflector::{default_inflector, Inflector, InflectorConfig, SnakeCaseInflector};
pub use model::{Model, ModelShape, ANONYMOUS_MODEL};
pub use registry::ShapeRegistry;
pub use schema::{ComponentRef, OpenApiSchema, Schema};
pub use value::Value;
