#![deny(missing_docs)]

//! # Object Builder
//!
//! Recursively turns parsed payload values into model trees.
//!
//! - arrays become [`Value::List`], each element built on its own
//! - objects become [`Value::Model`] bound to the builder's schema and inflector
//! - scalars and `null` are returned unchanged

use crate::error::ModelResult;
use crate::inflector::Inflector;
use crate::model::{Model, ModelShape, ANONYMOUS_MODEL};
use crate::registry::ShapeRegistry;
use crate::schema::Schema;
use crate::value::Value;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// One-shot builder for a raw value described by `schema`.
pub struct ObjectBuilder {
    schema: Arc<dyn Schema>,
    inflector: Arc<dyn Inflector>,
    registry: Option<Arc<ShapeRegistry>>,
}

impl ObjectBuilder {
    /// Creates a builder without a shape registry.
    pub fn new(schema: Arc<dyn Schema>, inflector: Arc<dyn Inflector>) -> Self {
        Self {
            schema,
            inflector,
            registry: None,
        }
    }

    /// Reuses shapes from `registry` for named schemas.
    pub fn with_registry(mut self, registry: Option<Arc<ShapeRegistry>>) -> Self {
        self.registry = registry;
        self
    }

    /// Builds `raw`.
    ///
    /// Array elements use the schema's item schema when it has one, otherwise the
    /// same schema. Failures in nested models surface here.
    pub fn call(&self, raw: JsonValue) -> ModelResult<Value> {
        match raw {
            JsonValue::Array(items) => {
                tracing::debug!("Building list of {} items", items.len());
                let element = Self {
                    schema: self
                        .schema
                        .item_schema()
                        .unwrap_or_else(|| Arc::clone(&self.schema)),
                    inflector: Arc::clone(&self.inflector),
                    registry: self.registry.clone(),
                };
                items
                    .into_iter()
                    .map(|item| element.call(item))
                    .collect::<ModelResult<Vec<_>>>()
                    .map(Value::List)
            }
            JsonValue::Object(map) => {
                let shape = self.model_shape();
                tracing::debug!("Building {} model", shape.name());
                Model::from_pairs(shape, map).map(Value::Model)
            }
            scalar => Ok(Value::Raw(scalar)),
        }
    }

    /// The shape for models built here.
    ///
    /// Component schemas share a shape through the registry as long as the
    /// registered shape binds the same schema and inflector.
    fn model_shape(&self) -> Arc<ModelShape> {
        let create = |name: &str| {
            let shape = ModelShape::new(name)
                .with_schema(Arc::clone(&self.schema))
                .with_inflector(Arc::clone(&self.inflector));
            match &self.registry {
                Some(registry) => shape.with_registry(registry),
                None => shape,
            }
        };

        if let (Some(component), Some(registry)) = (self.schema.component_ref(), &self.registry)
        {
            let shape = registry.get_or_insert_with(component.name, || create(component.name));
            if shape.binds(&*self.schema, &self.inflector) {
                return shape;
            }
            tracing::debug!(
                "Registered {} shape binds another schema or inflector, building a fresh one",
                component.name
            );
            return Arc::new(create(component.name));
        }

        Arc::new(create(self.schema.model_name().unwrap_or(ANONYMOUS_MODEL)))
    }
}
