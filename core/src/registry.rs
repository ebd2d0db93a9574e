#![deny(missing_docs)]

//! # Shape Registry
//!
//! Caches one [`ModelShape`] per component name so every model built from the same
//! schema component shares a shape.

use crate::model::ModelShape;
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of shapes keyed by component name.
#[derive(Debug, Default)]
pub struct ShapeRegistry {
    shapes: RwLock<IndexMap<String, Arc<ModelShape>>>,
}

impl ShapeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shape registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<ModelShape>> {
        self.shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registers `shape` under its name unless the name is taken.
    ///
    /// Returns the shape now registered under that name.
    pub fn insert(&self, shape: ModelShape) -> Arc<ModelShape> {
        let name = shape.name().to_string();
        self.get_or_insert_with(&name, || shape)
    }

    /// Returns the shape for `name`, creating it with `create` on first use.
    pub fn get_or_insert_with(
        &self,
        name: &str,
        create: impl FnOnce() -> ModelShape,
    ) -> Arc<ModelShape> {
        if let Some(shape) = self.get(name) {
            return shape;
        }
        let mut shapes = self.shapes.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(shapes.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!("Registering model shape {}", name);
            Arc::new(create())
        }))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Number of registered shapes.
    pub fn len(&self) -> usize {
        self.shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
