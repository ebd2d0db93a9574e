#![deny(missing_docs)]

//! # Inflector
//!
//! Maps wire property names (often camelCase) to the normalized snake_case form
//! accepted as a secondary lookup key on models.

use crate::error::{ModelError, ModelResult};
use heck::ToSnakeCase;
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

/// A pure name normalization policy.
///
/// Implementations must be deterministic and free of side effects.
pub trait Inflector: Send + Sync {
    /// Returns the alternate lookup form of `name`.
    fn normalize(&self, name: &str) -> String;
}

impl<F> Inflector for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, name: &str) -> String {
        self(name)
    }
}

/// The standard policy: explicit exceptions first, then snake_case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnakeCaseInflector {
    exceptions: IndexMap<String, String>,
}

impl SnakeCaseInflector {
    /// Creates an inflector without exceptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds fixed mappings that take precedence over the generic rule.
    ///
    /// e.g. `("eTag", "etag")` instead of the derived `e_tag`.
    pub fn with_exceptions<I, K, V>(mut self, exceptions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.exceptions
            .extend(exceptions.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Builds an inflector from a loaded configuration.
    pub fn from_config(config: &InflectorConfig) -> Self {
        Self::new().with_exceptions(config.exceptions.clone())
    }
}

impl Inflector for SnakeCaseInflector {
    fn normalize(&self, name: &str) -> String {
        match self.exceptions.get(name) {
            Some(mapped) => mapped.clone(),
            None => name.to_snake_case(),
        }
    }
}

/// Inflector settings, usually shipped next to the API description.
///
/// ```yaml
/// exceptions:
///   eTag: etag
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InflectorConfig {
    /// Wire name -> normalized name overrides.
    #[serde(default)]
    pub exceptions: IndexMap<String, String>,
}

impl InflectorConfig {
    /// Parses the configuration from YAML (or JSON, which is valid YAML).
    pub fn from_yaml_str(source: &str) -> ModelResult<Self> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects exceptions with an empty wire name or normalized name.
    pub fn validate(&self) -> ModelResult<()> {
        for (name, normalized) in &self.exceptions {
            if name.is_empty() {
                return Err(ModelError::Config(format!(
                    "inflector exception for `{}` has an empty property name",
                    normalized
                )));
            }
            if normalized.is_empty() {
                return Err(ModelError::Config(format!(
                    "inflector exception for `{}` maps to an empty name",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Returns the shared default inflector.
///
/// Created on first use and never mutated afterwards.
pub fn default_inflector() -> Arc<dyn Inflector> {
    static DEFAULT: OnceLock<Arc<SnakeCaseInflector>> = OnceLock::new();
    DEFAULT
        .get_or_init(|| Arc::new(SnakeCaseInflector::new()))
        .clone()
}
