//! # Error Handling
//!
//! Provides the unified `ModelError` enum used across the crate.

use derive_more::{Display, From};

/// The crate error enum.
///
/// We use `derive_more` for boilerplate.
/// Only `serde_yaml::Error` converts implicitly; the model errors are built explicitly.
#[derive(Debug, Display, From)]
pub enum ModelError {
    /// A model was constructed from a value that is not a key/value map.
    #[from(ignore)]
    #[display("Models must be initialized with an object that behaves like a map, got: `{_0}'")]
    InvalidInput(String),

    /// Neither the exact nor the normalized lookup found the attribute.
    #[from(ignore)]
    #[display("undefined attribute `{attribute}' for {model}")]
    AttributeNotFound {
        /// Debug representation of the model that was queried.
        model: String,
        /// The name as requested by the caller.
        attribute: String,
    },

    /// Invalid configuration values.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Wrapper for YAML/JSON configuration parse failures.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for ModelError {}

/// Helper type alias for Result using ModelError.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_conversion() {
        let yaml_err = serde_yaml::from_str::<u32>("[unterminated").unwrap_err();
        let err: ModelError = yaml_err.into();
        assert!(matches!(err, ModelError::Yaml(_)));
    }

    #[test]
    fn test_attribute_not_found_display() {
        let err = ModelError::AttributeNotFound {
            model: "#<Book:0x1>".into(),
            attribute: "title".into(),
        };
        assert_eq!(err.to_string(), "undefined attribute `title' for #<Book:0x1>");
    }

    #[test]
    fn test_invalid_input_display() {
        let err = ModelError::InvalidInput("42".into());
        assert!(err.to_string().ends_with("got: `42'"));
    }
}
