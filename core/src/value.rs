#![deny(missing_docs)]

//! # Attribute Values
//!
//! The result of casting one raw payload value.

use crate::model::Model;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A cast attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The payload value as parsed, no schema guidance applied.
    Raw(JsonValue),
    /// A map built into a model.
    Model(Model),
    /// A list whose elements were built individually.
    List(Vec<Value>),
}

impl Value {
    /// True for a raw JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Raw(JsonValue::Null))
    }

    /// Returns the raw payload value, if this value was left uncast.
    pub fn as_raw(&self) -> Option<&JsonValue> {
        match self {
            Value::Raw(raw) => Some(raw),
            _ => None,
        }
    }

    /// Returns the nested model, if this value was built into one.
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Value::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Returns the built elements, if this value was a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Shortcut for raw string scalars.
    pub fn as_str(&self) -> Option<&str> {
        self.as_raw().and_then(JsonValue::as_str)
    }

    /// Converts back into plain JSON, keeping wire names.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Raw(raw) => raw.clone(),
            Value::Model(model) => model.to_json(),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(raw: JsonValue) -> Self {
        Value::Raw(raw)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Raw(raw) => raw.serialize(serializer),
            Value::Model(model) => model.serialize(serializer),
            Value::List(items) => serializer.collect_seq(items),
        }
    }
}
