#![deny(missing_docs)]

//! # Models
//!
//! Attribute containers built from parsed payload objects.
//!
//! A `Model` stores attributes under their wire names and additionally accepts
//! the normalized (snake_case) spelling of a name on lookup. Attributes are only
//! reachable through [`Model::resolve`], [`Model::try_get`] and [`Model::get`],
//! so a property called `send` or `shape` never shadows the inherent methods.
//!
//! The shape-level data (schema, inflector) lives in a shared [`ModelShape`].

use crate::builder::ObjectBuilder;
use crate::error::{ModelError, ModelResult};
use crate::inflector::{default_inflector, Inflector};
use crate::registry::ShapeRegistry;
use crate::schema::Schema;
use crate::value::Value;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Name used for models without a more specific shape.
pub const ANONYMOUS_MODEL: &str = "Model";

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Shape-level settings shared by every model of one kind.
pub struct ModelShape {
    name: String,
    schema: Option<Arc<dyn Schema>>,
    inflector: Arc<dyn Inflector>,
    registry: Option<Weak<ShapeRegistry>>,
}

impl ModelShape {
    /// Creates a schema-less shape using the default inflector.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            inflector: default_inflector(),
            registry: None,
        }
    }

    /// Binds a schema used to cast nested attributes.
    pub fn with_schema(mut self, schema: Arc<dyn Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Replaces the inflector.
    pub fn with_inflector(mut self, inflector: Arc<dyn Inflector>) -> Self {
        self.inflector = inflector;
        self
    }

    /// Lets nested builds reuse shapes from `registry`.
    ///
    /// Only a weak reference is kept since the registry owns shapes itself.
    pub fn with_registry(mut self, registry: &Arc<ShapeRegistry>) -> Self {
        self.registry = Some(Arc::downgrade(registry));
        self
    }

    /// Sets or clears the bound schema.
    pub fn set_schema(&mut self, schema: Option<Arc<dyn Schema>>) {
        self.schema = schema;
    }

    /// Sets the inflector.
    pub fn set_inflector(&mut self, inflector: Arc<dyn Inflector>) {
        self.inflector = inflector;
    }

    /// The display name of this shape.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound schema, if any.
    pub fn schema(&self) -> Option<&Arc<dyn Schema>> {
        self.schema.as_ref()
    }

    /// The inflector applied to property names.
    pub fn inflector(&self) -> &Arc<dyn Inflector> {
        &self.inflector
    }

    /// Whether a model of `schema` built with `inflector` may reuse this shape.
    ///
    /// Requires the same component of the same document and the same inflector.
    pub(crate) fn binds(&self, schema: &dyn Schema, inflector: &Arc<dyn Inflector>) -> bool {
        let same_schema = match (&self.schema, schema.component_ref()) {
            (Some(bound), Some(component)) => bound.component_ref() == Some(component),
            _ => false,
        };
        same_schema && Arc::ptr_eq(&self.inflector, inflector)
    }

    fn registry(&self) -> Option<Arc<ShapeRegistry>> {
        self.registry.as_ref().and_then(Weak::upgrade)
    }

    /// Builds the normalized-name index for `property_names`.
    ///
    /// Names that normalize to themselves are left out. When two names share a
    /// normalized form the first one keeps the entry.
    fn snake_cases<'a>(
        &self,
        property_names: impl IntoIterator<Item = &'a str>,
    ) -> IndexMap<String, String> {
        let mut snake_cases = IndexMap::new();
        for property_name in property_names {
            let snake_case = self.inflector.normalize(property_name);
            if snake_case == property_name {
                continue;
            }
            if let Some(existing) = snake_cases.get(&snake_case) {
                if existing != property_name {
                    tracing::warn!(
                        "{}: `{}` and `{}` both normalize to `{}`, keeping `{}`",
                        self.name,
                        existing,
                        property_name,
                        snake_case,
                        existing
                    );
                }
                continue;
            }
            snake_cases.insert(snake_case, property_name.to_string());
        }
        snake_cases
    }

    /// Casts one attribute value according to the property's sub-schema.
    fn cast(&self, name: &str, value: JsonValue) -> ModelResult<Value> {
        if value.is_null() {
            return Ok(Value::Raw(value));
        }
        let Some(schema) = &self.schema else {
            return Ok(Value::Raw(value));
        };
        let Some(property) = schema.property_schema(name) else {
            return Ok(Value::Raw(value));
        };

        ObjectBuilder::new(property, Arc::clone(&self.inflector))
            .with_registry(self.registry())
            .call(value)
    }
}

impl fmt::Debug for ModelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelShape")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// A read-only, schema-aware view of one payload object.
///
/// Cloning is cheap and yields the same object (see [`Model::same_object`]).
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelData>,
}

struct ModelData {
    shape: Arc<ModelShape>,
    object_id: u64,
    attributes: IndexMap<String, Value>,
    snake_cases: IndexMap<String, String>,
}

impl Model {
    /// Builds a model from a parsed JSON object.
    ///
    /// Any other JSON value is rejected with [`ModelError::InvalidInput`].
    pub fn new(shape: Arc<ModelShape>, input: JsonValue) -> ModelResult<Self> {
        match input {
            JsonValue::Object(map) => Self::from_pairs(shape, map),
            other => Err(ModelError::InvalidInput(other.to_string())),
        }
    }

    /// Builds a schema-less model with the default inflector.
    pub fn from_json(input: JsonValue) -> ModelResult<Self> {
        Self::new(Arc::new(ModelShape::new(ANONYMOUS_MODEL)), input)
    }

    /// Builds a model from key/value pairs.
    ///
    /// A repeated key keeps its last value. Every value is cast here, once.
    pub fn from_pairs<I, K>(shape: Arc<ModelShape>, pairs: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = (K, JsonValue)>,
        K: Into<String>,
    {
        let pairs: Vec<(String, JsonValue)> =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let snake_cases = shape.snake_cases(pairs.iter().map(|(k, _)| k.as_str()));

        let mut attributes = IndexMap::with_capacity(pairs.len());
        for (name, value) in pairs {
            let value = shape.cast(&name, value)?;
            attributes.insert(name, value);
        }

        let object_id = NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            "Built {} #{:x} with {} attributes",
            shape.name(),
            object_id,
            attributes.len()
        );

        Ok(Self {
            inner: Arc::new(ModelData {
                shape,
                object_id,
                attributes,
                snake_cases,
            }),
        })
    }

    /// Reads an attribute by wire name or normalized name.
    pub fn resolve(&self, name: &str) -> ModelResult<&Value> {
        self.lookup(name)
            .ok_or_else(|| ModelError::AttributeNotFound {
                model: self.to_string(),
                attribute: name.to_string(),
            })
    }

    /// Generic dispatch by name; same as [`Model::resolve`].
    pub fn send(&self, name: &str) -> ModelResult<&Value> {
        self.resolve(name)
    }

    /// Whether [`Model::resolve`] would succeed for `name`.
    pub fn responds_to(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Reads an attribute like [`Model::resolve`], returning `None` when missing.
    pub fn try_get(&self, name: &str) -> Option<&Value> {
        self.lookup(name)
    }

    /// Reads an attribute by exact wire name only.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.attributes.get(key)
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        let data = &*self.inner;
        data.attributes.get(name).or_else(|| {
            data.snake_cases
                .get(name)
                .and_then(|original| data.attributes.get(original))
        })
    }

    /// The shape this model was built with.
    pub fn shape(&self) -> &Arc<ModelShape> {
        &self.inner.shape
    }

    /// Whether this model was built with exactly `shape`.
    pub fn is_a(&self, shape: &ModelShape) -> bool {
        std::ptr::eq(Arc::as_ptr(&self.inner.shape), shape)
    }

    /// Opaque identifier, unique per constructed model.
    pub fn object_id(&self) -> u64 {
        self.inner.object_id
    }

    /// Identity comparison, as opposed to `==` which compares contents.
    pub fn same_object(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Attributes in payload order, under their wire names.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Wire names in payload order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.attributes.keys().map(String::as_str)
    }

    /// Normalized name -> wire name entries.
    pub fn normalized_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .snake_cases
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.inner.attributes.len()
    }

    /// True when the payload object was empty.
    pub fn is_empty(&self) -> bool {
        self.inner.attributes.is_empty()
    }

    /// Converts back into plain JSON, keeping wire names.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.inner
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.inner.shape.name == other.inner.shape.name
            && self.inner.attributes == other.inner.attributes
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}:0x{:x}>", self.inner.shape.name, self.inner.object_id)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.attributes() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug)]
    struct Library;

    #[derive(Debug)]
    struct Author;

    impl Schema for Library {
        fn property_schema(&self, name: &str) -> Option<Arc<dyn Schema>> {
            match name {
                "author" => Some(Arc::new(Author)),
                _ => None,
            }
        }
    }

    impl Schema for Author {
        fn property_schema(&self, _name: &str) -> Option<Arc<dyn Schema>> {
            None
        }

        fn model_name(&self) -> Option<&str> {
            Some("Author")
        }
    }

    fn library_shape() -> Arc<ModelShape> {
        Arc::new(ModelShape::new("Library").with_schema(Arc::new(Library)))
    }

    #[test]
    fn test_schema_less_values_are_unchanged() {
        let input = json!({"id": 1, "bookTitle": "X", "tags": ["a"], "author": {"name": "X"}});
        let model = Model::from_json(input.clone()).unwrap();
        for (key, value) in input.as_object().unwrap() {
            assert_eq!(model.resolve(key).unwrap(), &Value::Raw(value.clone()));
        }
        assert_eq!(model.to_json(), input);
    }

    #[test]
    fn test_normalized_name_lookup() {
        let model = Model::from_json(json!({"bookTitle": "X", "id": 1})).unwrap();
        let entries: Vec<_> = model.normalized_names().collect();
        assert_eq!(entries, vec![("book_title", "bookTitle")]);
        assert_eq!(model.resolve("book_title").unwrap().as_str(), Some("X"));
        assert_eq!(model.resolve("bookTitle").unwrap().as_str(), Some("X"));
    }

    #[test]
    fn test_exact_key_access_skips_normalized_index() {
        let model = Model::from_json(json!({"bookTitle": "X"})).unwrap();
        assert!(model.get("book_title").is_none());
        assert_eq!(model.get("bookTitle").and_then(Value::as_str), Some("X"));
    }

    #[test]
    fn test_missing_attribute() {
        let model = Model::from_json(json!({"id": 1})).unwrap();
        let err = model.resolve("title").unwrap_err();
        match err {
            ModelError::AttributeNotFound { model: name, attribute } => {
                assert!(name.starts_with("#<Model:0x"));
                assert_eq!(attribute, "title");
            }
            other => panic!("Expected AttributeNotFound, got {other}"),
        }
        assert!(model.try_get("title").is_none());
        assert!(!model.responds_to("title"));
        assert!(model.responds_to("id"));
    }

    #[test]
    fn test_rejects_non_object_input() {
        for input in [json!(42), json!("book"), json!([["id", 1]]), JsonValue::Null] {
            let err = Model::from_json(input).unwrap_err();
            assert!(matches!(err, ModelError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_invalid_input_describes_value() {
        match Model::from_json(json!(42)).unwrap_err() {
            ModelError::InvalidInput(desc) => assert_eq!(desc, "42"),
            other => panic!("Expected InvalidInput, got {other}"),
        }
    }

    #[test]
    fn test_schema_casts_nested_model() {
        let model = Model::new(library_shape(), json!({"author": {"name": "X"}})).unwrap();
        let author = model.resolve("author").unwrap().as_model().unwrap();
        assert_eq!(author.shape().name(), "Author");
        assert_eq!(author.resolve("name").unwrap().as_str(), Some("X"));
    }

    #[test]
    fn test_without_schema_nested_map_stays_raw() {
        let model = Model::from_json(json!({"author": {"name": "X"}})).unwrap();
        assert_eq!(
            model.resolve("author").unwrap(),
            &Value::Raw(json!({"name": "X"}))
        );
    }

    #[test]
    fn test_null_is_never_cast() {
        let model = Model::new(library_shape(), json!({"author": null})).unwrap();
        assert!(model.resolve("author").unwrap().is_null());
    }

    #[test]
    fn test_undescribed_property_stays_raw() {
        let model = Model::new(library_shape(), json!({"publisher": {"name": "Y"}})).unwrap();
        assert_eq!(
            model.resolve("publisher").unwrap(),
            &Value::Raw(json!({"name": "Y"}))
        );
    }

    #[test]
    fn test_cast_uses_wire_name() {
        let inflector: Arc<dyn Inflector> = Arc::new(|name: &str| name.to_uppercase());
        let shape = ModelShape::new("Library")
            .with_schema(Arc::new(Library))
            .with_inflector(inflector);
        let model = Model::new(Arc::new(shape), json!({"author": {"name": "X"}})).unwrap();
        assert!(model.resolve("AUTHOR").unwrap().as_model().is_some());
        assert_eq!(model.normalized_names().count(), 1);
    }

    #[test]
    fn test_normalization_collision_keeps_first() {
        let model = Model::from_json(json!({"bookTitle": 1, "BookTitle": 2})).unwrap();
        let entries: Vec<_> = model.normalized_names().collect();
        assert_eq!(entries, vec![("book_title", "bookTitle")]);
        assert_eq!(model.resolve("book_title").unwrap(), &Value::Raw(json!(1)));
        assert_eq!(model.resolve("BookTitle").unwrap(), &Value::Raw(json!(2)));
    }

    #[test]
    fn test_exact_name_wins_over_normalized() {
        let model = Model::from_json(json!({"bookTitle": 1, "book_title": 2})).unwrap();
        assert_eq!(model.resolve("book_title").unwrap(), &Value::Raw(json!(2)));
    }

    #[test]
    fn test_colliding_property_names_do_not_shadow_operations() {
        let model = Model::from_json(json!({
            "send": "s", "shape": "x", "object_id": 7, "is_a": true, "class": "c"
        }))
        .unwrap();
        assert_eq!(model.shape().name(), ANONYMOUS_MODEL);
        assert_eq!(model.send("send").unwrap().as_str(), Some("s"));
        assert_eq!(model.resolve("object_id").unwrap(), &Value::Raw(json!(7)));
    }

    #[test]
    fn test_debug_representation_is_stable_and_opaque() {
        let model = Model::from_json(json!({"secret": "hidden"})).unwrap();
        let repr = format!("{model:?}");
        assert_eq!(repr, format!("#<Model:0x{:x}>", model.object_id()));
        assert_eq!(repr, format!("{model:?}"));
        assert!(!repr.contains("hidden"));
        assert_eq!(model.to_string(), repr);
    }

    #[test]
    fn test_identity_and_type_membership() {
        let shape = library_shape();
        let a = Model::new(Arc::clone(&shape), json!({"id": 1})).unwrap();
        let b = Model::new(Arc::clone(&shape), json!({"id": 1})).unwrap();
        assert_eq!(a, b);
        assert!(!a.same_object(&b));
        assert!(a.same_object(&a.clone()));
        assert_ne!(a.object_id(), b.object_id());
        assert!(a.is_a(&shape));
        assert!(!a.is_a(&ModelShape::new("Library")));
    }

    #[test]
    fn test_from_pairs() {
        let shape = Arc::new(ModelShape::new("Pairs"));
        let model =
            Model::from_pairs(shape, vec![("id", json!(1)), ("pageCount", json!(10))]).unwrap();
        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["id", "pageCount"]);
        assert_eq!(model.resolve("page_count").unwrap(), &Value::Raw(json!(10)));
        assert_eq!(model.len(), 2);
        assert!(!model.is_empty());
    }

    #[test]
    fn test_shape_setters() {
        let mut shape = ModelShape::new("Book");
        assert!(shape.schema().is_none());
        shape.set_schema(Some(Arc::new(Library)));
        assert!(shape.schema().is_some());
        shape.set_inflector(Arc::new(|name: &str| name.to_string()));
        assert_eq!(shape.inflector().normalize("bookTitle"), "bookTitle");
        shape.set_schema(None);
        assert!(shape.schema().is_none());
    }

    #[test]
    fn test_models_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Model>();

        let model = Model::from_json(json!({"bookTitle": "X"})).unwrap();
        let handle = {
            let model = model.clone();
            std::thread::spawn(move || model.resolve("book_title").unwrap().to_json())
        };
        assert_eq!(handle.join().unwrap(), json!("X"));
    }

    #[test]
    fn test_serialize_keeps_wire_names() {
        let model = Model::new(library_shape(), json!({"bookTitle": "X", "author": {"name": "Y"}}))
            .unwrap();
        let text = serde_json::to_string(&model).unwrap();
        assert_eq!(text, r#"{"bookTitle":"X","author":{"name":"Y"}}"#);
    }
}
