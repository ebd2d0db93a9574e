#![deny(missing_docs)]

//! # Schema Lookup
//!
//! The read-only view of an object shape used while casting attributes, and its
//! implementation over `utoipa` OpenAPI schema objects.

use percent_encoding::percent_decode_str;
use std::fmt;
use std::sync::Arc;
use utoipa::openapi::{
    schema::{ArrayItems, Schema as OasSchema},
    Components, OpenApi, RefOr,
};

/// Limit on chained `$ref` hops, guards against reference cycles.
const MAX_REF_DEPTH: usize = 16;

/// Describes the named properties of an object shape.
pub trait Schema: fmt::Debug + Send + Sync {
    /// Returns the sub-schema of the property `name` (wire name), if described.
    fn property_schema(&self, name: &str) -> Option<Arc<dyn Schema>>;

    /// Returns the element schema when this schema describes an array.
    fn item_schema(&self) -> Option<Arc<dyn Schema>> {
        None
    }

    /// Name for models built from this schema (component name or title).
    fn model_name(&self) -> Option<&str> {
        None
    }

    /// Identity of a named, document-level component schema.
    ///
    /// Only schemas returning `Some` have their shapes shared by a registry.
    fn component_ref(&self) -> Option<ComponentRef<'_>> {
        None
    }
}

/// Names a component schema within one loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRef<'a> {
    /// Opaque identity of the owning document, stable while it is alive.
    pub document: usize,
    /// Component name, e.g. `Author` for `#/components/schemas/Author`.
    pub name: &'a str,
}

/// A schema node from an OpenAPI document.
///
/// Holds the document `Components` so `$ref`s can be followed on lookup.
#[derive(Clone)]
pub struct OpenApiSchema {
    components: Arc<Components>,
    node: OasSchema,
    name: Option<String>,
}

impl OpenApiSchema {
    /// Wraps an inline schema node.
    pub fn inline(components: Arc<Components>, node: OasSchema) -> Self {
        Self {
            components,
            node,
            name: None,
        }
    }

    /// Looks up `#/components/schemas/{name}`.
    pub fn component(components: Arc<Components>, name: &str) -> Option<Self> {
        let (node, resolved_name) = resolve_named(&components, name, MAX_REF_DEPTH)?;
        Some(Self {
            components,
            node,
            name: Some(resolved_name),
        })
    }

    /// Looks up a component schema of a parsed document.
    pub fn from_openapi(openapi: &OpenApi, name: &str) -> Option<Self> {
        let components = Arc::new(openapi.components.clone()?);
        Self::component(components, name)
    }

    /// Resolves a property or item reference in the context of this document.
    fn resolve(&self, ref_or: &RefOr<OasSchema>) -> Option<Arc<dyn Schema>> {
        let (node, name) = resolve_ref_or(&self.components, ref_or, MAX_REF_DEPTH)?;
        Some(Arc::new(Self {
            components: Arc::clone(&self.components),
            node,
            name,
        }))
    }

    /// Finds the declared property reference, merging `allOf` members.
    fn find_property(
        &self,
        node: &OasSchema,
        name: &str,
        depth: usize,
    ) -> Option<RefOr<OasSchema>> {
        match node {
            OasSchema::Object(obj) => obj.properties.get(name).cloned(),
            OasSchema::AllOf(all_of) => {
                if depth == 0 {
                    return None;
                }
                // Later members override earlier ones.
                all_of.items.iter().rev().find_map(|item| {
                    let (member, _) = resolve_ref_or(&self.components, item, depth - 1)?;
                    self.find_property(&member, name, depth - 1)
                })
            }
            _ => None,
        }
    }
}

impl Schema for OpenApiSchema {
    fn property_schema(&self, name: &str) -> Option<Arc<dyn Schema>> {
        let property = self.find_property(&self.node, name, MAX_REF_DEPTH)?;
        self.resolve(&property)
    }

    fn item_schema(&self) -> Option<Arc<dyn Schema>> {
        match &self.node {
            OasSchema::Array(arr) => match &arr.items {
                ArrayItems::RefOrSchema(boxed) => self.resolve(boxed),
                _ => None,
            },
            _ => None,
        }
    }

    fn model_name(&self) -> Option<&str> {
        self.name.as_deref().or(match &self.node {
            OasSchema::Object(obj) => obj.title.as_deref(),
            _ => None,
        })
    }

    fn component_ref(&self) -> Option<ComponentRef<'_>> {
        let name = self.name.as_deref()?;
        Some(ComponentRef {
            document: Arc::as_ptr(&self.components) as usize,
            name,
        })
    }
}

impl fmt::Debug for OpenApiSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenApiSchema")
            .field("name", &self.model_name())
            .finish_non_exhaustive()
    }
}

/// Resolves an inline schema or a reference; references report the component name.
fn resolve_ref_or(
    components: &Components,
    ref_or: &RefOr<OasSchema>,
    depth: usize,
) -> Option<(OasSchema, Option<String>)> {
    match ref_or {
        RefOr::T(schema) => Some((schema.clone(), None)),
        RefOr::Ref(r) => {
            let name = component_name(&r.ref_location)?;
            let (schema, name) = resolve_named(components, &name, depth)?;
            Some((schema, Some(name)))
        }
    }
}

fn resolve_named(
    components: &Components,
    name: &str,
    depth: usize,
) -> Option<(OasSchema, String)> {
    if depth == 0 {
        tracing::warn!("Giving up on `{}`: $ref chain too deep", name);
        return None;
    }
    match components.schemas.get(name)? {
        RefOr::T(schema) => Some((schema.clone(), name.to_string())),
        RefOr::Ref(r) => {
            let next = component_name(&r.ref_location)?;
            resolve_named(components, &next, depth - 1)
        }
    }
}

/// Extracts `{name}` from `#/components/schemas/{name}`.
fn component_name(ref_location: &str) -> Option<String> {
    let pointer = ref_location.strip_prefix("#/components/schemas/")?;
    if pointer.contains('/') {
        return None;
    }
    let name = decode_pointer_segment(pointer);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent escapes).
fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}
