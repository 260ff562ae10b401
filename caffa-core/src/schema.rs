//! # Schema Cache
//!
//! Caffa servers describe every object class with a JSON-Schema-like document, published under
//! `#/components/object_schemas/<keyword>`. Classes inherit from each other through `allOf`
//! composition, with each branch either listing `properties` inline or pointing to a parent with
//! `$ref`.
//!
//! The [`SchemaCache`] fetches those documents, flattens the composition into a single
//! [`PropertyMap`] per class and memoizes the result. It can be backed by a live session
//! (*online*) or by a set of schemas handed over up front (*offline*), which is how purely local
//! objects get their nested types without a server.
//!
//! This module also owns the type tags ([`FieldType`], [`ScalarType`]) every field and argument
//! schema resolves to.
use crate::{session::Connection, transport::TransportError};
use futures_util::{FutureExt, future::BoxFuture};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Flattened `property name -> property schema` map of one class.
pub type PropertyMap = BTreeMap<String, serde_json::Value>;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("No schema found at '{0}'")]
    SchemaNotFound(String),
    #[error("Property '{property}' has an unresolved type '{tag}'")]
    UnresolvedType { property: String, tag: String },
    #[error("Schema '{0}' references itself through '$ref'")]
    CyclicReference(String),
    #[error("Invalid schema at '{location}': {detail}")]
    InvalidSchema { location: String, detail: String },
    #[error("Failed to fetch schema: '{0}'")]
    Transport(#[from] TransportError),
}

/// Element type of a scalar field or of a primitive array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    Bool,
    String,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Int32 => "int32",
            ScalarType::UInt32 => "uint32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt64 => "uint64",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ScalarType::Bool | ScalarType::String)
    }

    /// Caffa's own spelling, e.g. `int32` or `double`.
    fn from_native(tag: &str) -> Option<Self> {
        match tag {
            "int" | "int32" => Some(ScalarType::Int32),
            "uint" | "uint32" => Some(ScalarType::UInt32),
            "int64" => Some(ScalarType::Int64),
            "uint64" => Some(ScalarType::UInt64),
            "float" => Some(ScalarType::Float),
            "double" => Some(ScalarType::Double),
            "bool" | "boolean" => Some(ScalarType::Bool),
            "string" => Some(ScalarType::String),
            _ => None,
        }
    }

    /// JSON-Schema spelling, e.g. `{"type": "integer", "format": "int64"}`.
    fn from_json_schema(tag: &str, format: Option<&str>) -> Option<Self> {
        match (tag, format) {
            ("integer", None | Some("int32")) => Some(ScalarType::Int32),
            ("integer", Some("uint32")) => Some(ScalarType::UInt32),
            ("integer", Some("int64")) => Some(ScalarType::Int64),
            ("integer", Some("uint64")) => Some(ScalarType::UInt64),
            ("number", Some("float")) => Some(ScalarType::Float),
            ("number", None | Some("double")) => Some(ScalarType::Double),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved type tag of a field, argument or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(ScalarType),
    Object,
    ObjectArray,
    Array(ScalarType),
}

impl FieldType {
    /// Resolves the type tag of `property` from its schema.
    ///
    /// Both the Caffa-native spelling (`"type": "int32[]"`) and plain JSON-Schema
    /// (`"type": "array", "items": {...}`) are understood. Anything else is an
    /// [`SchemaError::UnresolvedType`].
    pub fn from_schema(property: &str, schema: &serde_json::Value) -> Result<Self, SchemaError> {
        if schema.get("$ref").is_some() {
            return Ok(FieldType::Object);
        }

        let unresolved = |tag: &str| SchemaError::UnresolvedType {
            property: property.to_string(),
            tag: tag.to_string(),
        };

        let tag = schema
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| unresolved(&schema.to_string()))?;
        let format = schema.get("format").and_then(|f| f.as_str());

        if let Some(element) = tag.strip_suffix("[]") {
            if element == "object" {
                return Ok(FieldType::ObjectArray);
            }
            return ScalarType::from_native(element)
                .map(FieldType::Array)
                .ok_or_else(|| unresolved(tag));
        }

        match tag {
            "object" => Ok(FieldType::Object),
            "array" => {
                let items = schema.get("items").ok_or_else(|| unresolved(tag))?;
                match FieldType::from_schema(property, items)? {
                    FieldType::Scalar(element) => Ok(FieldType::Array(element)),
                    FieldType::Object => Ok(FieldType::ObjectArray),
                    _ => Err(unresolved(tag)),
                }
            }
            _ => ScalarType::from_native(tag)
                .or_else(|| ScalarType::from_json_schema(tag, format))
                .map(FieldType::Scalar)
                .ok_or_else(|| unresolved(tag)),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, FieldType::Object | FieldType::ObjectArray)
    }

    /// Arrays of numbers are written through the chunked transfer protocol.
    pub fn is_chunked(&self) -> bool {
        matches!(self, FieldType::Array(element) if element.is_numeric())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(scalar) => write!(f, "{scalar}"),
            FieldType::Object => f.write_str("object"),
            FieldType::ObjectArray => f.write_str("object[]"),
            FieldType::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// Where a schema lives, e.g. `#/components/object_schemas/DemoObject`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(String);

impl Location {
    pub const OBJECT_SCHEMAS: &'static str = "#/components/object_schemas";

    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn for_keyword(keyword: &str) -> Self {
        Self(format!("{}/{keyword}", Self::OBJECT_SCHEMAS))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The class keyword, when the location points into the object schemas.
    pub fn keyword(&self) -> Option<&str> {
        self.0
            .strip_prefix(Self::OBJECT_SCHEMAS)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|keyword| !keyword.is_empty() && !keyword.contains('/'))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
enum SchemaSource {
    Online(Arc<Connection>),
    Offline(HashMap<Location, serde_json::Value>),
}

/// Fetches, flattens and memoizes class schemas.
#[derive(Debug)]
pub struct SchemaCache {
    source: SchemaSource,
    properties: RwLock<HashMap<Location, Arc<PropertyMap>>>,
}

impl SchemaCache {
    pub(crate) fn online(connection: Arc<Connection>) -> Self {
        Self {
            source: SchemaSource::Online(connection),
            properties: RwLock::default(),
        }
    }

    /// Creates a cache serving a fixed set of `keyword -> schema` documents.
    pub fn offline<I, K>(schemas: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: AsRef<str>,
    {
        let schemas = schemas
            .into_iter()
            .map(|(keyword, schema)| (Location::for_keyword(keyword.as_ref()), schema))
            .collect();

        Self {
            source: SchemaSource::Offline(schemas),
            properties: RwLock::default(),
        }
    }

    /// The location of the schema describing `keyword`.
    pub fn location_for(&self, keyword: &str) -> Location {
        Location::for_keyword(keyword)
    }

    /// Fetches the raw schema document stored at `location`.
    pub async fn schema(&self, location: &Location) -> Result<serde_json::Value, SchemaError> {
        let schema = match &self.source {
            SchemaSource::Online(connection) => connection.schema(location.as_str()).await?,
            SchemaSource::Offline(schemas) => schemas.get(location).cloned(),
        };

        schema.ok_or_else(|| SchemaError::SchemaNotFound(location.to_string()))
    }

    /// Lists the keywords of every known class.
    pub async fn keywords(&self) -> Result<Vec<String>, SchemaError> {
        match &self.source {
            SchemaSource::Online(connection) => Ok(connection.schema_keywords().await?),
            SchemaSource::Offline(schemas) => {
                let mut keywords: Vec<String> = schemas
                    .keys()
                    .filter_map(|location| location.keyword().map(str::to_string))
                    .collect();
                keywords.sort();
                Ok(keywords)
            }
        }
    }

    /// The flattened properties of the class `keyword`.
    pub async fn schema_for(&self, keyword: &str) -> Result<Arc<PropertyMap>, SchemaError> {
        self.properties(&self.location_for(keyword)).await
    }

    /// The flattened properties of the schema stored at `location`.
    ///
    /// `allOf` branches are merged in order. A property defined by more than one branch is a
    /// schema authoring error: the first definition is kept and a warning is logged.
    pub async fn properties(&self, location: &Location) -> Result<Arc<PropertyMap>, SchemaError> {
        if let Some(cached) = self.properties.read().await.get(location) {
            return Ok(cached.clone());
        }

        let mut visiting = Vec::new();
        let resolved = Arc::new(self.resolve(location.clone(), &mut visiting).await?);
        debug!(
            "Resolved {} properties for schema {}",
            resolved.len(),
            location
        );

        self.properties
            .write()
            .await
            .insert(location.clone(), resolved.clone());

        Ok(resolved)
    }

    fn resolve<'a>(
        &'a self,
        location: Location,
        visiting: &'a mut Vec<Location>,
    ) -> BoxFuture<'a, Result<PropertyMap, SchemaError>> {
        async move {
            if visiting.contains(&location) {
                return Err(SchemaError::CyclicReference(location.to_string()));
            }
            visiting.push(location.clone());

            let schema = self.schema(&location).await?;
            let mut properties = PropertyMap::new();

            if let Some(own) = schema.get("properties") {
                merge_properties(&location, &mut properties, own)?;
            }

            if let Some(branches) = schema.get("allOf") {
                let branches = branches
                    .as_array()
                    .ok_or_else(|| SchemaError::InvalidSchema {
                        location: location.to_string(),
                        detail: "'allOf' must be an array".to_string(),
                    })?;

                for branch in branches {
                    if let Some(own) = branch.get("properties") {
                        merge_properties(&location, &mut properties, own)?;
                    } else if let Some(reference) = branch.get("$ref").and_then(|r| r.as_str()) {
                        let inherited = self.resolve(Location::new(reference), visiting).await?;
                        for (name, property) in inherited {
                            insert_property(&location, &mut properties, name, property);
                        }
                    }
                }
            }

            visiting.pop();
            Ok(properties)
        }
        .boxed()
    }
}

fn merge_properties(
    location: &Location,
    properties: &mut PropertyMap,
    branch: &serde_json::Value,
) -> Result<(), SchemaError> {
    let branch = branch
        .as_object()
        .ok_or_else(|| SchemaError::InvalidSchema {
            location: location.to_string(),
            detail: "'properties' must be an object".to_string(),
        })?;

    for (name, property) in branch {
        insert_property(location, properties, name.clone(), property.clone());
    }
    Ok(())
}

fn insert_property(
    location: &Location,
    properties: &mut PropertyMap,
    name: String,
    property: serde_json::Value,
) {
    match properties.get(&name) {
        None => {
            properties.insert(name, property);
        }
        Some(existing) if *existing == property => {}
        Some(_) => warn!(
            "Property '{}' is defined more than once in schema {}, keeping the first definition",
            name, location
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_type_tags() {
        let cases = [
            (json!({ "type": "int32" }), FieldType::Scalar(ScalarType::Int32)),
            (json!({ "type": "string" }), FieldType::Scalar(ScalarType::String)),
            (json!({ "type": "object" }), FieldType::Object),
            (json!({ "type": "object[]" }), FieldType::ObjectArray),
            (json!({ "type": "float[]" }), FieldType::Array(ScalarType::Float)),
            (json!({ "type": "uint64[]" }), FieldType::Array(ScalarType::UInt64)),
        ];

        for (schema, expected) in cases {
            assert_eq!(FieldType::from_schema("field", &schema).unwrap(), expected);
        }
    }

    #[test]
    fn test_json_schema_type_tags() {
        let cases = [
            (
                json!({ "type": "integer", "format": "int64" }),
                FieldType::Scalar(ScalarType::Int64),
            ),
            (json!({ "type": "number" }), FieldType::Scalar(ScalarType::Double)),
            (json!({ "type": "boolean" }), FieldType::Scalar(ScalarType::Bool)),
            (
                json!({ "type": "string", "enum": ["T1", "T2", "T3"] }),
                FieldType::Scalar(ScalarType::String),
            ),
            (
                json!({ "$ref": "#/components/object_schemas/DemoObject" }),
                FieldType::Object,
            ),
            (
                json!({ "type": "array", "items": { "type": "number", "format": "float" } }),
                FieldType::Array(ScalarType::Float),
            ),
            (
                json!({ "type": "array", "items": { "$ref": "#/components/object_schemas/Child" } }),
                FieldType::ObjectArray,
            ),
        ];

        for (schema, expected) in cases {
            assert_eq!(FieldType::from_schema("field", &schema).unwrap(), expected);
        }
    }

    #[test]
    fn test_unresolved_type_tags_are_errors() {
        for schema in [
            json!({ "type": "quaternion" }),
            json!({ "type": "matrix[]" }),
            json!({ "description": "no type at all" }),
            json!({ "type": "array" }),
        ] {
            assert!(matches!(
                FieldType::from_schema("field", &schema),
                Err(SchemaError::UnresolvedType { property, .. }) if property == "field"
            ));
        }
    }

    #[test]
    fn test_location_keyword() {
        assert_eq!(
            Location::for_keyword("DemoObject").keyword(),
            Some("DemoObject")
        );
        assert_eq!(Location::new("/openapi.json").keyword(), None);
    }

    #[tokio::test]
    async fn test_cyclic_references_are_rejected() {
        let cache = SchemaCache::offline([
            (
                "A",
                json!({ "allOf": [{ "$ref": "#/components/object_schemas/B" }] }),
            ),
            (
                "B",
                json!({ "allOf": [{ "$ref": "#/components/object_schemas/A" }] }),
            ),
        ]);

        assert!(matches!(
            cache.schema_for("A").await,
            Err(SchemaError::CyclicReference(_))
        ));
    }
}
