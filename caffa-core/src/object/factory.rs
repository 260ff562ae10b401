use super::{
    ObjectError, ProxyObject,
    descriptor::TypeDescriptor,
    store::{FieldStore, LocalField},
};
use crate::{
    codec::{self, CodecError, Value},
    schema::{FieldType, Location, PropertyMap, SchemaCache, SchemaError},
    session::Connection,
    transport::{FieldReply, ObjectHandle},
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Whether a materialized object keeps its fields in memory or on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Local,
    Remote,
}

/// Synthesizes [`TypeDescriptor`]s from schemas and instantiates [`ProxyObject`]s from them.
///
/// Descriptors are built once per keyword and never mutated afterwards.
#[derive(Debug)]
pub struct ObjectFactory {
    schemas: SchemaCache,
    types: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
    connection: Option<Arc<Connection>>,
}

impl ObjectFactory {
    /// A factory without a server. Only local objects can be created.
    pub fn offline(schemas: SchemaCache) -> Arc<Self> {
        Arc::new(Self {
            schemas,
            types: RwLock::default(),
            connection: None,
        })
    }

    pub(crate) fn online(connection: Arc<Connection>) -> Arc<Self> {
        Arc::new(Self {
            schemas: SchemaCache::online(connection.clone()),
            types: RwLock::default(),
            connection: Some(connection),
        })
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    pub(crate) fn connection(&self) -> Option<&Arc<Connection>> {
        self.connection.as_ref()
    }

    /// Builds (or returns the memoized) descriptor of `keyword` from `properties`.
    pub async fn create_type(
        &self,
        keyword: &str,
        properties: &PropertyMap,
    ) -> Result<Arc<TypeDescriptor>, SchemaError> {
        if let Some(descriptor) = self.types.read().await.get(keyword) {
            return Ok(descriptor.clone());
        }

        let descriptor = Arc::new(TypeDescriptor::from_properties(keyword, properties)?);
        debug!(
            "Synthesized type {} with {} fields and {} methods",
            keyword,
            descriptor.fields.len(),
            descriptor.methods.len()
        );

        Ok(self
            .types
            .write()
            .await
            .entry(keyword.to_string())
            .or_insert(descriptor)
            .clone())
    }

    /// The descriptor of `keyword`, fetching its schema on first use.
    pub async fn type_for(&self, keyword: &str) -> Result<Arc<TypeDescriptor>, SchemaError> {
        self.type_at(keyword, &self.schemas.location_for(keyword))
            .await
    }

    async fn type_at(
        &self,
        keyword: &str,
        location: &Location,
    ) -> Result<Arc<TypeDescriptor>, SchemaError> {
        if let Some(descriptor) = self.types.read().await.get(keyword) {
            return Ok(descriptor.clone());
        }

        let properties = self.schemas.properties(location).await?;
        self.create_type(keyword, &properties).await
    }

    /// Creates a local object of class `keyword` with the given initial field values.
    ///
    /// Read-only fields can be initialized here. Names the class does not declare fail with
    /// [`ObjectError::UnknownField`].
    pub async fn create<I, K, V>(
        self: &Arc<Self>,
        keyword: &str,
        fields: I,
    ) -> Result<ProxyObject, ObjectError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let descriptor = self.type_for(keyword).await?;
        let mut initial = BTreeMap::new();
        let mut children = HashMap::new();

        for (name, value) in fields {
            let name = name.as_ref();
            let field = descriptor
                .field(name)
                .ok_or_else(|| ObjectError::UnknownField {
                    keyword: keyword.to_string(),
                    field: name.to_string(),
                })?;

            let value = value.into();
            let wire = Self::encode(&value, field.field_type).await?;
            if field.field_type.is_object() && !value.is_null() {
                children.insert(name.to_string(), value);
            }
            initial.insert(
                name.to_string(),
                LocalField {
                    field_type: field.field_type,
                    value: wire,
                },
            );
        }

        Ok(ProxyObject::new(
            descriptor,
            None,
            self.clone(),
            FieldStore::local(initial),
            children,
        ))
    }

    /// Instantiates an object of an already synthesized class from its wire form.
    ///
    /// Remote objects need a `uuid` in the payload and a factory with a connection.
    pub fn instantiate(
        self: &Arc<Self>,
        descriptor: Arc<TypeDescriptor>,
        json: &serde_json::Value,
        mode: Mode,
    ) -> Result<ProxyObject, ObjectError> {
        let payload = json.as_object().ok_or_else(|| {
            CodecError::InvalidPayload(format!("expected an object, found '{json}'"))
        })?;
        let uuid = payload
            .get("uuid")
            .and_then(|u| u.as_str())
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        let store = match mode {
            Mode::Local => {
                let fields = payload
                    .iter()
                    .filter_map(|(name, value)| {
                        descriptor.field(name).map(|field| {
                            let field = LocalField {
                                field_type: field.field_type,
                                value: value.clone(),
                            };
                            (name.clone(), field)
                        })
                    })
                    .collect();
                FieldStore::local(fields)
            }
            Mode::Remote => {
                let connection = self
                    .connection
                    .clone()
                    .ok_or_else(|| ObjectError::Detached(descriptor.keyword.clone()))?;
                let uuid = uuid
                    .clone()
                    .ok_or_else(|| ObjectError::MissingUuid(descriptor.keyword.clone()))?;
                let owner = ObjectHandle {
                    keyword: descriptor.keyword.clone(),
                    uuid,
                };
                FieldStore::remote(connection, owner)
            }
        };

        Ok(ProxyObject::new(
            descriptor,
            uuid,
            self.clone(),
            store,
            HashMap::new(),
        ))
    }

    /// Instantiates an object from a wire payload carrying its `keyword` (and maybe `$id`).
    pub async fn materialize(
        self: &Arc<Self>,
        json: &serde_json::Value,
        mode: Mode,
    ) -> Result<ProxyObject, ObjectError> {
        let keyword = json
            .get("keyword")
            .and_then(|k| k.as_str())
            .ok_or_else(|| CodecError::InvalidPayload(format!("object without keyword: '{json}'")))?;

        let location = json
            .get("$id")
            .and_then(|id| id.as_str())
            .map(Location::new)
            .unwrap_or_else(|| self.schemas.location_for(keyword));

        let descriptor = self.type_at(keyword, &location).await?;
        self.instantiate(descriptor, json, mode)
    }

    /// Decodes a wire value of any declared type, materializing objects in `mode`.
    pub async fn decode(
        self: &Arc<Self>,
        json: &serde_json::Value,
        field_type: FieldType,
        mode: Mode,
    ) -> Result<Value, ObjectError> {
        match field_type {
            _ if json.is_null() => Ok(Value::Null),
            FieldType::Object => Ok(Value::Object(self.materialize(json, mode).await?)),
            FieldType::ObjectArray => {
                let items = json.as_array().ok_or_else(|| CodecError::TypeMismatch {
                    expected: field_type.to_string(),
                    found: json.to_string(),
                })?;

                let mut objects = Vec::with_capacity(items.len());
                for item in items {
                    objects.push(self.materialize(item, mode).await?);
                }
                Ok(Value::Objects(objects))
            }
            plain => Ok(codec::decode(json, plain)?),
        }
    }

    pub(crate) async fn decode_reply(
        self: &Arc<Self>,
        reply: FieldReply,
        field_type: FieldType,
        mode: Mode,
    ) -> Result<Value, ObjectError> {
        match reply {
            FieldReply::Value(json) => self.decode(&json, field_type, mode).await,
            // An object array streamed without any object carries no data chunk.
            FieldReply::Chunks(chunks)
                if chunks.is_empty() && field_type == FieldType::ObjectArray =>
            {
                Ok(Value::Objects(Vec::new()))
            }
            chunks => Ok(codec::decode_reply(chunks, field_type)?),
        }
    }

    /// Encodes a native value of any declared type. Objects are serialized with
    /// [`ProxyObject::to_json`].
    pub async fn encode(
        value: &Value,
        field_type: FieldType,
    ) -> Result<serde_json::Value, ObjectError> {
        match (field_type, value) {
            (_, Value::Null) => Ok(serde_json::Value::Null),
            (FieldType::Object, Value::Object(object)) => object.to_json().await,
            (FieldType::ObjectArray, Value::Objects(objects)) => {
                let mut items = Vec::with_capacity(objects.len());
                for object in objects {
                    items.push(object.to_json().await?);
                }
                Ok(serde_json::Value::Array(items))
            }
            (FieldType::Object | FieldType::ObjectArray, other) => {
                Err(CodecError::TypeMismatch {
                    expected: field_type.to_string(),
                    found: other.kind().to_string(),
                }
                .into())
            }
            (plain, value) => Ok(codec::encode(value, plain)?),
        }
    }
}
