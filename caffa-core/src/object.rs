//! # Proxy Objects
//!
//! A [`ProxyObject`] stands in for one object of the server's object model. It carries the
//! sealed [`TypeDescriptor`] of its class, its identity (`keyword` and, when it has one, `uuid`)
//! and a field store that is either *local* or *remote*:
//!
//! * Local objects keep their field values in memory. They are created with
//!   [`ObjectFactory::create`] or returned as snapshots from method calls.
//! * Remote objects hold no values. Every scalar read and every write is one request to the
//!   server. Object-typed fields are the exception on the read side: the first read
//!   materializes the child proxies, and later reads reuse them.
//!
//! All access goes through [`ProxyObject::get`] and [`ProxyObject::set`], which check the
//! descriptor before touching the store: undeclared names fail with
//! [`ObjectError::UnknownField`] and read-only fields refuse writes.
pub mod descriptor;
pub mod factory;
pub mod method;
mod store;

use crate::{
    codec::{CodecError, Value},
    schema::{FieldType, ScalarType, SchemaError},
    transport::{ObjectHandle, TransportError},
};
use descriptor::{Access, FieldDescriptor, TypeDescriptor};
use factory::{Mode, ObjectFactory};
use futures_util::{FutureExt, future::BoxFuture};
use method::{Method, MethodDescriptor};
use std::{collections::HashMap, fmt, ops::Deref, sync::Arc};
use store::FieldStore;
use tokio::sync::Mutex;
use tracing::debug;

const KEYWORD: &str = "keyword";
const UUID: &str = "uuid";

#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("'{keyword}' has no field '{field}'")]
    UnknownField { keyword: String, field: String },
    #[error("Field '{keyword}.{field}' is read only")]
    ReadOnlyViolation { keyword: String, field: String },
    #[error("Field '{keyword}.{field}' is write only")]
    WriteOnlyViolation { keyword: String, field: String },
    #[error("'{keyword}' has no method '{method}'")]
    UnknownMethod { keyword: String, method: String },
    #[error("Method '{method}' has no argument '{argument}'")]
    UnknownArgument { method: String, argument: String },
    #[error("Execution of method '{method}' failed: '{detail}'")]
    ExecutionFailed { method: String, detail: String },
    #[error("Object '{0}' is not attached to a server object")]
    Detached(String),
    #[error("Field '{keyword}.{field}' is already declared")]
    FieldExists { keyword: String, field: String },
    #[error("Cannot create field '{keyword}.{field}' on a remote object")]
    RemoteFieldCreation { keyword: String, field: String },
    #[error("Index {index} is out of bounds for field '{field}' of length {len}")]
    IndexOutOfBounds { field: String, index: u64, len: usize },
    #[error("Remote object of class '{0}' has no uuid")]
    MissingUuid(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

struct ObjectInner {
    descriptor: Arc<TypeDescriptor>,
    uuid: Option<String>,
    factory: Arc<ObjectFactory>,
    store: FieldStore,
    /// Materialized values of object and object-array fields, by field name.
    children: Mutex<HashMap<String, Value>>,
}

/// A handle to a local or remote object. Clones share the same state.
#[derive(Clone)]
pub struct ProxyObject {
    inner: Arc<ObjectInner>,
}

impl fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyObject")
            .field("keyword", &self.keyword())
            .field("uuid", &self.uuid())
            .field("local", &self.is_local())
            .finish()
    }
}

impl PartialEq for ProxyObject {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ProxyObject {
    pub(crate) fn new(
        descriptor: Arc<TypeDescriptor>,
        uuid: Option<String>,
        factory: Arc<ObjectFactory>,
        store: FieldStore,
        children: HashMap<String, Value>,
    ) -> Self {
        Self {
            inner: Arc::new(ObjectInner {
                descriptor,
                uuid,
                factory,
                store,
                children: Mutex::new(children),
            }),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.inner.descriptor.keyword
    }

    pub fn uuid(&self) -> Option<&str> {
        self.inner.uuid.as_deref()
    }

    pub fn is_local(&self) -> bool {
        self.inner.store.is_local()
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.inner.descriptor
    }

    pub fn factory(&self) -> &Arc<ObjectFactory> {
        &self.inner.factory
    }

    /// The declared field names, in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.inner.descriptor.fields.keys().map(String::as_str)
    }

    pub(crate) fn handle(&self) -> Option<ObjectHandle> {
        self.uuid().map(|uuid| ObjectHandle {
            keyword: self.keyword().to_string(),
            uuid: uuid.to_string(),
        })
    }

    fn mode(&self) -> Mode {
        if self.is_local() {
            Mode::Local
        } else {
            Mode::Remote
        }
    }

    fn identity(&self, name: &str) -> Option<Value> {
        match name {
            KEYWORD => Some(Value::from(self.keyword())),
            UUID => Some(self.uuid().into()),
            _ => None,
        }
    }

    async fn field(&self, name: &str) -> Result<FieldDescriptor, ObjectError> {
        if let Some(field) = self.inner.descriptor.field(name) {
            return Ok(field.clone());
        }

        match self.inner.store.local_field(name).await {
            Some(created) => Ok(FieldDescriptor {
                name: name.to_string(),
                field_type: created.field_type,
                access: Access::ReadWrite,
            }),
            None => Err(ObjectError::UnknownField {
                keyword: self.keyword().to_string(),
                field: name.to_string(),
            }),
        }
    }

    async fn writable_field(&self, name: &str) -> Result<FieldDescriptor, ObjectError> {
        let read_only = || ObjectError::ReadOnlyViolation {
            keyword: self.keyword().to_string(),
            field: name.to_string(),
        };

        if self.identity(name).is_some() {
            return Err(read_only());
        }
        let field = self.field(name).await?;
        if !field.access.is_writable() {
            return Err(read_only());
        }
        Ok(field)
    }

    /// Reads a field.
    ///
    /// `keyword` and `uuid` are answered from the object's identity without a round trip.
    pub async fn get(&self, name: &str) -> Result<Value, ObjectError> {
        if let Some(identity) = self.identity(name) {
            return Ok(identity);
        }

        let field = self.field(name).await?;
        if !field.access.is_readable() {
            return Err(ObjectError::WriteOnlyViolation {
                keyword: self.keyword().to_string(),
                field: name.to_string(),
            });
        }

        let is_object = field.field_type.is_object();
        if is_object && let Some(child) = self.inner.children.lock().await.get(name) {
            return Ok(child.clone());
        }

        debug!(
            "Getting field {}::{} of type {}",
            self.keyword(),
            name,
            field.field_type
        );
        let reply = self.inner.store.read(&field).await?;
        let value = self
            .inner
            .factory
            .decode_reply(reply, field.field_type, self.mode())
            .await?;

        if is_object && !value.is_null() {
            let mut children = self.inner.children.lock().await;
            return Ok(children.entry(name.to_string()).or_insert(value).clone());
        }
        Ok(value)
    }

    /// Reads a field in wire form.
    pub async fn get_json(&self, name: &str) -> Result<serde_json::Value, ObjectError> {
        if let Some(identity) = self.identity(name) {
            return ObjectFactory::encode(&identity, FieldType::Scalar(ScalarType::String))
                .await;
        }

        let field = self.field(name).await?;
        let value = self.get(name).await?;
        ObjectFactory::encode(&value, field.field_type).await
    }

    pub async fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), ObjectError> {
        self.write(name, value.into(), None).await
    }

    /// Replaces one element of an array field.
    pub async fn set_at(
        &self,
        name: &str,
        value: impl Into<Value>,
        index: u64,
    ) -> Result<(), ObjectError> {
        self.write(name, value.into(), Some(index)).await
    }

    /// Writes a field from its wire form, converting through the declared type.
    pub async fn set_json(&self, name: &str, json: &serde_json::Value) -> Result<(), ObjectError> {
        let field = self.writable_field(name).await?;
        let value = self
            .inner
            .factory
            .decode(json, field.field_type, Mode::Local)
            .await?;
        self.write(name, value, None).await
    }

    /// Writes several fields in order, stopping at the first failure.
    pub async fn set_fields<I, K, V>(&self, fields: I) -> Result<(), ObjectError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in fields {
            self.set(name.as_ref(), value).await?;
        }
        Ok(())
    }

    async fn write(&self, name: &str, value: Value, index: Option<u64>) -> Result<(), ObjectError> {
        let field = self.writable_field(name).await?;
        debug!(
            "Setting field {}::{} of type {}",
            self.keyword(),
            name,
            field.field_type
        );

        match (index, &value) {
            (None, Value::Array(array)) if field.field_type.is_chunked() => {
                if field.field_type != FieldType::Array(array.element_type()) {
                    return Err(CodecError::TypeMismatch {
                        expected: field.field_type.to_string(),
                        found: format!("{}[]", array.element_type()),
                    }
                    .into());
                }
                self.inner.store.write_array(&field, array).await?;
            }
            (None, value) => {
                let json = ObjectFactory::encode(value, field.field_type).await?;
                self.inner.store.write(&field, json, None).await?;
            }
            (Some(index), value) => {
                let element_type = match field.field_type {
                    FieldType::Array(element) => FieldType::Scalar(element),
                    FieldType::ObjectArray => FieldType::Object,
                    other => {
                        return Err(CodecError::TypeMismatch {
                            expected: "an array field".to_string(),
                            found: other.to_string(),
                        }
                        .into());
                    }
                };
                let json = ObjectFactory::encode(value, element_type).await?;
                self.inner.store.write(&field, json, Some(index)).await?;
            }
        }

        if field.field_type.is_object() {
            let mut children = self.inner.children.lock().await;
            match (self.is_local() && index.is_none(), value) {
                (true, value) if !value.is_null() => {
                    children.insert(name.to_string(), value);
                }
                _ => {
                    children.remove(name);
                }
            }
        }
        Ok(())
    }

    /// Adds a field the class does not declare to a local object. Remote objects have a fixed
    /// field set.
    pub async fn create_field(
        &self,
        name: &str,
        field_type: FieldType,
        initial: impl Into<Value>,
    ) -> Result<(), ObjectError> {
        let declared = self.inner.descriptor.field(name);
        if self.identity(name).is_some() || declared.is_some_and(|f| !f.access.is_writable()) {
            return Err(ObjectError::ReadOnlyViolation {
                keyword: self.keyword().to_string(),
                field: name.to_string(),
            });
        }
        if declared.is_some() {
            return Err(ObjectError::FieldExists {
                keyword: self.keyword().to_string(),
                field: name.to_string(),
            });
        }

        let initial = initial.into();
        let json = ObjectFactory::encode(&initial, field_type).await?;
        self.inner.store.create_field(name, field_type, json).await?;

        if field_type.is_object() && !initial.is_null() {
            self.inner
                .children
                .lock()
                .await
                .insert(name.to_string(), initial);
        }
        Ok(())
    }

    /// Serializes the object.
    ///
    /// Local objects yield their stored fields, with materialized children serialized in
    /// place. Remote objects fetch every readable field from the server.
    pub fn to_json(&self) -> BoxFuture<'_, Result<serde_json::Value, ObjectError>> {
        async move {
            let mut content = serde_json::Map::new();
            content.insert(KEYWORD.to_string(), self.keyword().into());
            if let Some(uuid) = self.uuid() {
                content.insert(UUID.to_string(), uuid.into());
            }

            if self.is_local() {
                for (name, field) in self.inner.store.local_fields().await {
                    content.insert(name, field.value);
                }

                let children: Vec<(String, Value)> = self
                    .inner
                    .children
                    .lock()
                    .await
                    .iter()
                    .map(|(name, child)| (name.clone(), child.clone()))
                    .collect();
                for (name, child) in children {
                    let field_type = match child {
                        Value::Objects(_) => FieldType::ObjectArray,
                        _ => FieldType::Object,
                    };
                    content.insert(name, ObjectFactory::encode(&child, field_type).await?);
                }
            } else {
                for field in self.inner.descriptor.fields.values() {
                    if field.access.is_readable() {
                        content.insert(field.name.clone(), self.get_json(&field.name).await?);
                    }
                }
            }

            Ok(serde_json::Value::Object(content))
        }
        .boxed()
    }

    /// Binds the method `name` to this object.
    pub fn method(&self, name: &str) -> Result<Method<'_>, ObjectError> {
        self.inner
            .descriptor
            .method(name)
            .map(|descriptor| Method::new(self, descriptor))
            .ok_or_else(|| ObjectError::UnknownMethod {
                keyword: self.keyword().to_string(),
                method: name.to_string(),
            })
    }

    /// Every method declared by the class schema.
    pub fn methods(&self) -> impl Iterator<Item = Method<'_>> {
        self.inner
            .descriptor
            .methods
            .values()
            .map(|descriptor| Method::new(self, descriptor))
    }

    /// Asks the server which methods it exposes for this object.
    pub async fn list_methods(&self) -> Result<Vec<MethodDescriptor>, ObjectError> {
        let detached = || ObjectError::Detached(self.keyword().to_string());
        let handle = self.handle().ok_or_else(detached)?;
        let connection = self.inner.factory.connection().ok_or_else(detached)?;

        connection
            .list_methods(&handle)
            .await?
            .iter()
            .map(|schema| MethodDescriptor::from_listing(schema).map_err(ObjectError::from))
            .collect()
    }
}

/// The root object of a server-side document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document(ProxyObject);

impl Document {
    pub fn new(object: ProxyObject) -> Self {
        Self(object)
    }

    pub fn into_object(self) -> ProxyObject {
        self.0
    }

    pub async fn id(&self) -> Result<Option<String>, ObjectError> {
        self.string_field("id").await
    }

    pub async fn file_name(&self) -> Result<Option<String>, ObjectError> {
        self.string_field("fileName").await
    }

    async fn string_field(&self, name: &str) -> Result<Option<String>, ObjectError> {
        Ok(self.0.get(name).await?.as_str().map(str::to_string))
    }
}

impl Deref for Document {
    type Target = ProxyObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ProxyObject> for Document {
    fn from(object: ProxyObject) -> Self {
        Self(object)
    }
}
