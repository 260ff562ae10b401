use super::{ObjectError, descriptor::FieldDescriptor};
use crate::{
    codec::{self, Array},
    schema::FieldType,
    session::Connection,
    transport::{FieldAddress, FieldReply, ObjectHandle, ValueShape},
};
use futures_util::StreamExt;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;

/// A field value held by a local object, in wire form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocalField {
    pub field_type: FieldType,
    pub value: serde_json::Value,
}

/// Where the field values of one object live.
///
/// A local store keeps every value in memory and never touches the network. A remote store
/// holds nothing: every read and every write is one request on the session connection.
#[derive(Debug)]
pub(crate) enum FieldStore {
    Local(Mutex<BTreeMap<String, LocalField>>),
    Remote {
        connection: Arc<Connection>,
        owner: ObjectHandle,
    },
}

impl FieldStore {
    pub fn local(fields: BTreeMap<String, LocalField>) -> Self {
        FieldStore::Local(Mutex::new(fields))
    }

    pub fn remote(connection: Arc<Connection>, owner: ObjectHandle) -> Self {
        FieldStore::Remote { connection, owner }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, FieldStore::Local(_))
    }

    /// A field added to a local object with `create_field`, if any.
    pub async fn local_field(&self, name: &str) -> Option<LocalField> {
        match self {
            FieldStore::Local(fields) => fields.lock().await.get(name).cloned(),
            FieldStore::Remote { .. } => None,
        }
    }

    /// Snapshot of every value of a local store. Empty for remote stores.
    pub async fn local_fields(&self) -> BTreeMap<String, LocalField> {
        match self {
            FieldStore::Local(fields) => fields.lock().await.clone(),
            FieldStore::Remote { .. } => BTreeMap::new(),
        }
    }

    pub async fn read(&self, field: &FieldDescriptor) -> Result<FieldReply, ObjectError> {
        match self {
            FieldStore::Local(fields) => {
                let value = fields
                    .lock()
                    .await
                    .get(&field.name)
                    .map(|f| f.value.clone())
                    .unwrap_or_default();
                Ok(FieldReply::Value(value))
            }
            FieldStore::Remote { connection, owner } => {
                let shape = match field.field_type {
                    FieldType::Array(_) | FieldType::ObjectArray => ValueShape::Array,
                    _ => ValueShape::Single,
                };
                let reply = connection
                    .get_field(&address(owner, &field.name), shape)
                    .await?;
                Ok(reply)
            }
        }
    }

    /// Writes a wire value. With an `index`, only that element of an array field is replaced.
    pub async fn write(
        &self,
        field: &FieldDescriptor,
        value: serde_json::Value,
        index: Option<u64>,
    ) -> Result<(), ObjectError> {
        match self {
            FieldStore::Local(fields) => {
                let mut fields = fields.lock().await;
                match index {
                    None => {
                        fields.insert(
                            field.name.clone(),
                            LocalField {
                                field_type: field.field_type,
                                value,
                            },
                        );
                    }
                    Some(index) => {
                        let out_of_bounds = |len| ObjectError::IndexOutOfBounds {
                            field: field.name.clone(),
                            index,
                            len,
                        };
                        let elements = fields
                            .get_mut(&field.name)
                            .and_then(|f| f.value.as_array_mut())
                            .ok_or_else(|| out_of_bounds(0))?;
                        let len = elements.len();
                        let slot = usize::try_from(index)
                            .ok()
                            .and_then(|i| elements.get_mut(i))
                            .ok_or_else(|| out_of_bounds(len))?;
                        *slot = value;
                    }
                }
                Ok(())
            }
            FieldStore::Remote { connection, owner } => {
                connection
                    .set_field(&address(owner, &field.name), value, index)
                    .await?;
                Ok(())
            }
        }
    }

    /// Writes a whole primitive array. Remote stores stream it in chunks.
    pub async fn write_array(
        &self,
        field: &FieldDescriptor,
        array: &Array,
    ) -> Result<(), ObjectError> {
        match self {
            FieldStore::Local(_) => self.write(field, array.to_json(), None).await,
            FieldStore::Remote { connection, owner } => {
                let chunks = codec::chunk_array(address(owner, &field.name), array);
                connection
                    .set_field_array(tokio_stream::iter(chunks).boxed())
                    .await?;
                Ok(())
            }
        }
    }

    pub async fn create_field(
        &self,
        name: &str,
        field_type: FieldType,
        value: serde_json::Value,
    ) -> Result<(), ObjectError> {
        match self {
            FieldStore::Local(fields) => {
                fields
                    .lock()
                    .await
                    .insert(name.to_string(), LocalField { field_type, value });
                Ok(())
            }
            FieldStore::Remote { owner, .. } => Err(ObjectError::RemoteFieldCreation {
                keyword: owner.keyword.clone(),
                field: name.to_string(),
            }),
        }
    }
}

fn address(owner: &ObjectHandle, field: &str) -> FieldAddress {
    FieldAddress {
        class_keyword: owner.keyword.clone(),
        uuid: owner.uuid.clone(),
        keyword: field.to_string(),
    }
}
