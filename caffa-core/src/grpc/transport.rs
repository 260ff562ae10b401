//! # Caffa gRPC Client
//!
//! [`GrpcTransport`] implements [`Transport`] on top of the four generated service clients,
//! all sharing one `tonic` channel. Each call clones the (cheap) client it needs, so the
//! transport itself can be shared behind an `Arc`.
//!
//! ## Authentication
//!
//! When a username is given, every request carries an `authorization` metadata entry with the
//! HTTP basic credentials.
use super::generated::caffa_rpc::{
    self as rpc, AppInfoReply, ArrayRequest, DocumentRequest, FieldRequest, GenericArray,
    ListMethodsRequest, NullMessage, RpcObject, SchemaRequest, SessionMessage, SessionParameters,
    SetterRequest, app_client::AppClient, field_access_client::FieldAccessClient,
    generic_array::Data, object_access_client::ObjectAccessClient,
    schema_access_client::SchemaAccessClient,
};
use crate::{
    codec::Array,
    transport::{
        AppInfo, ArrayChunk, ChunkStream, FieldAddress, FieldReply, MethodRequest, ObjectHandle,
        SessionType, Transport, TransportError, ValueShape,
    },
};
use base64::{Engine, engine::general_purpose::STANDARD};
use futures_util::StreamExt;
use tonic::{
    Code, Status,
    metadata::{Ascii, MetadataValue},
    transport::{Channel, Endpoint},
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GrpcTransport {
    app: AppClient<Channel>,
    schemas: SchemaAccessClient<Channel>,
    objects: ObjectAccessClient<Channel>,
    fields: FieldAccessClient<Channel>,
    authorization: Option<MetadataValue<Ascii>>,
}

impl GrpcTransport {
    /// Connects to the server at `addr`, e.g. `http://127.0.0.1:50000`.
    ///
    /// An empty `username` disables authentication.
    pub async fn connect(
        addr: impl Into<String>,
        username: &str,
        password: &str,
    ) -> Result<Self, TransportError> {
        let addr = addr.into();
        let connect_error = |source: tonic::transport::Error| TransportError::Connect {
            addr: addr.clone(),
            source: Box::new(source),
        };

        let channel = Endpoint::from_shared(addr.clone())
            .map_err(connect_error)?
            .connect()
            .await
            .map_err(connect_error)?;

        Self::with_channel(channel, username, password)
    }

    /// Builds a transport on an existing channel.
    pub fn with_channel(
        channel: Channel,
        username: &str,
        password: &str,
    ) -> Result<Self, TransportError> {
        let authorization = if username.is_empty() {
            None
        } else {
            Some(basic_auth(username, password)?)
        };

        Ok(Self {
            app: AppClient::new(channel.clone()),
            schemas: SchemaAccessClient::new(channel.clone()),
            objects: ObjectAccessClient::new(channel.clone()),
            fields: FieldAccessClient::new(channel),
            authorization,
        })
    }

    fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        if let Some(authorization) = &self.authorization {
            request
                .metadata_mut()
                .insert("authorization", authorization.clone());
        }
        request
    }
}

fn basic_auth(username: &str, password: &str) -> Result<MetadataValue<Ascii>, TransportError> {
    let credentials = STANDARD.encode(format!("{username}:{password}"));
    MetadataValue::try_from(format!("Basic {credentials}")).map_err(|e| {
        TransportError::Connect {
            addr: "authorization".to_string(),
            source: Box::new(e),
        }
    })
}

fn rejected(rpc: &str, status: Status) -> TransportError {
    TransportError::Rejected {
        context: rpc.to_string(),
        status: None,
        detail: status.message().to_string(),
    }
}

fn session(session_id: &str) -> Option<SessionMessage> {
    Some(SessionMessage {
        uuid: session_id.to_string(),
        r#type: rpc::SessionType::Invalid as i32,
    })
}

fn session_type(session_type: SessionType) -> rpc::SessionType {
    match session_type {
        SessionType::Regular => rpc::SessionType::Regular,
        SessionType::Observing => rpc::SessionType::Observing,
    }
}

fn field_request(session_id: &str, field: &FieldAddress, index: Option<u64>) -> FieldRequest {
    FieldRequest {
        class_keyword: field.class_keyword.clone(),
        uuid: field.uuid.clone(),
        keyword: field.keyword.clone(),
        index,
        session: session(session_id),
    }
}

/// Parses a JSON payload carried as a string. An empty string is `null`.
fn parse_json(rpc: &str, text: &str) -> Result<serde_json::Value, TransportError> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(text).map_err(|e| TransportError::InvalidResponse {
        context: rpc.to_string(),
        detail: e.to_string(),
    })
}

fn array_data(array: Array) -> Data {
    match array {
        Array::Int32(data) => Data::Ints(rpc::IntArray { data }),
        Array::UInt32(data) => Data::Uints(rpc::UIntArray { data }),
        Array::Int64(data) => Data::Int64s(rpc::Int64Array { data }),
        Array::UInt64(data) => Data::Uint64s(rpc::UInt64Array { data }),
        Array::Float(data) => Data::Floats(rpc::FloatArray { data }),
        Array::Double(data) => Data::Doubles(rpc::DoubleArray { data }),
        Array::Bool(data) => Data::Bools(rpc::BoolArray { data }),
        Array::String(data) => Data::Strings(rpc::StringArray { data }),
    }
}

/// The primitive array carried by a data message, if any.
fn data_array(data: Data) -> Option<Array> {
    match data {
        Data::Ints(a) => Some(Array::Int32(a.data)),
        Data::Uints(a) => Some(Array::UInt32(a.data)),
        Data::Int64s(a) => Some(Array::Int64(a.data)),
        Data::Uint64s(a) => Some(Array::UInt64(a.data)),
        Data::Floats(a) => Some(Array::Float(a.data)),
        Data::Doubles(a) => Some(Array::Double(a.data)),
        Data::Bools(a) => Some(Array::Bool(a.data)),
        Data::Strings(a) => Some(Array::String(a.data)),
        Data::Request(_) | Data::Objects(_) => None,
    }
}

/// Maps one chunk of a write onto its wire message. The terminator is a message with no data.
fn chunk_message(session_id: &str, chunk: ArrayChunk) -> GenericArray {
    let data = match chunk {
        ArrayChunk::Header { field, value_count } => Some(Data::Request(ArrayRequest {
            field: Some(field_request(session_id, &field, None)),
            value_count,
        })),
        ArrayChunk::Data(array) => Some(array_data(array)),
        ArrayChunk::End => None,
    };
    GenericArray { data }
}

fn chunk_messages(
    session_id: String,
    chunks: ChunkStream,
) -> impl futures_util::Stream<Item = GenericArray> + Send + 'static {
    chunks.map(move |chunk| chunk_message(&session_id, chunk))
}

#[async_trait::async_trait]
impl Transport for GrpcTransport {
    async fn app_info(&self) -> Result<AppInfo, TransportError> {
        const RPC: &str = "caffa.rpc.App/GetAppInfo";

        let AppInfoReply {
            name,
            major_version,
            minor_version,
            patch_version,
        } = self
            .app
            .clone()
            .get_app_info(self.request(NullMessage {}))
            .await
            .map_err(|status| rejected(RPC, status))?
            .into_inner();

        Ok(AppInfo {
            name,
            major: major_version,
            minor: minor_version,
            patch: patch_version,
        })
    }

    async fn create_session(&self, kind: SessionType) -> Result<String, TransportError> {
        const RPC: &str = "caffa.rpc.App/CreateSession";

        let parameters = SessionParameters {
            r#type: session_type(kind) as i32,
        };
        let reply = self
            .app
            .clone()
            .create_session(self.request(parameters))
            .await
            .map_err(|status| rejected(RPC, status))?;

        Ok(reply.into_inner().uuid)
    }

    async fn destroy_session(&self, session_id: &str) -> Result<(), TransportError> {
        const RPC: &str = "caffa.rpc.App/DestroySession";

        let message = session(session_id).unwrap_or_default();
        self.app
            .clone()
            .destroy_session(self.request(message))
            .await
            .map_err(|status| rejected(RPC, status))?;
        Ok(())
    }

    async fn keepalive(&self, session_id: &str) -> Result<(), TransportError> {
        const RPC: &str = "caffa.rpc.App/KeepSessionAlive";

        let message = session(session_id).unwrap_or_default();
        self.app
            .clone()
            .keep_session_alive(self.request(message))
            .await
            .map_err(|status| rejected(RPC, status))?;
        Ok(())
    }

    async fn schema(
        &self,
        session_id: &str,
        location: &str,
    ) -> Result<Option<serde_json::Value>, TransportError> {
        const RPC: &str = "caffa.rpc.SchemaAccess/GetSchema";

        let request = SchemaRequest {
            location: location.to_string(),
            session: session(session_id),
        };
        match self.schemas.clone().get_schema(self.request(request)).await {
            Ok(reply) => match parse_json(RPC, &reply.into_inner().json)? {
                serde_json::Value::Null => Ok(None),
                schema => Ok(Some(schema)),
            },
            Err(status) if status.code() == Code::NotFound => Ok(None),
            Err(status) => Err(rejected(RPC, status)),
        }
    }

    async fn schema_keywords(&self, session_id: &str) -> Result<Vec<String>, TransportError> {
        const RPC: &str = "caffa.rpc.SchemaAccess/ListSchemas";

        let message = session(session_id).unwrap_or_default();
        let reply = self
            .schemas
            .clone()
            .list_schemas(self.request(message))
            .await
            .map_err(|status| rejected(RPC, status))?;

        Ok(reply.into_inner().keywords)
    }

    async fn document(
        &self,
        session_id: &str,
        document_id: &str,
        skeleton: bool,
    ) -> Result<serde_json::Value, TransportError> {
        const RPC: &str = "caffa.rpc.ObjectAccess/GetDocument";

        let request = DocumentRequest {
            document_id: document_id.to_string(),
            session: session(session_id),
            skeleton,
        };
        let reply = self
            .objects
            .clone()
            .get_document(self.request(request))
            .await
            .map_err(|status| rejected(RPC, status))?;

        parse_json(RPC, &reply.into_inner().json)
    }

    async fn get_field(
        &self,
        session_id: &str,
        field: &FieldAddress,
        shape: ValueShape,
    ) -> Result<FieldReply, TransportError> {
        let request = field_request(session_id, field, None);

        if shape == ValueShape::Single {
            const RPC: &str = "caffa.rpc.FieldAccess/GetValue";

            let reply = self
                .fields
                .clone()
                .get_value(self.request(request))
                .await
                .map_err(|status| rejected(RPC, status))?;
            return Ok(FieldReply::Value(parse_json(RPC, &reply.into_inner().value)?));
        }

        const RPC: &str = "caffa.rpc.FieldAccess/GetArrayValue";

        let mut stream = self
            .fields
            .clone()
            .get_array_value(self.request(request))
            .await
            .map_err(|status| rejected(RPC, status))?
            .into_inner();

        let mut chunks = Vec::new();
        let mut objects = Vec::new();
        while let Some(message) = stream
            .message()
            .await
            .map_err(|status| rejected(RPC, status))?
        {
            match message.data {
                Some(Data::Objects(list)) => {
                    for object in list.objects {
                        objects.push(parse_json(RPC, &object.json)?);
                    }
                }
                Some(data) => chunks.extend(data_array(data)),
                None => {}
            }
        }
        debug!(
            "Received {} chunks and {} objects for {}",
            chunks.len(),
            objects.len(),
            field.keyword
        );

        if !objects.is_empty() {
            return Ok(FieldReply::Value(serde_json::Value::Array(objects)));
        }
        Ok(FieldReply::Chunks(chunks))
    }

    async fn set_field(
        &self,
        session_id: &str,
        field: &FieldAddress,
        value: serde_json::Value,
        index: Option<u64>,
    ) -> Result<(), TransportError> {
        const RPC: &str = "caffa.rpc.FieldAccess/SetValue";

        let request = SetterRequest {
            field: Some(field_request(session_id, field, index)),
            value: value.to_string(),
        };
        self.fields
            .clone()
            .set_value(self.request(request))
            .await
            .map_err(|status| rejected(RPC, status))?;
        Ok(())
    }

    async fn set_field_array(
        &self,
        session_id: &str,
        chunks: ChunkStream,
    ) -> Result<(), TransportError> {
        const RPC: &str = "caffa.rpc.FieldAccess/SetArrayValue";

        self.fields
            .clone()
            .set_array_value(self.request(chunk_messages(session_id.to_string(), chunks)))
            .await
            .map_err(|status| rejected(RPC, status))?;
        Ok(())
    }

    async fn list_methods(
        &self,
        session_id: &str,
        object: &ObjectHandle,
    ) -> Result<Vec<serde_json::Value>, TransportError> {
        const RPC: &str = "caffa.rpc.ObjectAccess/ListMethods";

        let request = ListMethodsRequest {
            self_object: Some(RpcObject {
                json: object.to_json().to_string(),
            }),
            session: session(session_id),
        };
        let reply = self
            .objects
            .clone()
            .list_methods(self.request(request))
            .await
            .map_err(|status| rejected(RPC, status))?;

        reply
            .into_inner()
            .objects
            .iter()
            .map(|method| parse_json(RPC, &method.json))
            .collect()
    }

    async fn execute_method(
        &self,
        session_id: &str,
        request: &MethodRequest,
    ) -> Result<serde_json::Value, TransportError> {
        const RPC: &str = "caffa.rpc.ObjectAccess/ExecuteMethod";

        let message = rpc::MethodRequest {
            self_object: Some(RpcObject {
                json: request.object.to_json().to_string(),
            }),
            method: request.method.clone(),
            params: Some(RpcObject {
                json: request.arguments.to_string(),
            }),
            session: session(session_id),
        };
        let reply = self
            .objects
            .clone()
            .execute_method(self.request(message))
            .await
            .map_err(|status| rejected(RPC, status))?;

        parse_json(RPC, &reply.into_inner().json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::chunk_array;

    fn field() -> FieldAddress {
        FieldAddress {
            class_keyword: "DemoObject".to_string(),
            uuid: "0xcafe".to_string(),
            keyword: "doubleVector".to_string(),
        }
    }

    #[test]
    fn test_chunks_map_to_generic_arrays() {
        let array = Array::Double((0..4097).map(f64::from).collect());
        let messages: Vec<GenericArray> = chunk_array(field(), &array)
            .into_iter()
            .map(|chunk| chunk_message("session", chunk))
            .collect();

        assert_eq!(messages.len(), 4);

        let Some(Data::Request(header)) = &messages[0].data else {
            panic!("the first message must be the request header");
        };
        assert_eq!(header.value_count, 4097);
        let request = header.field.as_ref().unwrap();
        assert_eq!(request.keyword, "doubleVector");
        assert_eq!(request.session.as_ref().unwrap().uuid, "session");

        assert!(matches!(&messages[1].data, Some(Data::Doubles(d)) if d.data.len() == 4096));
        assert!(matches!(&messages[2].data, Some(Data::Doubles(d)) if d.data == vec![4096.0]));
        assert!(messages[3].data.is_none());
    }

    #[test]
    fn test_data_messages_map_back_to_arrays() {
        for array in [
            Array::Int32(vec![1, -2]),
            Array::UInt64(vec![u64::MAX]),
            Array::Float(vec![0.5]),
            Array::String(vec!["x".to_string()]),
        ] {
            assert_eq!(data_array(array_data(array.clone())), Some(array));
        }
        assert_eq!(
            data_array(Data::Objects(rpc::RpcObjectList::default())),
            None
        );
    }

    #[test]
    fn test_basic_auth_header() {
        let value = basic_auth("test", "password").unwrap();
        assert_eq!(value.to_str().unwrap(), "Basic dGVzdDpwYXNzd29yZA==");
    }

    #[test]
    fn test_empty_payloads_are_null() {
        assert_eq!(parse_json("rpc", "").unwrap(), serde_json::Value::Null);
        assert!(matches!(
            parse_json("rpc", "{not json"),
            Err(TransportError::InvalidResponse { .. })
        ));
    }
}
