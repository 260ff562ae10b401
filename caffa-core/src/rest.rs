//! # REST Transport
//!
//! [`RestTransport`] speaks the Caffa REST API. Every request carries HTTP basic auth, and every
//! request made inside a session carries the session id as the `session_uuid` query parameter.
//!
//! REST has no streaming: a chunked array write is reassembled on the client and sent as one
//! JSON body.
use crate::{
    codec::Array,
    transport::{
        AppInfo, ArrayChunk, ChunkStream, FieldAddress, FieldReply, MethodRequest, ObjectHandle,
        SessionType, Transport, TransportError, ValueShape,
    },
};
use futures_util::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::debug;

const SCHEMA_ROOT: &str = "/openapi.json";

#[derive(Debug, Clone)]
pub struct RestTransport {
    client: Client,
    base: String,
    username: String,
    password: String,
}

impl RestTransport {
    /// Creates a transport for the server at `base`, e.g. `http://127.0.0.1:50000`.
    pub fn new(
        base: impl Into<String>,
        username: &str,
        password: &str,
    ) -> Result<Self, TransportError> {
        let base = base.into();
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Connect {
                addr: base.clone(),
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        session_id: Option<&str>,
        query: &[(&str, String)],
    ) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .basic_auth(&self.username, Some(&self.password));

        if let Some(session_id) = session_id {
            builder = builder.query(&[("session_uuid", session_id)]);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder
    }

    async fn send(builder: RequestBuilder, context: &str) -> Result<Response, TransportError> {
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request {
                context: context.to_string(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                context: context.to_string(),
                status: Some(status.as_u16()),
                detail,
            });
        }
        Ok(response)
    }

    /// Performs one request and parses the JSON reply. An empty body is `null`.
    async fn call(
        &self,
        method: Method,
        path: &str,
        session_id: Option<&str>,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, TransportError> {
        let context = format!("{method} {path}");
        debug!("REST request {}", context);

        let mut builder = self.request(method, path, session_id, query);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let text = Self::send(builder, &context)
            .await?
            .text()
            .await
            .map_err(|e| TransportError::Request {
                context: context.clone(),
                source: Box::new(e),
            })?;

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TransportError::InvalidResponse {
            context,
            detail: e.to_string(),
        })
    }
}

/// Maps a schema location to its REST path: `#` is the root of the OpenAPI document.
fn schema_path(location: &str) -> String {
    match location.strip_prefix('#') {
        Some(rest) => format!("{SCHEMA_ROOT}{rest}"),
        None => location.to_string(),
    }
}

fn field_path(field: &FieldAddress) -> String {
    format!("/objects/{}/fields/{}", field.uuid, field.keyword)
}

fn index_query(index: Option<u64>) -> Vec<(&'static str, String)> {
    index
        .map(|index| vec![("index", index.to_string())])
        .unwrap_or_default()
}

/// Reassembles a chunk stream into the addressed field and its whole value.
async fn collect_chunks(
    mut chunks: ChunkStream,
) -> Result<(FieldAddress, serde_json::Value), TransportError> {
    let (field, value_count) = match chunks.next().await {
        Some(ArrayChunk::Header { field, value_count }) => (field, value_count),
        _ => {
            return Err(TransportError::InvalidStream(
                "the stream must start with a header".to_string(),
            ));
        }
    };

    let mut array: Option<Array> = None;
    loop {
        match chunks.next().await {
            Some(ArrayChunk::Data(data)) => match array.as_mut() {
                Some(array) => array
                    .append(data)
                    .map_err(|e| TransportError::InvalidStream(e.to_string()))?,
                None => array = Some(data),
            },
            Some(ArrayChunk::End) => break,
            Some(ArrayChunk::Header { .. }) => {
                return Err(TransportError::InvalidStream(
                    "unexpected header inside the stream".to_string(),
                ));
            }
            None => {
                return Err(TransportError::InvalidStream(
                    "the stream ended without a terminator".to_string(),
                ));
            }
        }
    }

    let received = array.as_ref().map_or(0, Array::len) as u64;
    if received != value_count {
        return Err(TransportError::InvalidStream(format!(
            "expected {value_count} values, received {received}"
        )));
    }

    let value = array
        .map(|array| array.to_json())
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
    Ok((field, value))
}

#[async_trait::async_trait]
impl Transport for RestTransport {
    async fn app_info(&self) -> Result<AppInfo, TransportError> {
        let path = "/app/info";
        let reply = self.call(Method::GET, path, None, &[], None).await?;
        serde_json::from_value(reply).map_err(|e| TransportError::InvalidResponse {
            context: format!("GET {path}"),
            detail: e.to_string(),
        })
    }

    async fn create_session(&self, session_type: SessionType) -> Result<String, TransportError> {
        let query = [("type", session_type.as_str().to_string())];
        let reply = self
            .call(Method::POST, "/sessions/", None, &query, None)
            .await?;

        Ok(reply
            .get("uuid")
            .and_then(|uuid| uuid.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn destroy_session(&self, session_id: &str) -> Result<(), TransportError> {
        let path = format!("/sessions/{session_id}");
        self.call(Method::DELETE, &path, Some(session_id), &[], None)
            .await?;
        Ok(())
    }

    async fn keepalive(&self, session_id: &str) -> Result<(), TransportError> {
        let path = format!("/sessions/{session_id}");
        self.call(Method::PUT, &path, Some(session_id), &[], None)
            .await?;
        Ok(())
    }

    async fn schema(
        &self,
        session_id: &str,
        location: &str,
    ) -> Result<Option<serde_json::Value>, TransportError> {
        let path = schema_path(location);
        match self
            .call(Method::GET, &path, Some(session_id), &[], None)
            .await
        {
            Ok(serde_json::Value::Null) => Ok(None),
            Ok(schema) => Ok(Some(schema)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn schema_keywords(&self, session_id: &str) -> Result<Vec<String>, TransportError> {
        let path = schema_path("#/components/object_schemas");
        let reply = self
            .call(Method::GET, &path, Some(session_id), &[], None)
            .await?;

        match reply {
            serde_json::Value::Object(schemas) => Ok(schemas.keys().cloned().collect()),
            serde_json::Value::Array(keywords) => Ok(keywords
                .iter()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect()),
            other => Err(TransportError::InvalidResponse {
                context: format!("GET {path}"),
                detail: format!("expected a schema list, found '{other}'"),
            }),
        }
    }

    async fn document(
        &self,
        session_id: &str,
        document_id: &str,
        skeleton: bool,
    ) -> Result<serde_json::Value, TransportError> {
        let query = [("skeleton", skeleton.to_string())];

        if document_id.is_empty() {
            let path = "/documents/";
            let documents = self
                .call(Method::GET, path, Some(session_id), &query, None)
                .await?;
            let first = documents
                .as_array()
                .and_then(|documents| documents.first())
                .cloned()
                .ok_or_else(|| TransportError::InvalidResponse {
                    context: format!("GET {path}"),
                    detail: "the server has no documents".to_string(),
                })?;

            return match first.as_str() {
                Some(id) if !id.is_empty() => self.document(session_id, id, skeleton).await,
                _ => Ok(first),
            };
        }

        let path = format!("/documents/{document_id}");
        self.call(Method::GET, &path, Some(session_id), &query, None)
            .await
    }

    async fn get_field(
        &self,
        session_id: &str,
        field: &FieldAddress,
        _shape: ValueShape,
    ) -> Result<FieldReply, TransportError> {
        let reply = self
            .call(Method::GET, &field_path(field), Some(session_id), &[], None)
            .await?;
        Ok(FieldReply::Value(reply))
    }

    async fn set_field(
        &self,
        session_id: &str,
        field: &FieldAddress,
        value: serde_json::Value,
        index: Option<u64>,
    ) -> Result<(), TransportError> {
        self.call(
            Method::PUT,
            &field_path(field),
            Some(session_id),
            &index_query(index),
            Some(&value),
        )
        .await?;
        Ok(())
    }

    async fn set_field_array(
        &self,
        session_id: &str,
        chunks: ChunkStream,
    ) -> Result<(), TransportError> {
        let (field, value) = collect_chunks(chunks).await?;
        self.set_field(session_id, &field, value, None).await
    }

    async fn list_methods(
        &self,
        _session_id: &str,
        _object: &ObjectHandle,
    ) -> Result<Vec<serde_json::Value>, TransportError> {
        Err(TransportError::Unsupported("listing methods over REST"))
    }

    async fn execute_method(
        &self,
        session_id: &str,
        request: &MethodRequest,
    ) -> Result<serde_json::Value, TransportError> {
        let path = format!(
            "/objects/{}/methods/{}",
            request.object.uuid, request.method
        );
        self.call(
            Method::POST,
            &path,
            Some(session_id),
            &[],
            Some(&request.arguments),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::chunk_array;

    fn field() -> FieldAddress {
        FieldAddress {
            class_keyword: "DemoObject".to_string(),
            uuid: "d0c5".to_string(),
            keyword: "floatVector".to_string(),
        }
    }

    #[test]
    fn test_schema_locations_map_to_openapi_paths() {
        assert_eq!(
            schema_path("#/components/object_schemas/DemoObject"),
            "/openapi.json/components/object_schemas/DemoObject"
        );
        assert_eq!(schema_path("/openapi.json"), "/openapi.json");
    }

    #[test]
    fn test_urls() {
        let transport = RestTransport::new("http://127.0.0.1:50000/", "test", "password").unwrap();
        assert_eq!(
            transport.url(&field_path(&field())),
            "http://127.0.0.1:50000/objects/d0c5/fields/floatVector"
        );
        assert_eq!(index_query(Some(3)), vec![("index", "3".to_string())]);
        assert!(index_query(None).is_empty());
    }

    #[test]
    fn test_session_id_is_a_query_parameter() {
        let transport = RestTransport::new("http://localhost:50000", "test", "password").unwrap();
        let request = transport
            .request(
                Method::PUT,
                "/sessions/abc",
                Some("abc"),
                &[("index", "1".to_string())],
            )
            .build()
            .unwrap();

        assert_eq!(request.url().path(), "/sessions/abc");
        assert_eq!(request.url().query(), Some("session_uuid=abc&index=1"));
        assert!(request.headers().contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_chunks_are_reassembled() {
        let array = Array::Float((0..5000).map(|i| i as f32).collect());
        let chunks = tokio_stream::iter(chunk_array(field(), &array)).boxed();

        let (address, value) = collect_chunks(chunks).await.unwrap();
        assert_eq!(address, field());
        assert_eq!(value, array.to_json());
    }

    #[tokio::test]
    async fn test_truncated_chunk_streams_are_rejected() {
        let mut chunks = chunk_array(field(), &Array::Int32(vec![1, 2, 3]));
        chunks.pop();

        let result = collect_chunks(tokio_stream::iter(chunks).boxed()).await;
        assert!(matches!(result, Err(TransportError::InvalidStream(_))));
    }
}
