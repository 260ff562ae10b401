//! # Transport
//!
//! The [`Transport`] trait is the only place where the core touches the network. Everything
//! above it (schemas, proxies, method dispatch, the session heartbeat) is written against this
//! trait, and the crate ships two implementations of it:
//!
//! * [`crate::GrpcTransport`]: the Caffa gRPC services, streaming bulk arrays in chunks.
//! * [`crate::RestTransport`]: the Caffa REST API, one JSON body per request.
//!
//! Implementations are expected to be cheap to share (`Arc<dyn Transport>`) and must not
//! retry on their own: retrying is a connection-setup concern handled by [`crate::Session`].
use crate::{BoxError, codec::Array, config::Version};
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};

/// Errors raised by a [`Transport`].
///
/// Every variant carries enough context (HTTP verb and path, or RPC method) to tell which
/// request failed.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to connect to '{addr}': '{source}'")]
    Connect {
        addr: String,
        #[source]
        source: BoxError,
    },
    #[error("Request {context} failed: '{source}'")]
    Request {
        context: String,
        #[source]
        source: BoxError,
    },
    #[error("Request {context} was rejected by the server: '{detail}'")]
    Rejected {
        context: String,
        /// HTTP status code, when the transport speaks HTTP directly.
        status: Option<u16>,
        detail: String,
    },
    #[error("Request {context} returned an invalid response: '{detail}'")]
    InvalidResponse { context: String, detail: String },
    #[error("Invalid array chunk stream: '{0}'")]
    InvalidStream(String),
    #[error("The session has already been closed")]
    SessionClosed,
    #[error("Operation not supported by this transport: {0}")]
    Unsupported(&'static str),
}

impl TransportError {
    /// The most specific description of the failure: the server's own text when the server
    /// rejected the request, the rendered error otherwise.
    pub fn detail(&self) -> String {
        match self {
            TransportError::Rejected { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn is_not_found(&self) -> bool {
        matches!(
            self,
            TransportError::Rejected {
                status: Some(404),
                ..
            }
        )
    }
}

/// Application information reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    #[serde(rename = "major_version")]
    pub major: u32,
    #[serde(rename = "minor_version")]
    pub minor: u32,
    #[serde(rename = "patch_version")]
    pub patch: u32,
}

impl AppInfo {
    pub fn version(&self) -> Version {
        Version::new(self.major, self.minor, self.patch)
    }
}

impl Display for AppInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version())
    }
}

/// The kind of session requested from the server.
///
/// Observing sessions are read-mostly by convention. The client does not enforce it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    #[default]
    Regular,
    Observing,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Regular => "REGULAR",
            SessionType::Observing => "OBSERVING",
        }
    }
}

impl Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one field of one server object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldAddress {
    /// Keyword of the class owning the field.
    pub class_keyword: String,
    /// Uuid of the object owning the field.
    pub uuid: String,
    /// Keyword of the field itself.
    pub keyword: String,
}

/// The identity of a server object, as sent along method calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    pub keyword: String,
    pub uuid: String,
}

impl ObjectHandle {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "keyword": self.keyword, "uuid": self.uuid })
    }
}

/// A method invocation, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRequest {
    /// The object the method is invoked on (`self`).
    pub object: ObjectHandle,
    /// The method name.
    pub method: String,
    /// Either `{"labelledArguments": {..}}`, `{"positionalArguments": [..]}` or `{}`.
    pub arguments: serde_json::Value,
}

/// Hints the transport about the shape of the value being read.
///
/// Transports that stream arrays (gRPC) use it to pick the streaming endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Single,
    Array,
}

/// The answer to a field read.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldReply {
    /// The whole value as a single JSON document.
    Value(serde_json::Value),
    /// A primitive array delivered as a sequence of chunks, in arrival order.
    Chunks(Vec<Array>),
}

/// One message of a chunked array write.
///
/// A well formed stream is one `Header`, any number of `Data` chunks holding at most
/// [`crate::codec::CHUNK_SIZE`] elements each, and a terminating `End`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayChunk {
    Header {
        field: FieldAddress,
        value_count: u64,
    },
    Data(Array),
    End,
}

/// A chunked array write in flight.
pub type ChunkStream = BoxStream<'static, ArrayChunk>;

/// The operations the core needs from a Caffa server.
///
/// Every call that runs inside a session receives the session id issued by
/// [`Transport::create_session`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Fetches the application name and version.
    async fn app_info(&self) -> Result<AppInfo, TransportError>;

    /// Creates a new session and returns its id.
    async fn create_session(&self, session_type: SessionType) -> Result<String, TransportError>;

    async fn destroy_session(&self, session_id: &str) -> Result<(), TransportError>;

    async fn keepalive(&self, session_id: &str) -> Result<(), TransportError>;

    /// Fetches the schema stored at `location`, `None` when the server has no such schema.
    async fn schema(
        &self,
        session_id: &str,
        location: &str,
    ) -> Result<Option<serde_json::Value>, TransportError>;

    /// Lists the keywords of every schema the server knows about.
    async fn schema_keywords(&self, session_id: &str) -> Result<Vec<String>, TransportError>;

    /// Fetches a document. An empty `document_id` selects the server's default document.
    async fn document(
        &self,
        session_id: &str,
        document_id: &str,
        skeleton: bool,
    ) -> Result<serde_json::Value, TransportError>;

    async fn get_field(
        &self,
        session_id: &str,
        field: &FieldAddress,
        shape: ValueShape,
    ) -> Result<FieldReply, TransportError>;

    /// Writes a field. `index` addresses a single element of an array field.
    async fn set_field(
        &self,
        session_id: &str,
        field: &FieldAddress,
        value: serde_json::Value,
        index: Option<u64>,
    ) -> Result<(), TransportError>;

    /// Writes a bulk array field from a chunk stream (see [`ArrayChunk`]).
    async fn set_field_array(
        &self,
        session_id: &str,
        chunks: ChunkStream,
    ) -> Result<(), TransportError>;

    /// Lists the method descriptors the server exposes for `object`.
    async fn list_methods(
        &self,
        session_id: &str,
        object: &ObjectHandle,
    ) -> Result<Vec<serde_json::Value>, TransportError>;

    async fn execute_method(
        &self,
        session_id: &str,
        request: &MethodRequest,
    ) -> Result<serde_json::Value, TransportError>;
}
