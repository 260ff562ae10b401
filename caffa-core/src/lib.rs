//! # Caffa Core
//!
//! `caffa-core` is the library behind the `caffa` CLI. It is a dynamic client for Caffa
//! application servers: the server describes its documents, objects, fields and methods with
//! JSON-Schema-like metadata, and this crate turns that metadata into proxies you can read,
//! write and call without any compile-time knowledge of the server's object model.
//!
//! ## Key Components
//!
//! * **[`Session`]:** The entry point. It negotiates the server version, owns the session id
//!   issued by the server and keeps it alive with a background heartbeat.
//! * **[`ProxyObject`] & [`Document`]:** Client-side stand-ins for server objects. Field access
//!   and method calls are routed through the schema of the object's keyword.
//! * **[`SchemaCache`]:** Fetches and memoizes schemas, flattening `allOf`/`$ref` composition.
//! * **[`Transport`]:** The seam to the wire. Two implementations ship with the crate:
//!   [`GrpcTransport`] and [`RestTransport`].
//!
//! ## Local and remote objects
//!
//! A [`ProxyObject`] is either *local* (its fields live in memory, no transport involved) or
//! *remote* (every scalar read and every write is a round trip to the server). Nested objects
//! are materialized lazily on first read and then reused.
//!
//! ## Feature Flags (Internal use only)
//!
//! * `gen-proto`: Enables the binary that regenerates the checked-in gRPC bindings.
pub mod codec;
pub mod config;
pub mod grpc;
pub mod object;
pub mod rest;
pub mod schema;
pub mod session;
pub mod transport;

pub use codec::{Array, Value};
pub use config::{ClientConfig, Protocol, Version};
pub use grpc::transport::GrpcTransport;
pub use object::{
    Document, ObjectError, ProxyObject,
    descriptor::{Access, FieldDescriptor, TypeDescriptor},
    factory::ObjectFactory,
    method::{Arguments, Method, MethodDescriptor, MethodOutput},
};
pub use rest::RestTransport;
pub use schema::{FieldType, Location, ScalarType, SchemaCache, SchemaError};
pub use session::{Session, SessionConfig, SessionError};
pub use transport::{AppInfo, SessionType, Transport, TransportError};

// Re-exports
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
