//! # gRPC Transport
//!
//! This module talks to the Caffa RPC services (`caffa.rpc.App`, `SchemaAccess`, `ObjectAccess`
//! and `FieldAccess`) through the checked-in `tonic` client bindings.
//!
//! Unlike REST, gRPC streams bulk arrays: reads of array fields use the server-streaming
//! `GetArrayValue` and chunked writes are forwarded as they come to the client-streaming
//! `SetArrayValue`.
pub mod transport;
mod generated;
