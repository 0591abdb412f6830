mod client;
mod envelope;
#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpTransport, Transport, TransportConfig, validate_endpoint};
pub use envelope::{Method, PROTOCOL_VERSION, RpcRequest, RpcResponse, next_request_id};
