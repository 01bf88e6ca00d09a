//! RPC plumbing: service identities, wire models and transports

pub mod models;
mod http;
mod in_memory;
mod service;
mod transport;

pub use http::HttpJsonTransport;
pub use in_memory::{
    FnHandler, InMemoryTransport, RiskMonitorStub, ServiceHandler, TestCoordinatorStub,
};
pub use service::{ServiceEndpoint, ServiceKind};
pub use transport::{RpcChannel, RpcTransport};
