//! RPC transport seam
//!
//! Clients only see these traits, so the wire protocol can be swapped
//! without touching the request pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::service::{ServiceEndpoint, ServiceKind};
use crate::error::TradingResult;

/// Establishes channels to remote services
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Short name for logs and stats
    fn name(&self) -> &'static str;

    /// Open a channel to `service` at `endpoint`
    async fn connect(
        &self,
        service: ServiceKind,
        endpoint: &ServiceEndpoint,
    ) -> TradingResult<Arc<dyn RpcChannel>>;
}

/// An open channel to one remote service
#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Invoke a named operation; transport and remote failures come back as
    /// `TradingError::Transport`
    async fn invoke(&self, operation: &str, request: Value) -> TradingResult<Value>;

    /// Release the channel. Further invocations fail.
    async fn close(&self) -> TradingResult<()>;
}
