//! JSON-over-HTTP transport

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::service::{ServiceEndpoint, ServiceKind};
use super::transport::{RpcChannel, RpcTransport};
use crate::error::{TradingError, TradingResult};

/// Sends each operation as `POST http://host:port/rpc/<operation>` with a
/// JSON body and reads a JSON reply
#[derive(Debug, Clone)]
pub struct HttpJsonTransport {
    client: Client,
}

impl HttpJsonTransport {
    pub fn new(connection_timeout: Duration) -> TradingResult<Self> {
        let client = Client::builder()
            .connect_timeout(connection_timeout)
            .build()
            .map_err(|e| TradingError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RpcTransport for HttpJsonTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn connect(
        &self,
        service: ServiceKind,
        endpoint: &ServiceEndpoint,
    ) -> TradingResult<Arc<dyn RpcChannel>> {
        let base_url = format!("http://{}/rpc", endpoint.address());
        reqwest::Url::parse(&base_url).map_err(|e| {
            TradingError::transport(format!("Invalid endpoint '{}': {}", endpoint, e))
        })?;

        tracing::debug!(service = %service, url = %base_url, "Opened HTTP RPC channel");
        Ok(Arc::new(HttpChannel {
            client: self.client.clone(),
            base_url,
            closed: AtomicBool::new(false),
        }))
    }
}

struct HttpChannel {
    client: Client,
    base_url: String,
    closed: AtomicBool,
}

#[async_trait]
impl RpcChannel for HttpChannel {
    async fn invoke(&self, operation: &str, request: Value) -> TradingResult<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TradingError::transport(format!(
                "Channel to {} is closed",
                self.base_url
            )));
        }

        let url = format!("{}/{}", self.base_url, operation);
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TradingError::transport_with_status(
                format!("{} returned {}: {}", operation, status, body.trim()),
                status.as_u16(),
            ));
        }

        Ok(response.json::<Value>().await?)
    }

    async fn close(&self) -> TradingResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
