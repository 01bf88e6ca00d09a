//! Risk monitor client

use std::ops::Deref;
use std::sync::Arc;

use serde_json::json;

use super::base::{ClientSettings, ServiceClient};
use crate::error::CommResult;
use crate::telemetry::MetricsPort;
use crate::rpc::models::{HealthResponse, RiskMetrics, StrategyStatus, SubmissionAck};
use crate::rpc::{RpcTransport, ServiceEndpoint, ServiceKind};

/// Client for the `risk-monitor` service
#[derive(Debug)]
pub struct RiskMonitorClient {
    inner: ServiceClient,
}

impl RiskMonitorClient {
    pub fn new(
        endpoint: ServiceEndpoint,
        transport: Arc<dyn RpcTransport>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            inner: ServiceClient::new(ServiceKind::RiskMonitor, endpoint, transport, settings),
        }
    }

    pub fn with_metrics(self, metrics: Arc<dyn MetricsPort>) -> Self {
        Self {
            inner: self.inner.with_metrics(metrics),
        }
    }

    pub async fn health_check(&self) -> CommResult<HealthResponse> {
        self.inner.make_request("health_check", &json!({})).await
    }

    /// Report a strategy's status and positions
    pub async fn submit_strategy_status(
        &self,
        status: &StrategyStatus,
    ) -> CommResult<SubmissionAck> {
        self.inner.make_request("submit_strategy_status", status).await
    }

    pub async fn get_risk_metrics(&self) -> CommResult<RiskMetrics> {
        self.inner.make_request("get_risk_metrics", &json!({})).await
    }
}

impl Deref for RiskMonitorClient {
    type Target = ServiceClient;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
