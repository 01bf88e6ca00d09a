//! Test coordinator client

use std::ops::Deref;
use std::sync::Arc;

use serde_json::json;

use super::base::{ClientSettings, ServiceClient};
use crate::error::CommResult;
use crate::telemetry::MetricsPort;
use crate::rpc::models::{
    ActiveScenarios, ChaosAck, ChaosEvent, HealthResponse, ScenarioAck, ScenarioStatus,
};
use crate::rpc::{RpcTransport, ServiceEndpoint, ServiceKind};

/// Client for the `test-coordinator` service
#[derive(Debug)]
pub struct CoordinatorClient {
    inner: ServiceClient,
}

impl CoordinatorClient {
    pub fn new(
        endpoint: ServiceEndpoint,
        transport: Arc<dyn RpcTransport>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            inner: ServiceClient::new(ServiceKind::TestCoordinator, endpoint, transport, settings),
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

    pub async fn submit_scenario_status(&self, status: &ScenarioStatus) -> CommResult<ScenarioAck> {
        self.inner.make_request("submit_scenario_status", status).await
    }

    pub async fn report_chaos_event(&self, event: &ChaosEvent) -> CommResult<ChaosAck> {
        self.inner.make_request("report_chaos_event", event).await
    }

    /// Scenarios currently running; a reply without a list means none
    pub async fn get_active_scenarios(&self) -> CommResult<Vec<ScenarioStatus>> {
        let reply: ActiveScenarios = self
            .inner
            .make_request("get_active_scenarios", &json!({}))
            .await?;
        Ok(reply.scenarios)
    }
}

impl Deref for CoordinatorClient {
    type Target = ServiceClient;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
