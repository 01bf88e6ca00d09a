//! In-process transport answering with canned service replies

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;

use super::models::{
    ActiveScenarios, ChaosAck, ChaosEvent, HealthResponse, RiskMetrics, ScenarioAck,
    ScenarioState, ScenarioStatus, StrategyStatus, SubmissionAck,
};
use super::service::{ServiceEndpoint, ServiceKind};
use super::transport::{RpcChannel, RpcTransport};
use crate::error::{TradingError, TradingResult};

/// Answers operations for one service
#[async_trait]
pub trait ServiceHandler: Send + Sync {
    async fn handle(&self, operation: &str, request: Value) -> TradingResult<Value>;
}

/// Adapts a closure into a [`ServiceHandler`]
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> ServiceHandler for FnHandler<F>
where
    F: Fn(String, Value) -> BoxFuture<'static, TradingResult<Value>> + Send + Sync,
{
    async fn handle(&self, operation: &str, request: Value) -> TradingResult<Value> {
        (self.0)(operation.to_string(), request).await
    }
}

fn unimplemented_operation(service: ServiceKind, operation: &str) -> TradingError {
    TradingError::transport(format!(
        "UNIMPLEMENTED: {} has no operation '{}'",
        service, operation
    ))
}

/// Canned risk monitor replies
#[derive(Debug, Default)]
pub struct RiskMonitorStub;

#[async_trait]
impl ServiceHandler for RiskMonitorStub {
    async fn handle(&self, operation: &str, request: Value) -> TradingResult<Value> {
        let reply = match operation {
            "health_check" => serde_json::to_value(HealthResponse::serving("risk-monitor"))?,
            "submit_strategy_status" => {
                let _status: StrategyStatus = serde_json::from_value(request)?;
                serde_json::to_value(SubmissionAck {
                    success: true,
                    message: "Status received".to_string(),
                })?
            }
            "get_risk_metrics" => serde_json::to_value(RiskMetrics {
                position_limit_utilization: 0.75,
                total_exposure: 750_000.0,
                risk_score: 0.65,
            })?,
            other => return Err(unimplemented_operation(ServiceKind::RiskMonitor, other)),
        };
        Ok(reply)
    }
}

/// Canned test coordinator replies
#[derive(Debug, Default)]
pub struct TestCoordinatorStub;

#[async_trait]
impl ServiceHandler for TestCoordinatorStub {
    async fn handle(&self, operation: &str, request: Value) -> TradingResult<Value> {
        let reply = match operation {
            "health_check" => serde_json::to_value(HealthResponse::serving("test-coordinator"))?,
            "submit_scenario_status" => {
                let status: ScenarioStatus = serde_json::from_value(request)?;
                serde_json::to_value(ScenarioAck {
                    success: true,
                    scenario_id: status.scenario_id,
                })?
            }
            "report_chaos_event" => {
                let event: ChaosEvent = serde_json::from_value(request)?;
                serde_json::to_value(ChaosAck {
                    acknowledged: true,
                    event_id: event.event_id,
                })?
            }
            "get_active_scenarios" => serde_json::to_value(ActiveScenarios {
                scenarios: vec![ScenarioStatus::new("load_test_001", ScenarioState::Running)],
            })?,
            other => return Err(unimplemented_operation(ServiceKind::TestCoordinator, other)),
        };
        Ok(reply)
    }
}

/// Transport that dispatches to in-process handlers
pub struct InMemoryTransport {
    handlers: DashMap<ServiceKind, Arc<dyn ServiceHandler>>,
    refuse_connections: AtomicBool,
    connections: AtomicUsize,
}

impl InMemoryTransport {
    /// Transport with no handlers; connecting to any service fails
    pub fn empty() -> Self {
        Self {
            handlers: DashMap::new(),
            refuse_connections: AtomicBool::new(false),
            connections: AtomicUsize::new(0),
        }
    }

    /// Transport answering with the canned risk monitor and coordinator stubs
    pub fn with_default_stubs() -> Self {
        Self::empty()
            .with_handler(ServiceKind::RiskMonitor, RiskMonitorStub)
            .with_handler(ServiceKind::TestCoordinator, TestCoordinatorStub)
    }

    /// Install or replace the handler for `service`
    pub fn with_handler(
        self,
        service: ServiceKind,
        handler: impl ServiceHandler + 'static,
    ) -> Self {
        self.handlers.insert(service, Arc::new(handler));
        self
    }

    /// Install a closure handler for `service`
    pub fn with_handler_fn<F>(self, service: ServiceKind, handler: F) -> Self
    where
        F: Fn(String, Value) -> BoxFuture<'static, TradingResult<Value>> + Send + Sync + 'static,
    {
        self.with_handler(service, FnHandler(handler))
    }

    /// Make subsequent `connect` calls fail
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Channels opened so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::with_default_stubs()
    }
}

impl std::fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut services: Vec<ServiceKind> = self.handlers.iter().map(|e| *e.key()).collect();
        services.sort();
        f.debug_struct("InMemoryTransport")
            .field("services", &services)
            .field("connections", &self.connection_count())
            .finish()
    }
}

#[async_trait]
impl RpcTransport for InMemoryTransport {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn connect(
        &self,
        service: ServiceKind,
        endpoint: &ServiceEndpoint,
    ) -> TradingResult<Arc<dyn RpcChannel>> {
        if self.refuse_connections.load(Ordering::SeqCst) {
            return Err(TradingError::transport(format!(
                "Connection refused by {}",
                endpoint
            )));
        }

        let handler = self
            .handlers
            .get(&service)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                TradingError::transport(format!("No handler for {} at {}", service, endpoint))
            })?;

        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemoryChannel {
            service,
            handler,
            closed: AtomicBool::new(false),
        }))
    }
}

struct InMemoryChannel {
    service: ServiceKind,
    handler: Arc<dyn ServiceHandler>,
    closed: AtomicBool,
}

#[async_trait]
impl RpcChannel for InMemoryChannel {
    async fn invoke(&self, operation: &str, request: Value) -> TradingResult<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TradingError::transport(format!(
                "Channel to {} is closed",
                self.service
            )));
        }
        self.handler.handle(operation, request).await
    }

    async fn close(&self) -> TradingResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use serde_json::json;

    use super::*;
    use crate::rpc::models::ServingStatus;

    fn endpoint(kind: ServiceKind) -> ServiceEndpoint {
        ServiceEndpoint::fallback(kind)
    }

    #[tokio::test]
    async fn test_risk_monitor_stub_replies() {
        let transport = InMemoryTransport::with_default_stubs();
        let channel = transport
            .connect(ServiceKind::RiskMonitor, &endpoint(ServiceKind::RiskMonitor))
            .await
            .unwrap();

        let health: HealthResponse =
            serde_json::from_value(channel.invoke("health_check", json!({})).await.unwrap())
                .unwrap();
        assert_eq!(health.status, ServingStatus::Serving);
        assert_eq!(health.service, "risk-monitor");

        let metrics = channel.invoke("get_risk_metrics", json!({})).await.unwrap();
        assert_eq!(metrics["total_exposure"], json!(750000.0));
        assert_eq!(metrics["risk_score"], json!(0.65));
        assert_eq!(transport.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_coordinator_stub_echoes_ids() {
        let transport = InMemoryTransport::with_default_stubs();
        let channel = transport
            .connect(ServiceKind::TestCoordinator, &endpoint(ServiceKind::TestCoordinator))
            .await
            .unwrap();

        let event =
            serde_json::to_value(ChaosEvent::new("latency", "risk-monitor", "chaos-7")).unwrap();
        let ack = channel.invoke("report_chaos_event", event).await.unwrap();
        assert_eq!(ack, json!({"acknowledged": true, "event_id": "chaos-7"}));

        let scenarios: ActiveScenarios =
            serde_json::from_value(channel.invoke("get_active_scenarios", json!({})).await.unwrap())
                .unwrap();
        assert_eq!(scenarios.scenarios.len(), 1);
        assert_eq!(scenarios.scenarios[0].scenario_id, "load_test_001");
        assert_eq!(scenarios.scenarios[0].status, ScenarioState::Running);
    }

    #[tokio::test]
    async fn test_malformed_request_and_unknown_operation_fail() {
        let transport = InMemoryTransport::with_default_stubs();
        let channel = transport
            .connect(ServiceKind::TestCoordinator, &endpoint(ServiceKind::TestCoordinator))
            .await
            .unwrap();

        let err = channel
            .invoke("submit_scenario_status", json!({"status": "RUNNING"}))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TRADING_JSON");

        let err = channel.invoke("get_risk_metrics", json!({})).await.unwrap_err();
        assert_eq!(err.error_code(), "TRADING_TRANSPORT");
    }

    #[tokio::test]
    async fn test_refused_and_closed_channels() {
        let transport = InMemoryTransport::with_default_stubs();
        transport.refuse_connections(true);
        assert!(
            transport
                .connect(ServiceKind::RiskMonitor, &endpoint(ServiceKind::RiskMonitor))
                .await
                .is_err()
        );

        transport.refuse_connections(false);
        let channel = transport
            .connect(ServiceKind::RiskMonitor, &endpoint(ServiceKind::RiskMonitor))
            .await
            .unwrap();
        channel.close().await.unwrap();
        assert!(channel.invoke("health_check", json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_custom_handler_replaces_stub() {
        let transport = InMemoryTransport::with_default_stubs().with_handler_fn(
            ServiceKind::RiskMonitor,
            |operation, _request| async move { Ok(json!({ "echo": operation })) }.boxed(),
        );
        let channel = transport
            .connect(ServiceKind::RiskMonitor, &endpoint(ServiceKind::RiskMonitor))
            .await
            .unwrap();

        assert_eq!(
            channel.invoke("anything", json!(null)).await.unwrap(),
            json!({"echo": "anything"})
        );
    }

    #[tokio::test]
    async fn test_missing_handler_fails_to_connect() {
        let transport = InMemoryTransport::empty();
        assert!(
            transport
                .connect(ServiceKind::RiskMonitor, &endpoint(ServiceKind::RiskMonitor))
                .await
                .is_err()
        );
    }
}
