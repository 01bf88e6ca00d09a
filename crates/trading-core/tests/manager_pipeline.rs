//! Manager, clients, breaker and monitor working together over the
//! in-memory transport

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use trading_core::rpc::models::{ChaosEvent, HealthResponse, ScenarioState, ScenarioStatus};
use trading_core::{
    ClientSettings, CircuitState, ConfigLoader, HealthStatus, InMemoryTransport,
    InterServiceClientManager, ServiceInfo, ServiceKind, StaticServiceDiscovery, TradingError,
};

fn settings() -> ClientSettings {
    let vars = HashMap::from([
        ("TRADING_CIRCUIT_BREAKER_FAILURE_THRESHOLD".to_string(), "3".to_string()),
        ("TRADING_CIRCUIT_BREAKER_RECOVERY_TIMEOUT".to_string(), "10s".to_string()),
    ]);
    let config = ConfigLoader::new().with_defaults().with_vars(vars).load().unwrap();
    ClientSettings::from(&config)
}

/// Risk monitor whose health check fails while `down` is set
fn flaky_transport(down: Arc<AtomicBool>) -> InMemoryTransport {
    InMemoryTransport::with_default_stubs().with_handler_fn(
        ServiceKind::RiskMonitor,
        move |operation, _| {
            let down = down.load(Ordering::SeqCst);
            async move {
                match operation.as_str() {
                    "health_check" if down => {
                        Err(TradingError::transport("UNAVAILABLE: risk monitor restarting"))
                    }
                    "health_check" => serde_json::to_value(HealthResponse::serving("risk-monitor"))
                        .map_err(TradingError::from),
                    _ => Ok(json!({})),
                }
            }
            .boxed()
        },
    )
}

#[tokio::test(start_paused = true)]
async fn test_outage_opens_breaker_and_recovers() {
    let down = Arc::new(AtomicBool::new(false));
    let manager =
        InterServiceClientManager::new(settings(), Arc::new(flaky_transport(Arc::clone(&down))));
    manager.initialize().await;

    let health = manager.health_check_all(true).await;
    assert_eq!(health.len(), 2);
    assert!(health.values().all(|result| result.as_ref().is_ok_and(|r| r.is_serving())));

    let risk = manager.get_risk_monitor_client(true).await;
    down.store(true, Ordering::SeqCst);
    for _ in 0..3 {
        let err = assert_err!(risk.health_check().await);
        assert!(!err.is_circuit_open());
    }
    assert_eq!(risk.circuit_breaker().state(), CircuitState::Open);

    let rejected = assert_err!(risk.health_check().await);
    assert!(rejected.is_circuit_open());

    // 1 success, 3 failures; the rejection never reached the service
    let report = risk.performance_monitor().get_health_status();
    assert_eq!(report.total_requests, 4);
    assert_eq!(report.status, HealthStatus::Unhealthy);

    let stats = manager.get_client_stats();
    let risk_stats = &stats["risk-monitor"];
    assert_eq!(risk_stats.total_requests, 5);
    assert_eq!(risk_stats.failed_requests, 4);
    assert_eq!(risk_stats.circuit_breaker.rejected_calls, 1);

    down.store(false, Ordering::SeqCst);
    tokio::time::advance(Duration::from_secs(11)).await;
    let response = assert_ok!(risk.health_check().await);
    assert!(response.is_serving());
    assert_eq!(risk.circuit_breaker().state(), CircuitState::Closed);
    assert_eq!(risk.circuit_breaker().failure_count(), 0);

    manager.cleanup().await;
    assert_eq!(manager.get_manager_stats().total_clients, 0);
    assert!(!manager.is_initialized());
}

#[tokio::test]
async fn test_coordinator_workflow_through_discovery() {
    let discovery = Arc::new(StaticServiceDiscovery::from_services([ServiceInfo::new(
        "test-coordinator",
        "coordinator.internal",
        8083,
        50063,
    )]));
    let transport = Arc::new(InMemoryTransport::with_default_stubs());
    let manager = InterServiceClientManager::new(ClientSettings::default(), transport.clone())
        .with_discovery(discovery);

    let coordinator = manager.get_test_coordinator_client(false).await;
    assert_eq!(coordinator.address(), "coordinator.internal:50063");

    let status = ScenarioStatus::new("latency_spike_007", ScenarioState::Running);
    let ack = assert_ok!(coordinator.submit_scenario_status(&status).await);
    assert!(ack.success);
    assert_eq!(ack.scenario_id, "latency_spike_007");

    let event = ChaosEvent::new("network_partition", "risk-monitor", "chaos-001");
    let chaos = assert_ok!(coordinator.report_chaos_event(&event).await);
    assert!(chaos.acknowledged);
    assert_eq!(chaos.event_id, event.event_id);

    let scenarios = assert_ok!(coordinator.get_active_scenarios().await);
    assert_eq!(scenarios.len(), 1);

    let same = manager.get_test_coordinator_client(false).await;
    assert!(Arc::ptr_eq(&coordinator, &same));
    assert_eq!(transport.connection_count(), 1);

    let manager_stats = manager.get_manager_stats();
    assert!(manager_stats.service_discovery_enabled);
    assert_eq!(manager_stats.client_types, vec!["test-coordinator".to_string()]);
    assert_eq!(manager_stats.active_connections, 1);

    manager.cleanup().await;
    assert!(!coordinator.is_connected());
}
