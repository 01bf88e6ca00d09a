//! Tests for the HTTP endpoints, served on a local port

use std::sync::Arc;

use futures::FutureExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::*;
use crate::clients::ClientSettings;
use crate::config::{Environment, ServiceConfig};
use crate::error::TradingError;
use crate::resilience::CircuitBreakerConfig;
use crate::rpc::{InMemoryTransport, ServiceKind};
use crate::telemetry::{ConstantLabels, PrometheusMetrics};

struct TestServer {
    base: String,
    manager: Arc<InterServiceClientManager>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

fn service() -> ServiceConfig {
    ServiceConfig {
        name: "trading-system-engine".to_string(),
        instance_name: "trading-system-engine-LH".to_string(),
        version: "0.1.0".to_string(),
        environment: Environment::Docker,
    }
}

/// Manager whose risk monitor always fails and trips after one failure
fn failing_manager() -> InterServiceClientManager {
    let transport = InMemoryTransport::with_default_stubs().with_handler_fn(
        ServiceKind::RiskMonitor,
        |_operation, _request| async { Err(TradingError::transport("UNAVAILABLE")) }.boxed(),
    );
    InterServiceClientManager::new(
        ClientSettings {
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        Arc::new(transport),
    )
}

async fn start(manager: InterServiceClientManager) -> TestServer {
    let metrics = PrometheusMetrics::new(ConstantLabels::from(&service())).unwrap();
    let manager = Arc::new(manager);
    let state = AppState {
        service: service(),
        manager: Arc::clone(&manager),
        metrics: Arc::new(metrics),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (shutdown, signal) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve(listener, state, async {
        let _ = signal.await;
    }));

    TestServer {
        base,
        manager,
        shutdown,
        handle,
    }
}

#[tokio::test]
async fn test_health_reports_identity_on_both_prefixes() {
    let server = start(failing_manager()).await;

    for path in ["/health", "/api/v1/health"] {
        let response = reqwest::get(format!("{}{}", server.base, path)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: HealthBody = response.json().await.unwrap();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "trading-system-engine");
        assert_eq!(body.instance, "trading-system-engine-LH");
        assert_eq!(body.version, "0.1.0");
        assert_eq!(body.environment, "docker");
    }
}

#[tokio::test]
async fn test_ready_until_a_dependency_circuit_opens() {
    let server = start(failing_manager()).await;
    let url = format!("{}/api/v1/ready", server.base);

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: ReadinessBody = response.json().await.unwrap();
    assert_eq!(body.status, "ready");
    assert_eq!(body.checks["risk-monitor"], "idle");
    assert_eq!(body.checks["test-coordinator"], "idle");

    let coordinator = server.manager.get_test_coordinator_client(true).await;
    coordinator.health_check().await.unwrap();
    let risk = server.manager.get_risk_monitor_client(true).await;
    assert!(risk.health_check().await.is_err());

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: ReadinessBody = response.json().await.unwrap();
    assert_eq!(body.status, "not_ready");
    assert_eq!(body.checks["risk-monitor"], "unavailable");
    assert_eq!(body.checks["test-coordinator"], "ok");
}

#[tokio::test]
async fn test_metrics_exposes_http_and_dependency_series() {
    let server = start(failing_manager()).await;
    reqwest::get(format!("{}/api/v1/health", server.base)).await.unwrap();
    reqwest::get(format!("{}/ready", server.base)).await.unwrap();

    let response = reqwest::get(format!("{}/metrics", server.base)).await.unwrap();
    assert_eq!(
        response.headers()[reqwest::header::CONTENT_TYPE],
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let body = response.text().await.unwrap();

    let health_line = body
        .lines()
        .find(|line| {
            line.starts_with("http_requests_total{") && line.contains(r#"route="/api/v1/health""#)
        })
        .unwrap_or_else(|| panic!("no request count for /api/v1/health:\n{}", body));
    assert!(health_line.contains(r#"method="GET""#));
    assert!(health_line.contains(r#"code="200""#));
    assert!(health_line.contains(r#"instance="trading-system-engine-LH""#));
    assert!(health_line.ends_with(" 1"));

    assert!(body.contains("http_request_duration_seconds_bucket{"));
    assert!(
        body.lines()
            .any(|line| line.starts_with("service_dependency_ready{")
                && line.contains(r#"dependency="risk-monitor""#)
                && line.ends_with(" 1"))
    );
    assert!(!body.contains("http_request_errors_total{"));
}

#[tokio::test]
async fn test_error_responses_are_counted() {
    let server = start(failing_manager()).await;
    let risk = server.manager.get_risk_monitor_client(true).await;
    let _ = risk.health_check().await;
    reqwest::get(format!("{}/ready", server.base)).await.unwrap();

    let body = reqwest::get(format!("{}/api/v1/metrics", server.base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.lines().any(|line| {
        line.starts_with("http_request_errors_total{")
            && line.contains(r#"route="/ready""#)
            && line.contains(r#"code="503""#)
    }));
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let server = start(failing_manager()).await;
    reqwest::get(format!("{}/health", server.base)).await.unwrap();

    server.shutdown.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}
