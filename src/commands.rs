//! Command handlers
//!
//! Diagnostic commands print pretty JSON on stdout; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, bail};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use trading_core::api::{self, AppState};
use trading_core::config::ServerConfig;
use trading_core::rpc::models::HealthResponse;
use trading_core::{
    CommResult, ConfigurationServiceClient, EngineConfig, InterServiceClientManager, MetricsPort,
    ServiceDiscovery, ServiceKind,
};

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn health_entry(result: &CommResult<HealthResponse>) -> Value {
    match result {
        Ok(response) => json!({
            "healthy": response.is_serving(),
            "status": response.status,
            "timestamp": response.timestamp,
        }),
        Err(e) => json!({
            "healthy": false,
            "error": e.to_string(),
        }),
    }
}

/// Health-check one service, or all of them. Fails if any is unhealthy.
pub async fn health(
    manager: &InterServiceClientManager,
    service: Option<&str>,
    use_fallback: bool,
) -> anyhow::Result<()> {
    let results: Vec<(ServiceKind, CommResult<HealthResponse>)> = match service {
        Some(name) => {
            let Some(kind) = ServiceKind::from_name(name) else {
                bail!(
                    "Unknown service '{}'. Known services: {}",
                    name,
                    ServiceKind::ALL.map(|kind| kind.name()).join(", ")
                );
            };
            let client = manager.get_client(kind, use_fallback).await;
            vec![(kind, client.health_check().await)]
        }
        None => manager.health_check_all(use_fallback).await.into_iter().collect(),
    };

    let unhealthy: Vec<&str> = results
        .iter()
        .filter(|(_, result)| !result.as_ref().is_ok_and(HealthResponse::is_serving))
        .map(|(kind, _)| kind.name())
        .collect();

    let report: Map<String, Value> = results
        .iter()
        .map(|(kind, result)| (kind.name().to_string(), health_entry(result)))
        .collect();
    print_json(&report)?;

    manager.cleanup().await;

    if !unhealthy.is_empty() {
        bail!("Unhealthy services: {}", unhealthy.join(", "));
    }
    Ok(())
}

/// Touch every client with a health check, then print their statistics
pub async fn stats(manager: &InterServiceClientManager, use_fallback: bool) -> anyhow::Result<()> {
    manager.initialize().await;
    for (kind, result) in manager.health_check_all(use_fallback).await {
        if let Err(e) = result {
            tracing::warn!(service = %kind, error = %e, "Health check failed");
        }
    }

    print_json(&json!({
        "manager": manager.get_manager_stats(),
        "clients": manager.get_client_stats(),
    }))?;

    manager.cleanup().await;
    Ok(())
}

/// Serve the HTTP endpoints until Ctrl+C or SIGTERM, then clean up clients
pub async fn serve(
    config: &EngineConfig,
    server: &ServerConfig,
    manager: InterServiceClientManager,
    metrics: Arc<dyn MetricsPort>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(server.address())
        .await
        .with_context(|| format!("Failed to bind {}", server.address()))?;

    let manager = Arc::new(manager);
    manager.initialize().await;
    let state = AppState {
        service: config.service.clone(),
        manager: Arc::clone(&manager),
        metrics,
    };

    let served = api::serve(listener, state, api::shutdown_signal()).await;
    manager.cleanup().await;
    served.context("HTTP server failed")?;

    tracing::info!("Trading engine stopped");
    Ok(())
}

pub fn show_config(config: &EngineConfig) -> anyhow::Result<()> {
    print_json(config)
}

/// Read one key from the configuration service
pub async fn get_config(
    config: &EngineConfig,
    discovery: Arc<dyn ServiceDiscovery>,
    key: &str,
    endpoint: Option<&str>,
) -> anyhow::Result<()> {
    let mut client = ConfigurationServiceClient::new(&config.configuration_service)?
        .with_discovery(discovery);
    if let Some(endpoint) = endpoint {
        client = client.with_endpoint(endpoint);
    }

    let value = client
        .get_configuration(key)
        .await
        .with_context(|| format!("Failed to read configuration key {}", key))?;
    print_json(&value)?;

    client.cleanup();
    Ok(())
}
