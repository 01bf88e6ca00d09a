//! Inter-service client manager

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::instrument;

use super::base::{ClientSettings, ServiceClient};
use super::coordinator::CoordinatorClient;
use super::risk_monitor::RiskMonitorClient;
use super::stats::{ClientStats, ManagerStats};
use crate::discovery::ServiceDiscovery;
use crate::error::CommResult;
use crate::rpc::models::HealthResponse;
use crate::rpc::{RpcTransport, ServiceEndpoint, ServiceKind};
use crate::telemetry::MetricsPort;

/// A client held by the manager
#[derive(Debug, Clone)]
pub enum ManagedClient {
    RiskMonitor(Arc<RiskMonitorClient>),
    TestCoordinator(Arc<CoordinatorClient>),
}

impl ManagedClient {
    /// The shared pipeline behind either client
    pub fn base(&self) -> &ServiceClient {
        match self {
            ManagedClient::RiskMonitor(client) => client,
            ManagedClient::TestCoordinator(client) => client,
        }
    }

    pub async fn health_check(&self) -> CommResult<HealthResponse> {
        match self {
            ManagedClient::RiskMonitor(client) => client.health_check().await,
            ManagedClient::TestCoordinator(client) => client.health_check().await,
        }
    }
}

/// Typed clients the manager knows how to build and store
trait ManagedService: Sized {
    const KIND: ServiceKind;

    fn build(
        endpoint: ServiceEndpoint,
        transport: Arc<dyn RpcTransport>,
        settings: ClientSettings,
    ) -> Self;

    fn with_metrics(self, metrics: Arc<dyn MetricsPort>) -> Self;

    fn wrap(client: Arc<Self>) -> ManagedClient;

    fn unwrap(client: &ManagedClient) -> Option<Arc<Self>>;
}

impl ManagedService for RiskMonitorClient {
    const KIND: ServiceKind = ServiceKind::RiskMonitor;

    fn build(
        endpoint: ServiceEndpoint,
        transport: Arc<dyn RpcTransport>,
        settings: ClientSettings,
    ) -> Self {
        RiskMonitorClient::new(endpoint, transport, settings)
    }

    fn with_metrics(self, metrics: Arc<dyn MetricsPort>) -> Self {
        RiskMonitorClient::with_metrics(self, metrics)
    }

    fn wrap(client: Arc<Self>) -> ManagedClient {
        ManagedClient::RiskMonitor(client)
    }

    fn unwrap(client: &ManagedClient) -> Option<Arc<Self>> {
        match client {
            ManagedClient::RiskMonitor(client) => Some(Arc::clone(client)),
            _ => None,
        }
    }
}

impl ManagedService for CoordinatorClient {
    const KIND: ServiceKind = ServiceKind::TestCoordinator;

    fn build(
        endpoint: ServiceEndpoint,
        transport: Arc<dyn RpcTransport>,
        settings: ClientSettings,
    ) -> Self {
        CoordinatorClient::new(endpoint, transport, settings)
    }

    fn with_metrics(self, metrics: Arc<dyn MetricsPort>) -> Self {
        CoordinatorClient::with_metrics(self, metrics)
    }

    fn wrap(client: Arc<Self>) -> ManagedClient {
        ManagedClient::TestCoordinator(client)
    }

    fn unwrap(client: &ManagedClient) -> Option<Arc<Self>> {
        match client {
            ManagedClient::TestCoordinator(client) => Some(Arc::clone(client)),
            _ => None,
        }
    }
}

/// Single point of access to per-service clients.
///
/// Clients are built lazily, at most one per service, and handed out as
/// shared `Arc`s so callers reuse the same connection.
pub struct InterServiceClientManager {
    settings: ClientSettings,
    transport: Arc<dyn RpcTransport>,
    discovery: Option<Arc<dyn ServiceDiscovery>>,
    metrics: Option<Arc<dyn MetricsPort>>,
    clients: DashMap<ServiceKind, ManagedClient>,
    risk_monitor_lock: Mutex<()>,
    coordinator_lock: Mutex<()>,
    initialized: AtomicBool,
}

impl std::fmt::Debug for InterServiceClientManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterServiceClientManager")
            .field("transport", &self.transport.name())
            .field("discovery", &self.discovery.is_some())
            .field("metrics", &self.metrics.is_some())
            .field("clients", &self.clients.len())
            .field("initialized", &self.initialized.load(Ordering::SeqCst))
            .finish()
    }
}

impl InterServiceClientManager {
    pub fn new(settings: ClientSettings, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            settings,
            transport,
            discovery: None,
            metrics: None,
            clients: DashMap::new(),
            risk_monitor_lock: Mutex::new(()),
            coordinator_lock: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Resolve endpoints through `discovery` before falling back
    pub fn with_discovery(mut self, discovery: Arc<dyn ServiceDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Hand `metrics` to every client built from now on
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsPort>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Mark the manager ready; repeated calls do nothing
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(
            transport = self.transport.name(),
            discovery = self.discovery.is_some(),
            "Inter-service client manager initialized"
        );
    }

    pub async fn get_risk_monitor_client(&self, use_fallback: bool) -> Arc<RiskMonitorClient> {
        self.get_or_create(use_fallback).await
    }

    pub async fn get_test_coordinator_client(
        &self,
        use_fallback: bool,
    ) -> Arc<CoordinatorClient> {
        self.get_or_create(use_fallback).await
    }

    /// Client for `kind`, building it if needed
    pub async fn get_client(&self, kind: ServiceKind, use_fallback: bool) -> ManagedClient {
        match kind {
            ServiceKind::RiskMonitor => {
                ManagedClient::RiskMonitor(self.get_risk_monitor_client(use_fallback).await)
            }
            ServiceKind::TestCoordinator => {
                ManagedClient::TestCoordinator(self.get_test_coordinator_client(use_fallback).await)
            }
        }
    }

    fn cached<C: ManagedService>(&self) -> Option<Arc<C>> {
        self.clients.get(&C::KIND).and_then(|entry| C::unwrap(entry.value()))
    }

    fn construction_lock(&self, kind: ServiceKind) -> &Mutex<()> {
        match kind {
            ServiceKind::RiskMonitor => &self.risk_monitor_lock,
            ServiceKind::TestCoordinator => &self.coordinator_lock,
        }
    }

    async fn get_or_create<C: ManagedService>(&self, use_fallback: bool) -> Arc<C> {
        if let Some(client) = self.cached::<C>() {
            return client;
        }

        // One construction per service; late arrivals see the stored client
        let _guard = self.construction_lock(C::KIND).lock().await;
        if let Some(client) = self.cached::<C>() {
            return client;
        }

        let endpoint = self.resolve_endpoint(C::KIND, use_fallback).await;
        tracing::info!(
            service = %C::KIND,
            host = %endpoint.host,
            port = endpoint.port,
            "Created inter-service client"
        );

        let mut client = C::build(endpoint, Arc::clone(&self.transport), self.settings.clone());
        if let Some(metrics) = &self.metrics {
            client = client.with_metrics(Arc::clone(metrics));
        }
        let client = Arc::new(client);
        self.clients.insert(C::KIND, C::wrap(Arc::clone(&client)));
        client
    }

    /// Ask discovery for the service, falling back to `localhost` and the
    /// service's default port. Discovery failures are logged, never returned.
    #[instrument(skip(self), fields(service = %kind))]
    pub async fn resolve_endpoint(
        &self,
        kind: ServiceKind,
        use_fallback: bool,
    ) -> ServiceEndpoint {
        if let (Some(discovery), false) = (&self.discovery, use_fallback) {
            match discovery.get_service(kind.name()).await {
                Ok(Some(info)) => {
                    tracing::debug!(
                        host = %info.host,
                        port = info.grpc_port,
                        "Resolved service endpoint via service discovery"
                    );
                    return ServiceEndpoint::new(info.host, info.grpc_port);
                }
                Ok(None) => {
                    tracing::debug!("Service not registered, using fallback");
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to resolve service via service discovery, using fallback"
                    );
                }
            }
        }

        let endpoint = ServiceEndpoint::fallback(kind);
        tracing::debug!(
            host = %endpoint.host,
            port = endpoint.port,
            "Using fallback service endpoint"
        );
        endpoint
    }

    /// Pure read of manager state
    pub fn get_manager_stats(&self) -> ManagerStats {
        let mut client_types: Vec<String> = self
            .clients
            .iter()
            .map(|entry| entry.key().name().to_string())
            .collect();
        client_types.sort();

        let active_connections = self
            .clients
            .iter()
            .filter(|entry| entry.value().base().is_connected())
            .count();

        ManagerStats {
            total_clients: client_types.len(),
            active_connections,
            initialized: self.is_initialized(),
            service_discovery_enabled: self.discovery.is_some(),
            client_types,
        }
    }

    /// Stats of every registered client, keyed by service name
    pub fn get_client_stats(&self) -> BTreeMap<String, ClientStats> {
        self.clients
            .iter()
            .map(|entry| (entry.key().name().to_string(), entry.value().base().stats()))
            .collect()
    }

    /// Run `health_check` against every known service
    pub async fn health_check_all(
        &self,
        use_fallback: bool,
    ) -> BTreeMap<ServiceKind, CommResult<HealthResponse>> {
        let checks = ServiceKind::ALL.into_iter().map(|kind| async move {
            let client = self.get_client(kind, use_fallback).await;
            (kind, client.health_check().await)
        });
        join_all(checks).await.into_iter().collect()
    }

    /// Clean up every client, then clear the registry.
    ///
    /// A client that fails to clean up is logged and skipped; the others are
    /// still cleaned and the registry is always emptied.
    #[instrument(skip(self))]
    pub async fn cleanup(&self) {
        let clients: Vec<(ServiceKind, ManagedClient)> = self
            .clients
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let results = join_all(clients.iter().map(|(kind, client)| async move {
            (*kind, client.base().cleanup().await)
        }))
        .await;

        for (kind, result) in results {
            if let Err(e) = result {
                tracing::error!(service = %kind, error = %e, "Error cleaning up client");
            }
        }

        self.clients.clear();
        self.initialized.store(false, Ordering::SeqCst);
        tracing::info!("Inter-service client manager cleanup completed");
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod manager_tests;
