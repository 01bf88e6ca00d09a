//! Service discovery trait and in-memory registry

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::types::ServiceInfo;
use crate::error::TradingResult;

/// Looks up where a named service currently lives
#[async_trait]
pub trait ServiceDiscovery: Send + Sync {
    /// All registered services, or only those named `name`
    async fn discover_services(&self, name: Option<&str>) -> TradingResult<Vec<ServiceInfo>>;

    /// First registration for `name`, if any
    async fn get_service(&self, name: &str) -> TradingResult<Option<ServiceInfo>> {
        Ok(self.discover_services(Some(name)).await?.into_iter().next())
    }
}

/// Discovery backed by a fixed in-process table
#[derive(Debug, Default)]
pub struct StaticServiceDiscovery {
    services: DashMap<String, ServiceInfo>,
}

impl StaticServiceDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of registrations; later duplicates win
    pub fn from_services(services: impl IntoIterator<Item = ServiceInfo>) -> Self {
        let discovery = Self::new();
        for service in services {
            discovery.register(service);
        }
        discovery
    }

    /// Add or replace a registration
    pub fn register(&self, mut service: ServiceInfo) {
        service.last_heartbeat = Utc::now();
        tracing::info!(
            service = %service.name,
            address = %service.grpc_address(),
            key = %service.registry_key(),
            "Service registered"
        );
        self.services.insert(service.name.clone(), service);
    }

    /// Remove a registration, returning it if it existed
    pub fn deregister(&self, name: &str) -> Option<ServiceInfo> {
        let removed = self.services.remove(name).map(|(_, info)| info);
        if removed.is_some() {
            tracing::info!(service = %name, "Service deregistered");
        }
        removed
    }

    /// Snapshot of all registrations, sorted by name
    pub fn services(&self) -> Vec<ServiceInfo> {
        let mut services: Vec<ServiceInfo> =
            self.services.iter().map(|entry| entry.value().clone()).collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[async_trait]
impl ServiceDiscovery for StaticServiceDiscovery {
    async fn discover_services(&self, name: Option<&str>) -> TradingResult<Vec<ServiceInfo>> {
        Ok(match name {
            Some(name) => self
                .services
                .get(name)
                .map(|entry| vec![entry.value().clone()])
                .unwrap_or_default(),
            None => self.services(),
        })
    }
}
