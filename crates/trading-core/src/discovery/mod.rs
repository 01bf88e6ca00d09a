//! Service discovery
//!
//! Maps a logical service name to its current host and ports.

mod registry;
mod types;

pub use registry::{ServiceDiscovery, StaticServiceDiscovery};
pub use types::{REGISTRY_KEY_PREFIX, ServiceInfo};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_info_addresses() {
        let info =
            ServiceInfo::new("risk-monitor", "risk-monitor-om", 8084, 50054).with_version("0.3.1");
        assert_eq!(info.version, "0.3.1");
        assert_eq!(info.registry_key(), "registry:services:risk-monitor");
        assert_eq!(info.http_url(), "http://risk-monitor-om:8084");
        assert_eq!(info.grpc_address(), "risk-monitor-om:50054");
        assert_eq!(info.status, "healthy");
    }

    #[tokio::test]
    async fn test_static_discovery_lookup() {
        let discovery = StaticServiceDiscovery::from_services([
            ServiceInfo::new("test-coordinator", "coord", 8083, 50053),
            ServiceInfo::new("risk-monitor", "risk", 8084, 50054),
        ]);

        let found = discovery.get_service("risk-monitor").await.unwrap().unwrap();
        assert_eq!(found.host, "risk");
        assert!(discovery.get_service("missing").await.unwrap().is_none());

        let all = discovery.discover_services(None).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["risk-monitor", "test-coordinator"]);
    }

    #[tokio::test]
    async fn test_register_replaces_and_deregister_removes() {
        let discovery = StaticServiceDiscovery::new();
        discovery.register(ServiceInfo::new("risk-monitor", "old", 8084, 50054));
        discovery.register(ServiceInfo::new("risk-monitor", "new", 8084, 50054));
        assert_eq!(discovery.len(), 1);
        assert_eq!(discovery.services()[0].host, "new");

        assert!(discovery.deregister("risk-monitor").is_some());
        assert!(discovery.deregister("risk-monitor").is_none());
        assert!(discovery.is_empty());
    }
}
