//! Service registration record

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key prefix under which services are registered
pub const REGISTRY_KEY_PREFIX: &str = "registry:services:";

/// Where a service can be reached, as published to the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub host: String,
    pub http_port: u16,
    pub grpc_port: u16,
    pub status: String,
    pub metadata: HashMap<String, String>,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            name: String::new(),
            version: String::new(),
            host: String::new(),
            http_port: 0,
            grpc_port: 0,
            status: "healthy".to_string(),
            metadata: HashMap::new(),
            registered_at: now,
            last_heartbeat: now,
        }
    }
}

impl ServiceInfo {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        http_port: u16,
        grpc_port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            http_port,
            grpc_port,
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Registry key, e.g. `registry:services:risk-monitor`
    pub fn registry_key(&self) -> String {
        format!("{}{}", REGISTRY_KEY_PREFIX, self.name)
    }

    /// Base HTTP URL, e.g. `http://risk-monitor:8084`
    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.host, self.http_port)
    }

    /// `host:port` of the RPC listener
    pub fn grpc_address(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }
}
