//! Remote service identities and endpoints

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::defaults::{self, ports};

/// Remote services the engine talks to over RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    RiskMonitor,
    TestCoordinator,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 2] = [ServiceKind::RiskMonitor, ServiceKind::TestCoordinator];

    /// Registry name of the service
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::RiskMonitor => "risk-monitor",
            ServiceKind::TestCoordinator => "test-coordinator",
        }
    }

    /// gRPC port used when discovery has no answer
    pub fn default_port(&self) -> u16 {
        match self {
            ServiceKind::RiskMonitor => ports::RISK_MONITOR_GRPC,
            ServiceKind::TestCoordinator => ports::TEST_COORDINATOR_GRPC,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved network location of a service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServiceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `localhost` and the service's default port
    pub fn fallback(kind: ServiceKind) -> Self {
        Self::new(defaults::FALLBACK_HOST, kind.default_port())
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
