//! Inter-service clients
//!
//! [`ServiceClient`] holds the request pipeline shared by the typed clients;
//! [`InterServiceClientManager`] builds and caches one client per service.

mod base;
mod coordinator;
mod manager;
mod risk_monitor;
mod stats;


pub use base::{ClientSettings, ServiceClient};
pub use coordinator::CoordinatorClient;
pub use manager::{InterServiceClientManager, ManagedClient};
pub use risk_monitor::RiskMonitorClient;
pub use stats::{BreakerSummary, ClientStats, ConnectionStatus, ManagerStats, PerformanceSummary};
