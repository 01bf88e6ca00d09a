//! Trading Engine Core Library
//!
//! Resilient inter-service communication for the trading system engine:
//! a circuit breaker, a rolling-window performance monitor, per-service RPC
//! clients behind a swappable transport, the client manager that builds and
//! caches them, and a cached configuration-service client. A metrics port
//! with a Prometheus adapter records RED metrics, and a small HTTP surface
//! exposes health, readiness and metrics.

pub mod api;
pub mod clients;
pub mod config;
pub mod configuration;
pub mod discovery;
pub mod error;
pub mod resilience;
pub mod rpc;
pub mod telemetry;

// Re-export commonly used types
pub use clients::{
    ClientSettings, ClientStats, CoordinatorClient, InterServiceClientManager, ManagerStats,
    RiskMonitorClient, ServiceClient,
};
pub use config::{ConfigLoader, EngineConfig};
pub use configuration::{ConfigurationServiceClient, ConfigurationValue};
pub use discovery::{ServiceDiscovery, ServiceInfo, StaticServiceDiscovery};
pub use error::{
    CommResult, ConfigurationError, ServiceCommunicationError, TradingError, TradingResult,
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use rpc::{HttpJsonTransport, InMemoryTransport, RpcChannel, RpcTransport, ServiceKind};
pub use telemetry::{
    ConstantLabels, HealthStatus, MetricsPort, PerformanceMonitor, PrometheusMetrics,
};
