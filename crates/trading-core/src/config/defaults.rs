//! Centralized default values
//!
//! Every default used by the engine lives here so the config model, the
//! loader and the clients agree on one set of numbers. All values can be
//! overridden through `EngineConfig`.

use std::time::Duration;

/// Name this engine registers under
pub const ENGINE_SERVICE_NAME: &str = "trading-system-engine";

/// Version reported by the engine
pub const ENGINE_VERSION: &str = "0.1.0";

/// Interface the HTTP server binds to
pub const SERVER_HOST: &str = "0.0.0.0";

/// Host used when a service cannot be resolved through discovery
pub const FALLBACK_HOST: &str = "localhost";

/// Well-known service ports
pub mod ports {
    /// (service name, HTTP port, gRPC port)
    pub const SERVICE_PORTS: &[(&str, u16, u16)] = &[
        ("trading-system-engine", 8082, 50052),
        ("risk-monitor", 8084, 50054),
        ("test-coordinator", 8083, 50053),
        ("configuration-service", 8090, 50090),
    ];

    /// HTTP port of this engine
    pub const ENGINE_HTTP: u16 = 8082;

    /// Fallback gRPC port of the risk monitor
    pub const RISK_MONITOR_GRPC: u16 = 50054;

    /// Fallback gRPC port of the test coordinator
    pub const TEST_COORDINATOR_GRPC: u16 = 50053;

    /// HTTP port of the configuration service
    pub const CONFIGURATION_SERVICE_HTTP: u16 = 8090;

    /// Look up the HTTP port of a well-known service
    pub fn http_port(service: &str) -> Option<u16> {
        SERVICE_PORTS
            .iter()
            .find(|(name, _, _)| *name == service)
            .map(|(_, http, _)| *http)
    }

    /// Look up the gRPC port of a well-known service
    pub fn grpc_port(service: &str) -> Option<u16> {
        SERVICE_PORTS
            .iter()
            .find(|(name, _, _)| *name == service)
            .map(|(_, _, grpc)| *grpc)
    }
}

/// Default gRPC client timeouts
pub mod grpc {
    use super::*;

    /// Per-request deadline (30 seconds)
    pub const REQUEST_SECS: u64 = 30;

    /// Channel establishment deadline (10 seconds)
    pub const CONNECTION_SECS: u64 = 10;

    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_SECS)
    }

    pub fn connection_timeout() -> Duration {
        Duration::from_secs(CONNECTION_SECS)
    }
}

/// Default circuit breaker settings
pub mod circuit_breaker {
    use super::*;

    /// Consecutive failures before the breaker opens
    pub const FAILURE_THRESHOLD: u32 = 5;

    /// Cooldown before a trial call is allowed (60 seconds)
    pub const RECOVERY_TIMEOUT_SECS: u64 = 60;

    /// Trial calls admitted while half-open
    pub const HALF_OPEN_MAX_CALLS: u32 = 1;

    pub fn recovery_timeout() -> Duration {
        Duration::from_secs(RECOVERY_TIMEOUT_SECS)
    }
}

/// Default performance monitor settings
pub mod performance {
    use super::*;

    /// Request outcomes kept in the rolling window
    pub const WINDOW_SIZE: usize = 1000;

    /// Span of the throughput window (60 seconds)
    pub const THROUGHPUT_WINDOW_SECS: u64 = 60;

    /// Minimum recent success rate reported as healthy
    pub const HEALTHY_THRESHOLD: f64 = 0.95;

    /// Minimum recent success rate reported as degraded
    pub const DEGRADED_THRESHOLD: f64 = 0.90;

    pub fn throughput_window() -> Duration {
        Duration::from_secs(THROUGHPUT_WINDOW_SECS)
    }
}

/// Default configuration-service client settings
pub mod configuration_service {
    use super::*;

    /// Lifetime of a cached configuration value (5 minutes)
    pub const CACHE_TTL_SECS: u64 = 300;

    /// HTTP request deadline (10 seconds)
    pub const REQUEST_SECS: u64 = 10;

    /// Value types the configuration service may return
    pub const VALID_CONFIG_TYPES: &[&str] = &["string", "number", "boolean", "json"];

    pub fn cache_ttl() -> Duration {
        Duration::from_secs(CACHE_TTL_SECS)
    }

    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_SECS)
    }
}
