//! Metrics port and its Prometheus adapter
//!
//! Instrumented code records through [`MetricsPort`] and never names a
//! backend. Every series carries the constant `service`, `instance` and
//! `version` labels of the running engine.

mod port;
mod prometheus;

pub use port::{ConstantLabels, MetricsPort};
pub use prometheus::{PROMETHEUS_CONTENT_TYPE, PrometheusMetrics, REQUEST_DURATION_BUCKETS};

/// Metric names recorded by the engine
pub mod names {
    /// Counter `{target, operation}`
    pub const RPC_REQUESTS_TOTAL: &str = "rpc_client_requests_total";
    /// Counter `{target, operation, kind}`
    pub const RPC_REQUEST_ERRORS_TOTAL: &str = "rpc_client_request_errors_total";
    /// Histogram `{target, operation}`, seconds
    pub const RPC_REQUEST_DURATION_SECONDS: &str = "rpc_client_request_duration_seconds";
    /// Gauge `{target}`: 0 closed, 1 half-open, 2 open
    pub const RPC_CIRCUIT_STATE: &str = "rpc_client_circuit_state";

    /// Counter `{method, route, code}`
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    /// Counter `{method, route, code}` for responses with code >= 400
    pub const HTTP_REQUEST_ERRORS_TOTAL: &str = "http_request_errors_total";
    /// Histogram `{method, route, code}`, seconds
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

    /// Gauge `{dependency}`: 1 ready, 0 not ready
    pub const DEPENDENCY_READY: &str = "service_dependency_ready";
}

#[cfg(test)]
mod tests;
