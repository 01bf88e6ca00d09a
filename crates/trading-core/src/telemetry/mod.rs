//! Telemetry: performance tracking, request spans, metrics and log setup

pub mod logging;
pub mod metrics;
pub mod performance;
mod spans;

pub use self::metrics::{ConstantLabels, MetricsPort, PrometheusMetrics};
pub use performance::{
    HealthReport, HealthStatus, MonitorConfig, PerformanceMetrics, PerformanceMonitor,
    RequestMetric,
};
pub use spans::{RequestSpan, SpanStatus};
