//! Request performance tracking
//!
//! Records per-call latency and outcome for one service and derives rolling
//! statistics and a health classification from them.

mod monitor;
mod types;

#[cfg(test)]
mod tests;

pub use monitor::PerformanceMonitor;
pub use types::{HealthReport, HealthStatus, MonitorConfig, PerformanceMetrics, RequestMetric};
