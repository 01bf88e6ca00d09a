//! Diagnostic snapshots of clients and the manager

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::resilience::{CircuitBreakerStats, CircuitState};
use crate::telemetry::{HealthReport, PerformanceMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Circuit breaker part of [`ClientStats`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakerSummary {
    pub state: CircuitState,
    pub failure_count: u32,
    pub total_calls: u64,
    pub rejected_calls: u64,
    pub success_rate: f64,
}

impl From<&CircuitBreakerStats> for BreakerSummary {
    fn from(stats: &CircuitBreakerStats) -> Self {
        Self {
            state: stats.state,
            failure_count: stats.failure_count,
            total_calls: stats.total_calls,
            rejected_calls: stats.rejected_calls,
            success_rate: stats.success_rate(),
        }
    }
}

/// Latency part of [`ClientStats`], in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub average_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub throughput_per_second: f64,
}

impl From<&PerformanceMetrics> for PerformanceSummary {
    fn from(metrics: &PerformanceMetrics) -> Self {
        Self {
            average_response_time: metrics.average_response_time,
            min_response_time: metrics.min_response_time,
            max_response_time: metrics.max_response_time,
            throughput_per_second: metrics.throughput_per_second,
        }
    }
}

/// Full diagnostic bundle for one client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientStats {
    pub service: String,
    pub address: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub last_request_time: Option<DateTime<Utc>>,
    pub connection_status: ConnectionStatus,
    pub circuit_breaker: BreakerSummary,
    pub performance: PerformanceSummary,
    pub health: HealthReport,
}

/// Manager-wide snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerStats {
    pub total_clients: usize,
    pub active_connections: usize,
    pub initialized: bool,
    pub service_discovery_enabled: bool,
    /// Registered service names, sorted
    pub client_types: Vec<String>,
}
