//! Performance monitor types

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::defaults::performance as defaults;

/// Settings for a performance monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Request outcomes kept in the rolling window
    pub window_size: usize,
    /// Span used for throughput and health calculations
    #[serde(with = "humantime_serde")]
    pub throughput_window: Duration,
    /// Minimum recent success rate reported as healthy
    pub healthy_threshold: f64,
    /// Minimum recent success rate reported as degraded
    pub degraded_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_size: defaults::WINDOW_SIZE,
            throughput_window: defaults::throughput_window(),
            healthy_threshold: defaults::HEALTHY_THRESHOLD,
            degraded_threshold: defaults::DEGRADED_THRESHOLD,
        }
    }
}

/// Outcome of one completed remote call
#[derive(Debug, Clone)]
pub struct RequestMetric {
    /// Monotonic completion time, used for windowing
    pub timestamp: Instant,
    /// Wall-clock completion time, used for reporting
    pub recorded_at: DateTime<Utc>,
    pub duration: Duration,
    pub success: bool,
    pub operation: String,
}

/// Aggregated request statistics. Durations are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub last_request_time: Option<DateTime<Utc>>,
    pub throughput_per_second: f64,
}

impl PerformanceMetrics {
    /// Build metrics from a non-empty slice of requests
    pub(super) fn from_requests<'a>(
        requests: impl IntoIterator<Item = &'a RequestMetric>,
        throughput_per_second: f64,
    ) -> Self {
        let mut metrics = Self {
            min_response_time: f64::INFINITY,
            throughput_per_second,
            ..Self::default()
        };
        let mut total_duration = 0.0;

        for request in requests {
            let secs = request.duration.as_secs_f64();
            metrics.total_requests += 1;
            if request.success {
                metrics.successful_requests += 1;
            } else {
                metrics.failed_requests += 1;
            }
            total_duration += secs;
            metrics.min_response_time = metrics.min_response_time.min(secs);
            metrics.max_response_time = metrics.max_response_time.max(secs);
            metrics.last_request_time = metrics.last_request_time.max(Some(request.recorded_at));
        }

        if metrics.total_requests == 0 {
            return Self::default();
        }
        metrics.average_response_time = total_duration / metrics.total_requests as f64;
        metrics
    }

    /// Successful fraction of requests, 1.0 when there were none
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            1.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }
}

/// Health classification derived from the recent success rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a health evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub success_rate: f64,
    pub average_response_time: f64,
    pub throughput: f64,
    pub total_requests: u64,
}
