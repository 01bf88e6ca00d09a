//! Rolling-window performance monitor

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::time::Instant;

use super::types::{HealthReport, HealthStatus, MonitorConfig, PerformanceMetrics, RequestMetric};

/// Latency, throughput and success statistics for one remote service.
///
/// Lifetime aggregates are maintained on every record and are never decayed;
/// the bounded history window only feeds the time-scoped queries.
#[derive(Debug)]
pub struct PerformanceMonitor {
    service: String,
    config: MonitorConfig,
    inner: RwLock<MonitorInner>,
}

#[derive(Debug)]
struct MonitorInner {
    history: VecDeque<RequestMetric>,
    /// Completion times inside the throughput window
    throughput: VecDeque<Instant>,
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    /// Seconds
    total_duration: f64,
    min_duration: f64,
    max_duration: f64,
    last_request_time: Option<DateTime<Utc>>,
}

impl MonitorInner {
    fn new(window_size: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(window_size.min(4096)),
            throughput: VecDeque::new(),
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            total_duration: 0.0,
            min_duration: f64::INFINITY,
            max_duration: 0.0,
            last_request_time: None,
        }
    }
}

impl PerformanceMonitor {
    pub fn new(service: impl Into<String>) -> Self {
        Self::with_config(service, MonitorConfig::default())
    }

    pub fn with_config(service: impl Into<String>, config: MonitorConfig) -> Self {
        let inner = MonitorInner::new(config.window_size);
        Self {
            service: service.into(),
            config,
            inner: RwLock::new(inner),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Record the outcome of one completed call
    pub fn record_request(&self, duration: Duration, success: bool, operation: &str) {
        let now = Instant::now();
        let secs = duration.as_secs_f64();
        let metric = RequestMetric {
            timestamp: now,
            recorded_at: Utc::now(),
            duration,
            success,
            operation: operation.to_string(),
        };

        {
            let mut inner = self.inner.write();

            if inner.history.len() >= self.config.window_size {
                inner.history.pop_front();
            }
            inner.last_request_time = Some(metric.recorded_at);
            inner.history.push_back(metric);

            inner.total_requests += 1;
            if success {
                inner.successful_requests += 1;
            } else {
                inner.failed_requests += 1;
            }
            inner.total_duration += secs;
            inner.min_duration = inner.min_duration.min(secs);
            inner.max_duration = inner.max_duration.max(secs);

            inner.throughput.push_back(now);
            if let Some(cutoff) = now.checked_sub(self.config.throughput_window) {
                while inner.throughput.front().is_some_and(|t| *t < cutoff) {
                    inner.throughput.pop_front();
                }
            }
        }

        tracing::debug!(
            service = %self.service,
            operation,
            duration_ms = secs * 1000.0,
            success,
            "Request recorded"
        );
    }

    /// Lifetime aggregates; throughput covers the throughput window
    pub fn get_metrics(&self) -> PerformanceMetrics {
        let inner = self.inner.read();
        let average_response_time = if inner.total_requests > 0 {
            inner.total_duration / inner.total_requests as f64
        } else {
            0.0
        };
        let min_response_time = if inner.min_duration.is_finite() {
            inner.min_duration
        } else {
            0.0
        };

        PerformanceMetrics {
            total_requests: inner.total_requests,
            successful_requests: inner.successful_requests,
            failed_requests: inner.failed_requests,
            average_response_time,
            min_response_time,
            max_response_time: inner.max_duration,
            last_request_time: inner.last_request_time,
            throughput_per_second: inner.throughput.len() as f64
                / self.config.throughput_window.as_secs_f64(),
        }
    }

    /// Metrics over the history entries recorded within the last `window`
    pub fn get_recent_metrics(&self, window: Duration) -> PerformanceMetrics {
        if window.is_zero() {
            return PerformanceMetrics::default();
        }

        let cutoff = Instant::now().checked_sub(window);
        let inner = self.inner.read();
        let recent: Vec<&RequestMetric> = inner
            .history
            .iter()
            .filter(|m| cutoff.is_none_or(|c| m.timestamp >= c))
            .collect();

        let throughput = recent.len() as f64 / window.as_secs_f64();
        PerformanceMetrics::from_requests(recent, throughput)
    }

    /// Metrics for each operation label in the history window
    pub fn get_operation_metrics(&self) -> BTreeMap<String, PerformanceMetrics> {
        let window = self.config.throughput_window;
        let cutoff = Instant::now().checked_sub(window);
        let inner = self.inner.read();

        let mut groups: HashMap<&str, Vec<&RequestMetric>> = HashMap::new();
        for metric in &inner.history {
            groups.entry(metric.operation.as_str()).or_default().push(metric);
        }

        groups
            .into_iter()
            .map(|(operation, requests)| {
                let recent = requests
                    .iter()
                    .filter(|m| cutoff.is_none_or(|c| m.timestamp >= c))
                    .count();
                let throughput = recent as f64 / window.as_secs_f64();
                (
                    operation.to_string(),
                    PerformanceMetrics::from_requests(requests, throughput),
                )
            })
            .collect()
    }

    /// Classify health from the success rate over the throughput window
    pub fn get_health_status(&self) -> HealthReport {
        let metrics = self.get_recent_metrics(self.config.throughput_window);
        let success_rate = metrics.success_rate();

        let status = if success_rate >= self.config.healthy_threshold {
            HealthStatus::Healthy
        } else if success_rate >= self.config.degraded_threshold {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        };

        HealthReport {
            status,
            success_rate,
            average_response_time: metrics.average_response_time,
            throughput: metrics.throughput_per_second,
            total_requests: metrics.total_requests,
        }
    }

    /// Clear the history, the throughput window and all aggregates
    pub fn reset_metrics(&self) {
        *self.inner.write() = MonitorInner::new(self.config.window_size);
        tracing::info!(service = %self.service, "Performance metrics reset");
    }
}
