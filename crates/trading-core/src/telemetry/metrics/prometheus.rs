//! Prometheus-backed [`MetricsPort`]
//!
//! Each adapter owns its recorder instead of installing a global one, so
//! several engines (or tests) in one process keep separate registries.

use metrics::{Label, describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use super::names;
use super::port::{ConstantLabels, MetricsPort};
use crate::error::{TradingError, TradingResult};

/// Content type of the text exposition format
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Histogram buckets, in seconds, for request latencies
pub const REQUEST_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

pub struct PrometheusMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    constant_labels: ConstantLabels,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics")
            .field("constant_labels", &self.constant_labels)
            .finish()
    }
}

impl PrometheusMetrics {
    pub fn new(constant_labels: ConstantLabels) -> TradingResult<Self> {
        let mut builder = PrometheusBuilder::new()
            .set_buckets(REQUEST_DURATION_BUCKETS)
            .map_err(|e| TradingError::config(format!("Invalid histogram buckets: {}", e)))?;
        for (name, value) in constant_labels.pairs() {
            builder = builder.add_global_label(name, value);
        }

        let recorder = builder.build_recorder();
        let handle = recorder.handle();
        let adapter = Self {
            recorder,
            handle,
            constant_labels,
        };
        adapter.describe();

        tracing::info!(
            service = %adapter.constant_labels.service,
            instance = %adapter.constant_labels.instance,
            "Prometheus metrics adapter initialized"
        );
        Ok(adapter)
    }

    pub fn constant_labels(&self) -> &ConstantLabels {
        &self.constant_labels
    }

    fn describe(&self) {
        metrics::with_local_recorder(&self.recorder, || {
            describe_counter!(names::RPC_REQUESTS_TOTAL, "Inter-service requests issued");
            describe_counter!(
                names::RPC_REQUEST_ERRORS_TOTAL,
                "Inter-service requests that failed, by error kind"
            );
            describe_histogram!(
                names::RPC_REQUEST_DURATION_SECONDS,
                "Inter-service request duration in seconds"
            );
            describe_gauge!(
                names::RPC_CIRCUIT_STATE,
                "Circuit breaker state per target (0 closed, 1 half-open, 2 open)"
            );
            describe_counter!(names::HTTP_REQUESTS_TOTAL, "HTTP requests served");
            describe_counter!(
                names::HTTP_REQUEST_ERRORS_TOTAL,
                "HTTP requests answered with a 4xx or 5xx status"
            );
            describe_histogram!(
                names::HTTP_REQUEST_DURATION_SECONDS,
                "HTTP request duration in seconds"
            );
            describe_gauge!(
                names::DEPENDENCY_READY,
                "Whether a downstream dependency is usable (1) or not (0)"
            );
        });
    }
}

fn to_labels(labels: &[(&'static str, String)]) -> Vec<Label> {
    labels
        .iter()
        .map(|(name, value)| Label::new(*name, value.clone()))
        .collect()
}

impl MetricsPort for PrometheusMetrics {
    fn inc_counter(&self, name: &str, labels: &[(&'static str, String)]) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::counter!(name.to_string(), to_labels(labels)).increment(1);
        });
    }

    fn observe_histogram(&self, name: &str, value: f64, labels: &[(&'static str, String)]) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::histogram!(name.to_string(), to_labels(labels)).record(value);
        });
    }

    fn set_gauge(&self, name: &str, value: f64, labels: &[(&'static str, String)]) {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::gauge!(name.to_string(), to_labels(labels)).set(value);
        });
    }

    fn render(&self) -> String {
        self.handle.render()
    }
}
