//! Backend-neutral metrics interface

use serde::Serialize;

use crate::config::ServiceConfig;

/// Sink for counters, histograms and gauges.
///
/// Labels are `(name, value)` pairs. Implementations add their constant
/// labels themselves, so callers only pass the per-observation ones.
pub trait MetricsPort: Send + Sync {
    /// Add one to a counter
    fn inc_counter(&self, name: &str, labels: &[(&'static str, String)]);

    /// Record one observation, in base units (seconds for durations)
    fn observe_histogram(&self, name: &str, value: f64, labels: &[(&'static str, String)]);

    fn set_gauge(&self, name: &str, value: f64, labels: &[(&'static str, String)]);

    /// Everything recorded so far in Prometheus text exposition format
    fn render(&self) -> String;
}

/// Labels attached to every series of one engine instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantLabels {
    pub service: String,
    pub instance: String,
    pub version: String,
}

impl ConstantLabels {
    /// Non-empty labels, in `service`, `instance`, `version` order
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("service", &self.service),
            ("instance", &self.instance),
            ("version", &self.version),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name, value.clone()))
        .collect()
    }
}

impl From<&ServiceConfig> for ConstantLabels {
    fn from(service: &ServiceConfig) -> Self {
        Self {
            service: service.name.clone(),
            instance: service.instance_name.clone(),
            version: service.version.clone(),
        }
    }
}
