//! Tests for the Prometheus metrics adapter

use super::*;

fn labels() -> ConstantLabels {
    ConstantLabels {
        service: "trading-system-engine".to_string(),
        instance: "trading-system-engine-LH".to_string(),
        version: "0.1.0".to_string(),
    }
}

/// Value of the first sample of `name` whose label set contains every `needle`
fn sample(rendered: &str, name: &str, needles: &[&str]) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| line.starts_with(&format!("{}{{", name)))
        .find(|line| needles.iter().all(|needle| line.contains(needle)))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

#[test]
fn test_constant_labels_skip_empty_values() {
    let mut constant = labels();
    constant.instance.clear();
    let names: Vec<&str> = constant.pairs().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["service", "version"]);
}

#[test]
fn test_counter_carries_constant_and_call_labels() {
    let metrics = PrometheusMetrics::new(labels()).unwrap();
    let call = [
        ("target", "risk-monitor".to_string()),
        ("operation", "health_check".to_string()),
    ];
    metrics.inc_counter(names::RPC_REQUESTS_TOTAL, &call);
    metrics.inc_counter(names::RPC_REQUESTS_TOTAL, &call);

    let rendered = metrics.render();
    assert!(rendered.contains("# TYPE rpc_client_requests_total counter"));
    let value = sample(
        &rendered,
        names::RPC_REQUESTS_TOTAL,
        &[
            r#"target="risk-monitor""#,
            r#"operation="health_check""#,
            r#"service="trading-system-engine""#,
            r#"instance="trading-system-engine-LH""#,
            r#"version="0.1.0""#,
        ],
    );
    assert_eq!(value, Some(2.0));
}

#[test]
fn test_histogram_uses_request_buckets() {
    let metrics = PrometheusMetrics::new(labels()).unwrap();
    let call = [("target", "test-coordinator".to_string())];
    metrics.observe_histogram(names::RPC_REQUEST_DURATION_SECONDS, 0.02, &call);
    metrics.observe_histogram(names::RPC_REQUEST_DURATION_SECONDS, 3.0, &call);

    let rendered = metrics.render();
    assert!(rendered.contains("# TYPE rpc_client_request_duration_seconds histogram"));

    let bucket = "rpc_client_request_duration_seconds_bucket";
    assert_eq!(sample(&rendered, bucket, &[r#"le="0.01""#]), Some(0.0));
    assert_eq!(sample(&rendered, bucket, &[r#"le="0.025""#]), Some(1.0));
    assert_eq!(sample(&rendered, bucket, &[r#"le="2.5""#]), Some(1.0));
    assert_eq!(sample(&rendered, bucket, &[r#"le="+Inf""#]), Some(2.0));
    assert_eq!(
        sample(&rendered, "rpc_client_request_duration_seconds_count", &[]),
        Some(2.0)
    );
}

#[test]
fn test_gauge_keeps_last_value() {
    let metrics = PrometheusMetrics::new(labels()).unwrap();
    let dependency = [("dependency", "risk-monitor".to_string())];
    metrics.set_gauge(names::DEPENDENCY_READY, 1.0, &dependency);
    metrics.set_gauge(names::DEPENDENCY_READY, 0.0, &dependency);

    let rendered = metrics.render();
    assert_eq!(
        sample(&rendered, names::DEPENDENCY_READY, &[r#"dependency="risk-monitor""#]),
        Some(0.0)
    );
}

#[test]
fn test_adapters_keep_separate_registries() {
    let first = PrometheusMetrics::new(labels()).unwrap();
    let second = PrometheusMetrics::new(labels()).unwrap();
    first.inc_counter(names::HTTP_REQUESTS_TOTAL, &[("code", "200".to_string())]);

    assert!(sample(&first.render(), names::HTTP_REQUESTS_TOTAL, &[]).is_some());
    assert!(sample(&second.render(), names::HTTP_REQUESTS_TOTAL, &[]).is_none());
}
