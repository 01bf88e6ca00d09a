//! Tests for the performance monitor

use std::time::Duration;

use super::*;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test(start_paused = true)]
async fn test_empty_monitor_reports_zeros() {
    let monitor = PerformanceMonitor::new("risk-monitor");
    let metrics = monitor.get_metrics();

    assert_eq!(metrics.total_requests, 0);
    assert_eq!(metrics.average_response_time, 0.0);
    assert_eq!(metrics.min_response_time, 0.0);
    assert_eq!(metrics.max_response_time, 0.0);
    assert_eq!(metrics.throughput_per_second, 0.0);
    assert!(metrics.last_request_time.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_first_record_sets_min_and_max() {
    let monitor = PerformanceMonitor::new("risk-monitor");
    monitor.record_request(ms(250), true, "health_check");

    let metrics = monitor.get_metrics();
    assert!(approx(metrics.min_response_time, 0.25));
    assert!(approx(metrics.max_response_time, 0.25));
    assert!(approx(metrics.average_response_time, 0.25));
    assert!(metrics.last_request_time.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_average_is_total_over_count() {
    let monitor = PerformanceMonitor::new("risk-monitor");
    let durations = [10, 20, 30, 100, 40];
    for (i, d) in durations.iter().enumerate() {
        monitor.record_request(ms(*d), i % 2 == 0, "get_risk_metrics");
    }

    let metrics = monitor.get_metrics();
    assert_eq!(metrics.total_requests, 5);
    assert_eq!(metrics.successful_requests, 3);
    assert_eq!(metrics.failed_requests, 2);
    assert!(approx(metrics.average_response_time, 0.2 / 5.0));
    assert!(approx(metrics.min_response_time, 0.01));
    assert!(approx(metrics.max_response_time, 0.1));
    assert!(approx(metrics.throughput_per_second, 5.0 / 60.0));
}

#[tokio::test(start_paused = true)]
async fn test_lifetime_min_max_survive_eviction() {
    let monitor = PerformanceMonitor::with_config(
        "risk-monitor",
        MonitorConfig {
            window_size: 3,
            ..Default::default()
        },
    );

    monitor.record_request(ms(1), true, "op");
    monitor.record_request(ms(900), true, "op");
    for _ in 0..5 {
        monitor.record_request(ms(50), true, "op");
    }

    let lifetime = monitor.get_metrics();
    assert_eq!(lifetime.total_requests, 7);
    assert!(approx(lifetime.min_response_time, 0.001));
    assert!(approx(lifetime.max_response_time, 0.9));

    let recent = monitor.get_recent_metrics(Duration::from_secs(60));
    assert_eq!(recent.total_requests, 3);
    assert!(approx(recent.min_response_time, 0.05));
    assert!(approx(recent.max_response_time, 0.05));
}

#[tokio::test(start_paused = true)]
async fn test_recent_metrics_window_over_simulated_time() {
    let monitor = PerformanceMonitor::new("test-coordinator");

    // 1500 alternating outcomes, one every 100ms
    for i in 0..1500 {
        monitor.record_request(ms(20), i % 2 == 0, "submit_scenario_status");
        tokio::time::advance(ms(100)).await;
    }

    let lifetime = monitor.get_metrics();
    assert_eq!(lifetime.total_requests, 1500);
    assert_eq!(lifetime.successful_requests, 750);
    // Entries recorded at or after now - 60s: 89.9s .. 149.9s at record time
    assert!(approx(lifetime.throughput_per_second, 601.0 / 60.0));

    let recent = monitor.get_recent_metrics(Duration::from_secs(60));
    assert_eq!(recent.total_requests, 600);
    assert_eq!(recent.successful_requests, 300);
    assert!(approx(recent.throughput_per_second, 10.0));
}

#[tokio::test(start_paused = true)]
async fn test_recent_metrics_empty_when_nothing_qualifies() {
    let monitor = PerformanceMonitor::new("risk-monitor");
    monitor.record_request(ms(5), true, "health_check");
    tokio::time::advance(Duration::from_secs(120)).await;

    assert_eq!(
        monitor.get_recent_metrics(Duration::from_secs(60)),
        PerformanceMetrics::default()
    );
}

#[tokio::test(start_paused = true)]
async fn test_operation_metrics_grouped_by_label() {
    let monitor = PerformanceMonitor::new("risk-monitor");
    monitor.record_request(ms(10), true, "health_check");
    monitor.record_request(ms(30), true, "health_check");
    tokio::time::advance(Duration::from_secs(90)).await;
    monitor.record_request(ms(40), false, "get_risk_metrics");

    let by_op = monitor.get_operation_metrics();
    assert_eq!(by_op.len(), 2);

    let health = &by_op["health_check"];
    assert_eq!(health.total_requests, 2);
    assert!(approx(health.average_response_time, 0.02));
    // Outside the 60s sub-window
    assert_eq!(health.throughput_per_second, 0.0);

    let risk = &by_op["get_risk_metrics"];
    assert_eq!(risk.failed_requests, 1);
    assert!(approx(risk.throughput_per_second, 1.0 / 60.0));
}

#[tokio::test(start_paused = true)]
async fn test_health_classification_thresholds() {
    let cases = [
        (100, 0, HealthStatus::Healthy),
        (95, 5, HealthStatus::Healthy),
        (94, 6, HealthStatus::Degraded),
        (90, 10, HealthStatus::Degraded),
        (89, 11, HealthStatus::Unhealthy),
    ];

    for (ok, failed, expected) in cases {
        let monitor = PerformanceMonitor::new("risk-monitor");
        for _ in 0..ok {
            monitor.record_request(ms(1), true, "op");
        }
        for _ in 0..failed {
            monitor.record_request(ms(1), false, "op");
        }

        let report = monitor.get_health_status();
        assert_eq!(report.status, expected, "{} ok / {} failed", ok, failed);
        assert_eq!(report.total_requests, ok + failed);
    }
}

#[tokio::test(start_paused = true)]
async fn test_no_recent_data_is_healthy() {
    let monitor = PerformanceMonitor::new("risk-monitor");
    monitor.record_request(ms(1), false, "op");
    tokio::time::advance(Duration::from_secs(61)).await;

    let report = monitor.get_health_status();
    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.success_rate, 1.0);
    assert_eq!(report.total_requests, 0);
}

#[tokio::test(start_paused = true)]
async fn test_reset_restores_initial_state() {
    let monitor = PerformanceMonitor::new("risk-monitor");
    monitor.record_request(ms(300), false, "op");
    monitor.reset_metrics();

    assert_eq!(monitor.get_metrics(), PerformanceMetrics::default());
    assert!(monitor.get_operation_metrics().is_empty());

    monitor.record_request(ms(7), true, "op");
    let metrics = monitor.get_metrics();
    assert!(approx(metrics.min_response_time, 0.007));
    assert!(approx(metrics.max_response_time, 0.007));
}
