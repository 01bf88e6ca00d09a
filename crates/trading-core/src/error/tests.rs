//! Tests for error types

use std::error::Error;
use std::time::Duration;

use super::*;

#[test]
fn test_communication_error_display_with_context() {
    let err = ServiceCommunicationError::timeout("risk-monitor", Duration::from_secs(30))
        .with_operation("health_check");

    assert_eq!(
        err.to_string(),
        "Request timeout after 30s (service: risk-monitor, operation: health_check)"
    );
    assert!(err.is_timeout());
}

#[test]
fn test_communication_error_display_without_context() {
    let err = ServiceCommunicationError::new(CommunicationErrorKind::Unexpected, "boom");
    assert_eq!(err.to_string(), "boom");
    assert!(err.service().is_none());
    assert!(err.operation().is_none());
}

#[test]
fn test_wrap_transport_error_is_remote() {
    let err = ServiceCommunicationError::wrap(
        "test-coordinator",
        "report_chaos_event",
        TradingError::transport_with_status("unavailable", 503),
    );

    assert_eq!(err.kind(), CommunicationErrorKind::Remote);
    assert_eq!(err.service(), Some("test-coordinator"));
    assert_eq!(err.operation(), Some("report_chaos_event"));
    assert!(err.source().is_some());
    assert!(matches!(
        err.original_error(),
        Some(TradingError::Transport {
            status_code: Some(503),
            ..
        })
    ));
}

#[test]
fn test_wrap_other_error_is_unexpected() {
    let err = ServiceCommunicationError::wrap(
        "risk-monitor",
        "get_risk_metrics",
        TradingError::json("missing field `risk_score`"),
    );

    assert_eq!(err.kind(), CommunicationErrorKind::Unexpected);
    assert!(err.message().starts_with("Unexpected error in get_risk_metrics"));
}

#[test]
fn test_trading_error_context() {
    let err = TradingError::config("bad value").with_context("loading trading.toml");
    assert_eq!(err.context(), Some("loading trading.toml"));
    assert_eq!(err.error_code(), "TRADING_CONFIG");
}

#[test]
fn test_result_ext_context() {
    let result: Result<(), &str> = Err("disk full");
    let err = result.context("writing snapshot").unwrap_err();
    assert_eq!(err.to_string(), "Error: writing snapshot: disk full");
}

#[test]
fn test_communication_round_trips_through_trading_error() {
    let err: TradingError = ServiceCommunicationError::circuit_open("risk-monitor").into();
    match err {
        TradingError::Communication(inner) => assert!(inner.is_circuit_open()),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_configuration_error_display() {
    let err = ConfigurationError::for_key("Configuration not found", "trading.max_size")
        .with_status(404);
    assert_eq!(
        err.to_string(),
        "Configuration not found (key: trading.max_size)"
    );
    assert!(err.is_not_found());
    assert_eq!(ConfigurationError::new("down").to_string(), "down");
}
