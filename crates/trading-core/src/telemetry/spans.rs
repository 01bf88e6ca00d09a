//! Request spans for inter-service calls

use tracing::Span;
use tracing::field::Empty;

/// Status recorded on a request span
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpanStatus {
    #[default]
    Unset,
    Ok,
    Error(String),
}

/// Span covering one remote call, named `<service>.<operation>`.
///
/// Exporters that understand the `otel.*` field convention pick up the name
/// and status; everything else sees a regular `tracing` span.
#[derive(Debug)]
pub struct RequestSpan {
    name: String,
    span: Span,
    status: SpanStatus,
}

impl RequestSpan {
    pub fn new(service: &str, host: &str, port: u16, operation: &str) -> Self {
        let name = format!("{}.{}", service, operation);
        let span = tracing::info_span!(
            "rpc_request",
            otel.name = %name,
            otel.kind = "client",
            service.name = %service,
            service.host = %host,
            service.port = port,
            operation = %operation,
            otel.status_code = Empty,
            otel.status_message = Empty,
        );

        Self {
            name,
            span,
            status: SpanStatus::Unset,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying span, for `Instrument::instrument`
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn status(&self) -> &SpanStatus {
        &self.status
    }

    pub fn mark_ok(&mut self) {
        self.span.record("otel.status_code", "OK");
        self.status = SpanStatus::Ok;
    }

    pub fn mark_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.span.record("otel.status_code", "ERROR");
        self.span.record("otel.status_message", message.as_str());
        self.status = SpanStatus::Error(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_name_and_default_status() {
        let span = RequestSpan::new("risk-monitor", "localhost", 50054, "health_check");
        assert_eq!(span.name(), "risk-monitor.health_check");
        assert_eq!(span.status(), &SpanStatus::Unset);
    }

    #[test]
    fn test_mark_ok_then_error_keeps_last_status() {
        let mut span =
            RequestSpan::new("test-coordinator", "localhost", 50053, "report_chaos_event");
        span.mark_ok();
        assert_eq!(span.status(), &SpanStatus::Ok);

        span.mark_error("Request timeout after 30s");
        assert_eq!(
            span.status(),
            &SpanStatus::Error("Request timeout after 30s".to_string())
        );
    }
}
