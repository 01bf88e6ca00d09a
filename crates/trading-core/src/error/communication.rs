//! Caller-facing error for inter-service communication

use std::fmt;
use std::time::Duration;

use super::types::TradingError;

/// Result type alias for inter-service client operations
pub type CommResult<T> = Result<T, ServiceCommunicationError>;

/// What went wrong while talking to a remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunicationErrorKind {
    /// The channel to the service could not be established
    Connection,
    /// The call did not complete within the client timeout
    Timeout,
    /// The circuit breaker rejected the call without running it
    CircuitOpen,
    /// The remote side (or the transport) reported a failure
    Remote,
    /// Anything else raised while performing the call
    Unexpected,
}

impl CommunicationErrorKind {
    /// Stable lowercase name, used as a metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationErrorKind::Connection => "connection",
            CommunicationErrorKind::Timeout => "timeout",
            CommunicationErrorKind::CircuitOpen => "circuit_open",
            CommunicationErrorKind::Remote => "remote",
            CommunicationErrorKind::Unexpected => "unexpected",
        }
    }
}

/// Inter-service communication error.
///
/// Raised for connection failures, timeouts, breaker-open rejections and any
/// unexpected failure during a call. Display renders the message followed by
/// the known service/operation context, e.g.
/// `Request timeout after 30s (service: risk-monitor, operation: health_check)`.
#[derive(Debug, Clone)]
pub struct ServiceCommunicationError {
    message: String,
    kind: CommunicationErrorKind,
    service: Option<String>,
    operation: Option<String>,
    source: Option<Box<TradingError>>,
}

impl ServiceCommunicationError {
    /// Create an error of the given kind with no context attached
    pub fn new(kind: CommunicationErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            service: None,
            operation: None,
            source: None,
        }
    }

    /// Failure to establish a channel to `service`
    pub fn connection(service: &str, cause: TradingError) -> Self {
        Self::new(
            CommunicationErrorKind::Connection,
            format!("Failed to connect to {}", service),
        )
        .with_service(service)
        .with_source(cause)
    }

    /// The request deadline elapsed
    pub fn timeout(service: &str, timeout: Duration) -> Self {
        Self::new(
            CommunicationErrorKind::Timeout,
            format!("Request timeout after {}s", timeout.as_secs_f64()),
        )
        .with_service(service)
    }

    /// The circuit breaker for `service` is open
    pub fn circuit_open(service: &str) -> Self {
        Self::new(
            CommunicationErrorKind::CircuitOpen,
            format!("Circuit breaker open for service {}", service),
        )
        .with_service(service)
    }

    /// Wrap an arbitrary failure raised while running `operation`
    pub fn wrap(service: &str, operation: &str, cause: TradingError) -> Self {
        let (kind, message) = match &cause {
            TradingError::Transport { message, .. } => (
                CommunicationErrorKind::Remote,
                format!("RPC call failed: {}", message),
            ),
            other => (
                CommunicationErrorKind::Unexpected,
                format!("Unexpected error in {}: {}", operation, other),
            ),
        };
        Self::new(kind, message)
            .with_service(service)
            .with_operation(operation)
            .with_source(cause)
    }

    /// Attach the service name
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attach the operation name
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: TradingError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> CommunicationErrorKind {
        self.kind
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// The wrapped original error, if any
    pub fn original_error(&self) -> Option<&TradingError> {
        self.source.as_deref()
    }

    /// Whether this error came from an open circuit breaker
    pub fn is_circuit_open(&self) -> bool {
        self.kind == CommunicationErrorKind::CircuitOpen
    }

    /// Whether this error came from a request deadline
    pub fn is_timeout(&self) -> bool {
        self.kind == CommunicationErrorKind::Timeout
    }
}

impl fmt::Display for ServiceCommunicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        let mut parts = Vec::with_capacity(2);
        if let Some(service) = &self.service {
            parts.push(format!("service: {}", service));
        }
        if let Some(operation) = &self.operation {
            parts.push(format!("operation: {}", operation));
        }
        if !parts.is_empty() {
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceCommunicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
