//! Circuit breaker types and configuration

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::defaults::circuit_breaker as defaults;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls pass through
    Closed,
    /// Calls fail immediately
    Open,
    /// A trial call is permitted to test recovery
    HalfOpen,
}

/// Inputs that can move the breaker between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerEvent {
    /// A call completed successfully
    Success,
    /// A call failed; `threshold_reached` is true once the failure count
    /// has reached the configured threshold
    Failure { threshold_reached: bool },
    /// The recovery timeout elapsed since the last failure
    RecoveryTimeoutElapsed,
}

impl CircuitState {
    /// Transition table.
    ///
    /// | from      | event                        | to        |
    /// |-----------|------------------------------|-----------|
    /// | Closed    | Failure (threshold reached)  | Open      |
    /// | HalfOpen  | Failure                      | Open      |
    /// | Open      | RecoveryTimeoutElapsed       | HalfOpen  |
    /// | HalfOpen  | Success                      | Closed    |
    ///
    /// Every other pair leaves the state unchanged.
    pub fn on(self, event: BreakerEvent) -> CircuitState {
        use BreakerEvent::*;
        use CircuitState::*;

        match (self, event) {
            (Closed, Failure { threshold_reached: true }) => Open,
            (HalfOpen, Failure { .. }) => Open,
            (Open, RecoveryTimeoutElapsed) => HalfOpen,
            (HalfOpen, Success) => Closed,
            (state, _) => state,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Number of failures before opening the circuit
    pub failure_threshold: u32,
    /// Time to wait after the last failure before allowing a trial call
    #[serde(with = "humantime_serde")]
    pub recovery_timeout: Duration,
    /// Maximum concurrent trial calls while half-open
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: defaults::FAILURE_THRESHOLD,
            recovery_timeout: defaults::recovery_timeout(),
            half_open_max_calls: defaults::HALF_OPEN_MAX_CALLS,
        }
    }
}

/// Error from circuit breaker operations
#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open; the operation was not run
    Open { service: String },
    /// Operation ran and failed; the error is returned untouched
    OperationFailed(E),
}

impl<E: fmt::Display> fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { service } => {
                write!(f, "Circuit breaker open for service {}", service)
            }
            Self::OperationFailed(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error> std::error::Error for CircuitBreakerError<E> {}

/// Read-only snapshot of a circuit breaker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub last_failure_time: Option<DateTime<Utc>>,
    pub last_success_time: Option<DateTime<Utc>>,
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    /// Calls rejected while open; they never ran
    pub rejected_calls: u64,
}

impl CircuitBreakerStats {
    /// Fraction of all calls that succeeded, 0.0 when nothing was called
    pub fn success_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.successful_calls as f64 / self.total_calls as f64
        }
    }
}
