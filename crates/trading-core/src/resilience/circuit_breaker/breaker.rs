//! Circuit breaker implementation

use std::future::Future;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::time::Instant;

use super::types::{
    BreakerEvent, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState,
};

/// Circuit breaker guarding calls to one remote service.
///
/// Bookkeeping is synchronous and never held across an `.await`, so the
/// breaker can be shared by concurrent calls of the owning client.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Service name (for logging and errors)
    service: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    /// Failures since the breaker last closed
    failure_count: u32,
    last_failure: Option<Instant>,
    last_failure_time: Option<DateTime<Utc>>,
    last_success_time: Option<DateTime<Utc>>,
    /// Trial calls currently running while half-open
    half_open_in_flight: u32,
    /// Bumped on every entry into half-open so stale permits are ignored
    half_open_epoch: u64,
    total_calls: u64,
    successful_calls: u64,
    failed_calls: u64,
    rejected_calls: u64,
}

impl BreakerInner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure: None,
            last_failure_time: None,
            last_success_time: None,
            half_open_in_flight: 0,
            half_open_epoch: 0,
            total_calls: 0,
            successful_calls: 0,
            failed_calls: 0,
            rejected_calls: 0,
        }
    }
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default config
    pub fn new(service: impl Into<String>) -> Self {
        Self::with_config(service, CircuitBreakerConfig::default())
    }

    /// Create a new circuit breaker with custom config
    pub fn with_config(service: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            service: service.into(),
            config,
            inner: Mutex::new(BreakerInner::new()),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state, without evaluating the recovery timeout
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.lock().failure_count
    }

    /// Execute an operation with circuit breaker protection.
    ///
    /// Rejected calls return `CircuitBreakerError::Open` without running
    /// `operation`. A failing operation's error is returned unchanged inside
    /// `CircuitBreakerError::OperationFailed`.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(permit) = self.acquire() else {
            return Err(CircuitBreakerError::Open {
                service: self.service.clone(),
            });
        };

        match operation().await {
            Ok(result) => {
                self.on_success(permit);
                Ok(result)
            }
            Err(e) => {
                self.on_failure(permit);
                Err(CircuitBreakerError::OperationFailed(e))
            }
        }
    }

    /// Snapshot of state and counters
    pub fn stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.lock();
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            last_failure_time: inner.last_failure_time,
            last_success_time: inner.last_success_time,
            total_calls: inner.total_calls,
            successful_calls: inner.successful_calls,
            failed_calls: inner.failed_calls,
            rejected_calls: inner.rejected_calls,
        }
    }

    /// Force the breaker back to closed, keeping the lifetime counters
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.half_open_in_flight = 0;
        inner.half_open_epoch += 1;
        tracing::info!(service = %self.service, "Circuit breaker manually reset");
    }

    /// Count the call and decide whether it may run.
    ///
    /// The returned permit holds a half-open trial slot until it is handed to
    /// `on_success`/`on_failure` or dropped with the call's future.
    fn acquire(&self) -> Option<CallPermit<'_>> {
        let mut inner = self.inner.lock();
        inner.total_calls += 1;

        if inner.state == CircuitState::Open {
            if self.should_attempt_reset(&inner) {
                self.transition(&mut inner, BreakerEvent::RecoveryTimeoutElapsed);
            } else {
                inner.rejected_calls += 1;
                return None;
            }
        }

        let mut trial_epoch = None;
        if inner.state == CircuitState::HalfOpen {
            if inner.half_open_in_flight >= self.config.half_open_max_calls {
                inner.rejected_calls += 1;
                return None;
            }
            inner.half_open_in_flight += 1;
            trial_epoch = Some(inner.half_open_epoch);
        }

        Some(CallPermit {
            breaker: self,
            trial_epoch,
        })
    }

    fn should_attempt_reset(&self, inner: &BreakerInner) -> bool {
        match inner.last_failure {
            Some(last_failure) => last_failure.elapsed() >= self.config.recovery_timeout,
            None => false,
        }
    }

    fn on_success(&self, mut permit: CallPermit<'_>) {
        let mut inner = self.inner.lock();
        permit.release(&mut inner);
        inner.successful_calls += 1;
        inner.last_success_time = Some(Utc::now());

        self.transition(&mut inner, BreakerEvent::Success);
    }

    fn on_failure(&self, mut permit: CallPermit<'_>) {
        let mut inner = self.inner.lock();
        permit.release(&mut inner);
        inner.failed_calls += 1;
        inner.failure_count += 1;
        inner.last_failure = Some(Instant::now());
        inner.last_failure_time = Some(Utc::now());

        let threshold_reached = inner.failure_count >= self.config.failure_threshold;
        self.transition(&mut inner, BreakerEvent::Failure { threshold_reached });
    }

    fn transition(&self, inner: &mut BreakerInner, event: BreakerEvent) {
        let from = inner.state;
        let to = from.on(event);
        if from == to {
            return;
        }

        inner.state = to;
        match to {
            CircuitState::Open => {
                inner.half_open_in_flight = 0;
                tracing::warn!(
                    service = %self.service,
                    failure_count = inner.failure_count,
                    threshold = self.config.failure_threshold,
                    "Circuit breaker opened due to failures"
                );
            }
            CircuitState::HalfOpen => {
                inner.half_open_in_flight = 0;
                inner.half_open_epoch += 1;
                tracing::info!(
                    service = %self.service,
                    "Circuit breaker transitioning to half-open"
                );
            }
            CircuitState::Closed => {
                inner.failure_count = 0;
                inner.half_open_in_flight = 0;
                tracing::info!(
                    service = %self.service,
                    "Circuit breaker closed after successful recovery"
                );
            }
        }
    }
}

/// Admission to run one call.
///
/// A permit taken while half-open occupies a trial slot. The slot is freed
/// exactly once: by the outcome bookkeeping, or by `Drop` when the call's
/// future is cancelled before it finishes.
#[derive(Debug)]
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    /// Half-open epoch the slot was taken in, `None` for closed-state calls
    trial_epoch: Option<u64>,
}

impl CallPermit<'_> {
    fn release(&mut self, inner: &mut BreakerInner) {
        let Some(epoch) = self.trial_epoch.take() else {
            return;
        };
        if inner.state == CircuitState::HalfOpen && inner.half_open_epoch == epoch {
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
        }
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.trial_epoch.is_none() {
            return;
        }
        let mut inner = self.breaker.inner.lock();
        self.release(&mut inner);
        tracing::debug!(
            service = %self.breaker.service,
            "Half-open trial abandoned before completion"
        );
    }
}
