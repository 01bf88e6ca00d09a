//! Resilience patterns for inter-service communication
//!
//! - `CircuitBreaker`: stops calling a failing dependency for a cooldown
//!   period, then tests recovery with a trial call.

pub mod circuit_breaker;

pub use circuit_breaker::{
    BreakerEvent, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats,
    CircuitState,
};
