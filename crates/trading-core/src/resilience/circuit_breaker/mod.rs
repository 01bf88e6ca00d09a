//! Circuit breaker pattern for fault tolerance
//!
//! Prevents cascading failures by temporarily rejecting calls to a failing
//! remote service.

mod breaker;
mod types;


pub use breaker::CircuitBreaker;
pub use types::{
    BreakerEvent, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState,
};
