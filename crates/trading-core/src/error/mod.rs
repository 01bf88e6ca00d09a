//! Error types for the trading engine
//!
//! Two layers of errors exist:
//! - `TradingError`: the crate-wide error used by configuration, discovery,
//!   transports and everything that is not the caller-facing RPC surface.
//! - `ServiceCommunicationError`: the single error callers of the
//!   inter-service clients ever see. It carries the service, the operation
//!   and the underlying cause.

mod communication;
mod configuration;
mod constructors;
mod conversions;
mod types;

#[cfg(test)]
mod tests;

pub use communication::{CommResult, CommunicationErrorKind, ServiceCommunicationError};
pub use configuration::ConfigurationError;
pub use types::{ResultExt, TradingError, TradingResult};
