//! Constructor methods for TradingError

use super::communication::ServiceCommunicationError;
use super::types::TradingError;

impl TradingError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new service discovery error
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
            service: None,
            context: None,
        }
    }

    /// Create a service discovery error for a named service
    pub fn discovery_for(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
            service: Some(service.into()),
            context: None,
        }
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: None,
            context: None,
        }
    }

    /// Create a transport error carrying the remote status code
    pub fn transport_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: Some(status_code),
            context: None,
        }
    }

    /// Create a new JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            context: None,
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            context: None,
        }
    }

    /// Wrap a communication error so it can travel through `TradingResult`
    pub fn communication(error: ServiceCommunicationError) -> Self {
        Self::Communication(Box::new(error))
    }
}
