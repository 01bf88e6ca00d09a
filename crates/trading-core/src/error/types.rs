//! Core error type for the trading engine

use thiserror::Error;

use super::communication::ServiceCommunicationError;
use super::configuration::ConfigurationError;

/// Result type alias for trading engine operations
pub type TradingResult<T> = Result<T, TradingError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C: std::fmt::Display>(self, context: C) -> TradingResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> TradingResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context<C: std::fmt::Display>(self, context: C) -> TradingResult<T> {
        self.map_err(|e| TradingError::other(format!("{}: {}", context, e)))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> TradingResult<T> {
        self.map_err(|e| TradingError::other(format!("{}: {}", f(), e)))
    }
}

/// Main error type for the trading engine
#[derive(Error, Debug, Clone)]
pub enum TradingError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Service discovery lookup errors
    #[error("Service discovery error: {message}")]
    Discovery {
        message: String,
        service: Option<String>,
        context: Option<String>,
    },

    /// Errors raised by an RPC transport or remote peer
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        context: Option<String>,
    },

    /// An already-classified inter-service communication failure
    #[error(transparent)]
    Communication(Box<ServiceCommunicationError>),

    /// Configuration-service lookup failure
    #[error(transparent)]
    Configuration(ConfigurationError),

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

impl TradingError {
    /// Get the context attached to this error, if any
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. }
            | Self::Discovery { context, .. }
            | Self::Transport { context, .. }
            | Self::Json { context, .. }
            | Self::Io { context, .. }
            | Self::Other { context, .. } => context.as_deref(),
            Self::Communication(_) | Self::Configuration(_) => None,
        }
    }

    /// Attach context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = Some(context.into());
        match &mut self {
            Self::Config { context: c, .. }
            | Self::Discovery { context: c, .. }
            | Self::Transport { context: c, .. }
            | Self::Json { context: c, .. }
            | Self::Io { context: c, .. }
            | Self::Other { context: c, .. } => *c = ctx,
            Self::Communication(_) | Self::Configuration(_) => {}
        }
        self
    }

    /// Short machine-readable code for the error variant
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "TRADING_CONFIG",
            Self::Discovery { .. } => "TRADING_DISCOVERY",
            Self::Transport { .. } => "TRADING_TRANSPORT",
            Self::Json { .. } => "TRADING_JSON",
            Self::Io { .. } => "TRADING_IO",
            Self::Communication(_) => "TRADING_COMMUNICATION",
            Self::Configuration(_) => "TRADING_CONFIGURATION_SERVICE",
            Self::Other { .. } => "TRADING_OTHER",
        }
    }
}
