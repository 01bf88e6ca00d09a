//! From trait implementations for TradingError conversions

use super::communication::ServiceCommunicationError;
use super::configuration::ConfigurationError;
use super::types::TradingError;

impl From<std::io::Error> for TradingError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for TradingError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<toml::de::Error> for TradingError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(error.to_string(), "Parsing TOML configuration")
    }
}

impl From<reqwest::Error> for TradingError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport {
            message: error.to_string(),
            status_code: error.status().map(|s| s.as_u16()),
            context: error.url().map(|u| u.to_string()),
        }
    }
}

impl From<ServiceCommunicationError> for TradingError {
    fn from(error: ServiceCommunicationError) -> Self {
        Self::communication(error)
    }
}

impl From<ConfigurationError> for TradingError {
    fn from(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }
}
