//! Errors raised by the configuration-service client

use std::fmt;

/// Configuration service related error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    message: String,
    key: Option<String>,
    status_code: Option<u16>,
}

impl ConfigurationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: None,
            status_code: None,
        }
    }

    /// Error about a specific configuration key
    pub fn for_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: Some(key.into()),
            status_code: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Whether the service reported the key as missing
    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} (key: {})", self.message, key),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ConfigurationError {}
