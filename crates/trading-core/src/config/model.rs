//! Engine configuration model

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::discovery::ServiceInfo;
use crate::error::{TradingError, TradingResult};
use crate::resilience::CircuitBreakerConfig;
use crate::telemetry::MonitorConfig;

/// Complete engine configuration.
///
/// Built once by the binary and passed explicitly to everything that needs
/// it; nothing in the library caches a global copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub service: ServiceConfig,
    pub server: ServerConfig,
    pub grpc: GrpcConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub performance: MonitorConfig,
    pub configuration_service: ConfigurationServiceConfig,
    pub discovery: DiscoveryConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Fill in derived values
    pub fn normalize(&mut self) {
        if self.service.instance_name.trim().is_empty() {
            self.service.instance_name = self.service.name.clone();
        }
        self.logging.level = normalize_log_level(&self.logging.level);
    }

    /// Validate the configuration
    pub fn validate(&self) -> TradingResult<()> {
        if self.service.name.trim().is_empty() {
            return Err(TradingError::config("Service name must not be empty"));
        }

        if self.server.host.trim().is_empty() {
            return Err(TradingError::config("server.host must not be empty"));
        }
        if self.server.http_port == 0 {
            return Err(TradingError::config("server.http_port must be between 1 and 65535"));
        }

        if self.grpc.request_timeout.is_zero() {
            return Err(TradingError::config("grpc.request_timeout must be greater than zero"));
        }
        if self.grpc.connection_timeout.is_zero() {
            return Err(TradingError::config(
                "grpc.connection_timeout must be greater than zero",
            ));
        }

        if self.circuit_breaker.failure_threshold == 0 {
            return Err(TradingError::config(
                "circuit_breaker.failure_threshold must be at least 1",
            ));
        }
        if self.circuit_breaker.half_open_max_calls == 0 {
            return Err(TradingError::config(
                "circuit_breaker.half_open_max_calls must be at least 1",
            ));
        }

        let perf = &self.performance;
        if perf.window_size == 0 {
            return Err(TradingError::config("performance.window_size must be at least 1"));
        }
        if perf.throughput_window.is_zero() {
            return Err(TradingError::config(
                "performance.throughput_window must be greater than zero",
            ));
        }
        for (name, value) in [
            ("healthy_threshold", perf.healthy_threshold),
            ("degraded_threshold", perf.degraded_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(TradingError::config(format!(
                    "performance.{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if perf.degraded_threshold > perf.healthy_threshold {
            return Err(TradingError::config(format!(
                "performance.degraded_threshold ({}) must not exceed healthy_threshold ({})",
                perf.degraded_threshold, perf.healthy_threshold
            )));
        }

        if self.configuration_service.request_timeout.is_zero() {
            return Err(TradingError::config(
                "configuration_service.request_timeout must be greater than zero",
            ));
        }

        if !LOG_LEVELS.contains(&normalize_log_level(&self.logging.level).as_str()) {
            return Err(TradingError::config(format!(
                "Invalid log level '{}'; expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        for service in &self.discovery.services {
            if service.name.trim().is_empty() {
                return Err(TradingError::config("Discovery entries must have a name"));
            }
        }

        Ok(())
    }
}

/// Identity of this engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    /// Derived from `name` when left empty
    pub instance_name: String,
    pub version: String,
    pub environment: Environment,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: defaults::ENGINE_SERVICE_NAME.to_string(),
            instance_name: String::new(),
            version: defaults::ENGINE_VERSION.to_string(),
            environment: Environment::default(),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
    Docker,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
            Environment::Docker => "docker",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "production" => Ok(Environment::Production),
            "docker" => Ok(Environment::Docker),
            other => Err(TradingError::config(format!(
                "Unknown environment '{}'; expected development, testing, production or docker",
                other
            ))),
        }
    }
}

/// Listen address of the health and metrics HTTP server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            http_port: defaults::ports::ENGINE_HTTP,
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

/// Inter-service RPC client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcConfig {
    /// Deadline for one remote call
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Deadline for establishing a channel
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            request_timeout: defaults::grpc::request_timeout(),
            connection_timeout: defaults::grpc::connection_timeout(),
        }
    }
}

/// Configuration-service client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationServiceConfig {
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ConfigurationServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: defaults::configuration_service::cache_ttl(),
            request_timeout: defaults::configuration_service::request_timeout(),
        }
    }
}

/// Static service table used when no external registry is available
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub services: Vec<ServiceInfo>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Console,
}

impl FromStr for LogFormat {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "console" => Ok(LogFormat::Console),
            other => Err(TradingError::config(format!(
                "Unknown log format '{}'; expected json or console",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter level, case-insensitive
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Lowercase the level and map the `warning`/`critical` spellings
fn normalize_log_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}
