//! Configuration loading
//!
//! Sources are applied in the order they are added, later sources
//! overriding earlier ones:
//! - Default configuration
//! - A TOML file
//! - `TRADING_*` environment variables
//! - An explicit variable map (same keys as the environment)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::model::{EngineConfig, Environment, LogFormat};
use crate::error::{TradingError, TradingResult};

/// Prefix of every recognised environment variable
pub const ENV_PREFIX: &str = "TRADING_";

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// A TOML file; missing files are skipped
    File(PathBuf),
    /// Process environment variables
    Environment,
    /// Explicit key/value overrides using the environment variable names
    Vars(HashMap<String, String>),
}

/// Configuration loader with support for multiple sources
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration source
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_defaults(self) -> Self {
        self.add_source(ConfigSource::Default)
    }

    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(ConfigSource::File(path.as_ref().to_path_buf()))
    }

    pub fn with_env(self) -> Self {
        self.add_source(ConfigSource::Environment)
    }

    pub fn with_vars(self, vars: HashMap<String, String>) -> Self {
        self.add_source(ConfigSource::Vars(vars))
    }

    /// Load, normalize and validate the configuration
    pub fn load(self) -> TradingResult<EngineConfig> {
        let mut config = EngineConfig::default();

        for source in &self.sources {
            match source {
                ConfigSource::Default => config = EngineConfig::default(),
                ConfigSource::File(path) => {
                    if let Some(from_file) = load_from_file(path)? {
                        config = from_file;
                    }
                }
                ConfigSource::Environment => {
                    let vars: HashMap<String, String> = std::env::vars()
                        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
                        .collect();
                    apply_overrides(&mut config, &vars)?;
                }
                ConfigSource::Vars(vars) => apply_overrides(&mut config, vars)?,
            }
        }

        config.normalize();
        config.validate()?;
        tracing::debug!(
            service = %config.service.name,
            instance = %config.service.instance_name,
            environment = %config.service.environment,
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// Read a TOML file into a full config; sections it omits keep their defaults
pub fn load_from_file(path: &Path) -> TradingResult<Option<EngineConfig>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, skipping");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        TradingError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config = toml::from_str(&content).map_err(|e| {
        TradingError::config_with_context(
            format!("Failed to parse TOML config: {}", e),
            format!("Deserializing TOML configuration from '{}'", path.display()),
        )
    })?;

    Ok(Some(config))
}

/// Apply `TRADING_*` overrides to `config`
fn apply_overrides(config: &mut EngineConfig, vars: &HashMap<String, String>) -> TradingResult<()> {
    let get = |name: &str| vars.get(&format!("{}{}", ENV_PREFIX, name)).map(|v| v.trim());

    if let Some(name) = get("SERVICE_NAME") {
        config.service.name = name.to_string();
    }
    if let Some(instance) = get("SERVICE_INSTANCE_NAME") {
        config.service.instance_name = instance.to_string();
    }
    if let Some(version) = get("SERVICE_VERSION") {
        config.service.version = version.to_string();
    }
    if let Some(environment) = get("ENVIRONMENT") {
        config.service.environment = Environment::from_str(environment)?;
    }
    if let Some(host) = get("HOST") {
        config.server.host = host.to_string();
    }
    if let Some(port) = get("HTTP_PORT") {
        config.server.http_port = parse_number("HTTP_PORT", port)?;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.logging.level = level.to_string();
    }
    if let Some(format) = get("LOG_FORMAT") {
        config.logging.format = LogFormat::from_str(format)?;
    }
    if let Some(timeout) = get("GRPC_TIMEOUT") {
        config.grpc.request_timeout = parse_duration("GRPC_TIMEOUT", timeout)?;
    }
    if let Some(timeout) = get("GRPC_CONNECTION_TIMEOUT") {
        config.grpc.connection_timeout = parse_duration("GRPC_CONNECTION_TIMEOUT", timeout)?;
    }
    if let Some(threshold) = get("CIRCUIT_BREAKER_FAILURE_THRESHOLD") {
        config.circuit_breaker.failure_threshold =
            parse_number("CIRCUIT_BREAKER_FAILURE_THRESHOLD", threshold)?;
    }
    if let Some(timeout) = get("CIRCUIT_BREAKER_RECOVERY_TIMEOUT") {
        config.circuit_breaker.recovery_timeout =
            parse_duration("CIRCUIT_BREAKER_RECOVERY_TIMEOUT", timeout)?;
    }
    if let Some(size) = get("PERFORMANCE_WINDOW_SIZE") {
        config.performance.window_size = parse_number("PERFORMANCE_WINDOW_SIZE", size)?;
    }
    if let Some(ttl) = get("CONFIG_CACHE_TTL") {
        config.configuration_service.cache_ttl = parse_duration("CONFIG_CACHE_TTL", ttl)?;
    }

    Ok(())
}

/// Accept plain seconds (`"30"`, `"2.5"`) or humantime (`"30s"`, `"1m 30s"`)
fn parse_duration(name: &str, value: &str) -> TradingResult<Duration> {
    let invalid = |reason: &dyn std::fmt::Display| {
        TradingError::config(format!(
            "Invalid {}{} value '{}': {}",
            ENV_PREFIX, name, value, reason
        ))
    };

    if let Ok(secs) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).map_err(|e| invalid(&e));
    }
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| invalid(&e))
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> TradingResult<T> {
    value.parse().map_err(|_| {
        TradingError::config(format!("Invalid {}{} value '{}'", ENV_PREFIX, name, value))
    })
}
