//! Values served by the configuration service

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::defaults::configuration_service::VALID_CONFIG_TYPES;
use crate::error::ConfigurationError;

/// Declared type of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigValueType {
    String,
    Number,
    Boolean,
    Json,
}

impl ConfigValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigValueType::String => "string",
            ConfigValueType::Number => "number",
            ConfigValueType::Boolean => "boolean",
            ConfigValueType::Json => "json",
        }
    }
}

impl fmt::Display for ConfigValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigValueType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ConfigValueType::String),
            "number" => Ok(ConfigValueType::Number),
            "boolean" => Ok(ConfigValueType::Boolean),
            "json" => Ok(ConfigValueType::Json),
            other => Err(ConfigurationError::new(format!(
                "Invalid configuration type: {}. Valid types: {}",
                other,
                VALID_CONFIG_TYPES.join(", ")
            ))),
        }
    }
}

fn default_environment() -> String {
    "production".to_string()
}

/// A configuration entry with typed accessors.
///
/// The raw value is always a string; `value_type` says how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationValue {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: ConfigValueType,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "Utc::now")]
    pub retrieved_at: DateTime<Utc>,
}

impl ConfigurationValue {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        value_type: ConfigValueType,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            value_type,
            environment: default_environment(),
            retrieved_at: Utc::now(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Check that the key and value are present and the value parses as
    /// its declared type
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.key.is_empty() {
            return Err(ConfigurationError::new("Configuration key cannot be empty"));
        }
        if self.value.is_empty() {
            return Err(ConfigurationError::for_key(
                "Configuration value cannot be empty",
                &self.key,
            ));
        }

        let check = match self.value_type {
            ConfigValueType::String => Ok(()),
            ConfigValueType::Number => self.as_f64().map(|_| ()),
            ConfigValueType::Boolean => self.as_bool().map(|_| ()),
            ConfigValueType::Json => self.as_json().map(|_| ()),
        };
        check.map_err(|e| {
            ConfigurationError::for_key(
                format!(
                    "Configuration value '{}' is not valid for type '{}': {}",
                    self.value,
                    self.value_type,
                    e.message()
                ),
                &self.key,
            )
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn as_f64(&self) -> Result<f64, ConfigurationError> {
        self.value.trim().parse::<f64>().map_err(|e| {
            ConfigurationError::for_key(
                format!("Cannot convert '{}' to float: {}", self.value, e),
                &self.key,
            )
        })
    }

    /// Integer value; decimal strings are truncated toward zero
    pub fn as_i64(&self) -> Result<i64, ConfigurationError> {
        let number = self.as_f64()?;
        if !number.is_finite() || number < i64::MIN as f64 || number > i64::MAX as f64 {
            return Err(ConfigurationError::for_key(
                format!("Cannot convert '{}' to int: out of range", self.value),
                &self.key,
            ));
        }
        Ok(number.trunc() as i64)
    }

    pub fn as_bool(&self) -> Result<bool, ConfigurationError> {
        parse_bool(&self.value).ok_or_else(|| {
            ConfigurationError::for_key(
                format!("Cannot convert '{}' to boolean", self.value),
                &self.key,
            )
        })
    }

    pub fn as_json(&self) -> Result<serde_json::Value, ConfigurationError> {
        serde_json::from_str(&self.value).map_err(|e| {
            ConfigurationError::for_key(
                format!("Cannot convert '{}' to JSON: {}", self.value, e),
                &self.key,
            )
        })
    }
}

/// `true/1/yes/on/enabled` and `false/0/no/off/disabled`, case-insensitive
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Some(true),
        "false" | "0" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(raw: &str, value_type: ConfigValueType) -> ConfigurationValue {
        ConfigurationValue::new("trading.position_limits.max_size", raw, value_type)
    }

    #[test]
    fn test_number_conversions() {
        let v = value("1500000.75", ConfigValueType::Number);
        assert!(v.validate().is_ok());
        assert_eq!(v.as_f64().unwrap(), 1_500_000.75);
        assert_eq!(v.as_i64().unwrap(), 1_500_000);
        assert_eq!(value("-2.9", ConfigValueType::Number).as_i64().unwrap(), -2);
    }

    #[test]
    fn test_boolean_words() {
        for word in ["true", "1", "YES", "on", "Enabled"] {
            assert!(value(word, ConfigValueType::Boolean).as_bool().unwrap(), "{}", word);
        }
        for word in ["false", "0", "no", "OFF", "disabled"] {
            assert!(!value(word, ConfigValueType::Boolean).as_bool().unwrap(), "{}", word);
        }
        assert!(value("maybe", ConfigValueType::Boolean).as_bool().is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_values() {
        assert!(value("fast", ConfigValueType::Number).validate().is_err());
        assert!(value("perhaps", ConfigValueType::Boolean).validate().is_err());
        assert!(value("{not json", ConfigValueType::Json).validate().is_err());
        assert!(value("", ConfigValueType::String).validate().is_err());

        let err = ConfigurationValue::new("", "x", ConfigValueType::String)
            .validate()
            .unwrap_err();
        assert_eq!(err.message(), "Configuration key cannot be empty");
    }

    #[test]
    fn test_json_value() {
        let v = value(r#"{"max": 10, "symbols": ["AAPL"]}"#, ConfigValueType::Json);
        assert!(v.validate().is_ok());
        assert_eq!(v.as_json().unwrap()["max"], 10);
    }

    #[test]
    fn test_wire_format() {
        let v: ConfigurationValue = serde_json::from_str(
            r#"{"key": "risk.enabled", "value": "on", "type": "boolean"}"#,
        )
        .unwrap();
        assert_eq!(v.value_type, ConfigValueType::Boolean);
        assert_eq!(v.environment, "production");

        assert!(
            serde_json::from_str::<ConfigurationValue>(
                r#"{"key": "k", "value": "v", "type": "float"}"#
            )
            .is_err()
        );
        assert!("float".parse::<ConfigValueType>().is_err());
        assert_eq!("json".parse::<ConfigValueType>().unwrap(), ConfigValueType::Json);
    }
}
