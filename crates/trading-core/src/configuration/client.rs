//! HTTP client for the configuration service

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::{Client, StatusCode, Url};

use super::cache::{CacheStats, ConfigCache};
use super::value::ConfigurationValue;
use crate::config::ConfigurationServiceConfig;
use crate::config::defaults::{self, ports};
use crate::discovery::ServiceDiscovery;
use crate::error::ConfigurationError;

/// Registry name of the configuration service
pub const CONFIGURATION_SERVICE_NAME: &str = "configuration-service";

const USER_AGENT: &str = concat!(
    "trading-engine-configuration-client/",
    env!("CARGO_PKG_VERSION")
);

/// Fetches configuration values over HTTP and caches them with a TTL
pub struct ConfigurationServiceClient {
    http: Client,
    discovery: Option<Arc<dyn ServiceDiscovery>>,
    endpoint: Option<String>,
    request_timeout: Duration,
    cache: Mutex<ConfigCache>,
}

impl std::fmt::Debug for ConfigurationServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.cache_stats();
        f.debug_struct("ConfigurationServiceClient")
            .field("cache_size", &stats.cache_size)
            .field("hit_rate", &format!("{:.2}", stats.hit_rate))
            .finish()
    }
}

impl ConfigurationServiceClient {
    pub fn new(config: &ConfigurationServiceConfig) -> Result<Self, ConfigurationError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConfigurationError::new(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            cache_ttl_secs = config.cache_ttl.as_secs(),
            request_timeout_secs = config.request_timeout.as_secs_f64(),
            "Configuration client initialized"
        );

        Ok(Self {
            http,
            discovery: None,
            endpoint: None,
            request_timeout: config.request_timeout,
            cache: Mutex::new(ConfigCache::new(config.cache_ttl)),
        })
    }

    /// Resolve the service through `discovery`
    pub fn with_discovery(mut self, discovery: Arc<dyn ServiceDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Always use `base_url` (e.g. `http://config:8090`), skipping discovery
    pub fn with_endpoint(mut self, base_url: impl Into<String>) -> Self {
        self.endpoint = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    async fn service_endpoint(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }

        if let Some(discovery) = &self.discovery {
            match discovery.get_service(CONFIGURATION_SERVICE_NAME).await {
                Ok(Some(info)) => {
                    let endpoint = info.http_url();
                    tracing::debug!(
                        endpoint = %endpoint,
                        "Resolved configuration service endpoint via service discovery"
                    );
                    return endpoint;
                }
                Ok(None) => {
                    tracing::warn!("Configuration service not registered, using fallback");
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to resolve configuration service via service discovery, \
                         using fallback"
                    );
                }
            }
        }

        let fallback = format!(
            "http://{}:{}",
            defaults::FALLBACK_HOST,
            ports::CONFIGURATION_SERVICE_HTTP
        );
        tracing::debug!(endpoint = %fallback, "Using fallback configuration service endpoint");
        fallback
    }

    /// Value for `key`, from the cache while fresh, otherwise from the service
    pub async fn get_configuration(
        &self,
        key: &str,
    ) -> Result<ConfigurationValue, ConfigurationError> {
        if let Some(value) = self.cache.lock().get(key) {
            return Ok(value);
        }
        self.cache.lock().record_miss();

        let url = configuration_url(&self.service_endpoint().await, key)?;
        tracing::debug!(key, url = %url, "Fetching configuration from service");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(key, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ConfigurationError::for_key(
                format!("Configuration not found: {}", key),
                key,
            )
            .with_status(404));
        }
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ConfigurationError::for_key(
                format!(
                    "Configuration service error: HTTP {}: {}",
                    status.as_u16(),
                    body
                ),
                key,
            )
            .with_status(status.as_u16()));
        }

        let value: ConfigurationValue = response.json().await.map_err(|e| {
            ConfigurationError::for_key(
                format!("Unexpected error retrieving configuration {}: {}", key, e),
                key,
            )
        })?;
        value.validate()?;

        self.cache.lock().insert(key, value.clone());
        tracing::info!(
            key,
            value_type = %value.value_type,
            environment = %value.environment,
            "Configuration retrieved successfully"
        );
        Ok(value)
    }

    fn request_error(&self, key: &str, error: reqwest::Error) -> ConfigurationError {
        if error.is_timeout() {
            ConfigurationError::for_key(
                format!(
                    "Configuration service timeout for key: {} (after {}s)",
                    key,
                    self.request_timeout.as_secs_f64()
                ),
                key,
            )
        } else {
            ConfigurationError::for_key(
                format!("Configuration service client error for key {}: {}", key, error),
                key,
            )
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Clear the cache and its counters
    pub fn cleanup(&self) {
        self.cache.lock().clear();
        tracing::info!("Configuration client cleanup completed");
    }
}

/// `{base}/api/v1/configuration/{key}` with `key` kept as one encoded segment
fn configuration_url(base: &str, key: &str) -> Result<Url, ConfigurationError> {
    let invalid = |reason: &str| {
        ConfigurationError::for_key(
            format!("Invalid configuration service endpoint '{}': {}", base, reason),
            key,
        )
    };

    let mut url = Url::parse(base).map_err(|e| invalid(&e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base URL"))?
        .pop_if_empty()
        .extend(["api", "v1", "configuration", key]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_url_keeps_key_in_one_segment() {
        let url = configuration_url("http://config:8090", "desk/eu?limit#max").unwrap();
        assert_eq!(
            url.as_str(),
            "http://config:8090/api/v1/configuration/desk%2Feu%3Flimit%23max"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path_segments().map(|s| s.count()), Some(4));
    }

    #[test]
    fn test_configuration_url_appends_to_base_path() {
        let url = configuration_url("http://gateway/config", "trading.max_position").unwrap();
        assert_eq!(
            url.as_str(),
            "http://gateway/config/api/v1/configuration/trading.max_position"
        );
    }

    #[test]
    fn test_configuration_url_rejects_bad_endpoint() {
        let err = configuration_url("not a url", "trading.max_position").unwrap_err();
        assert_eq!(err.key(), Some("trading.max_position"));
    }
}
