//! TTL cache for configuration values

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use super::value::ConfigurationValue;

/// Cache counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub cache_size: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_rate: f64,
    pub total_requests: u64,
}

#[derive(Debug)]
struct CacheEntry {
    value: ConfigurationValue,
    expires_at: Instant,
}

/// Key/value cache whose entries expire `ttl` after insertion
#[derive(Debug)]
pub(crate) struct ConfigCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl ConfigCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Fresh entry for `key`; expired entries are dropped. Counts hits only,
    /// misses are counted by the caller when it goes to the service.
    pub(crate) fn get(&mut self, key: &str) -> Option<ConfigurationValue> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => Instant::now() > entry.expires_at,
        };

        if expired {
            self.entries.remove(key);
            tracing::debug!(key, "Configuration cache entry expired");
            return None;
        }

        self.hits += 1;
        tracing::debug!(key, "Configuration cache hit");
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn insert(&mut self, key: &str, value: ConfigurationValue) {
        let expires_at = Instant::now() + self.ttl;
        self.entries.insert(key.to_string(), CacheEntry { value, expires_at });
    }

    pub(crate) fn stats(&self) -> CacheStats {
        let total_requests = self.hits + self.misses;
        CacheStats {
            cache_size: self.entries.len(),
            cache_hits: self.hits,
            cache_misses: self.misses,
            hit_rate: if total_requests > 0 {
                self.hits as f64 / total_requests as f64
            } else {
                0.0
            },
            total_requests,
        }
    }

    /// Drop all entries and counters
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
