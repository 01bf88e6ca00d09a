//! Configuration-service client
//!
//! Reads typed values from the central configuration service and keeps them
//! in a TTL cache.

mod cache;
mod client;
mod value;

pub use cache::CacheStats;
pub use client::{CONFIGURATION_SERVICE_NAME, ConfigurationServiceClient};
pub use value::{ConfigValueType, ConfigurationValue};
