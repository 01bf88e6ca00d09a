//! Engine configuration
//!
//! `EngineConfig` is assembled by [`ConfigLoader`] from defaults, a TOML file
//! and `TRADING_*` environment variables, then handed to the components that
//! need it.

pub mod defaults;
mod loader;
mod model;


pub use loader::{ConfigLoader, ConfigSource, ENV_PREFIX, load_from_file};
pub use model::{
    ConfigurationServiceConfig, DiscoveryConfig, EngineConfig, Environment, GrpcConfig, LogFormat,
    LoggingConfig, ServerConfig, ServiceConfig,
};
