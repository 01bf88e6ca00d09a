//! CLI argument definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "trading-engine.toml";

#[derive(Parser, Debug)]
#[command(name = "trading-engine")]
#[command(about = "Trading system engine - inter-service communication and diagnostics")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file (skipped when missing)
    #[arg(long, short, default_value = DEFAULT_CONFIG_FILE, env = "TRADING_CONFIG_FILE")]
    pub config: PathBuf,

    /// How to reach the remote services
    #[arg(long, value_enum, default_value = "in-memory")]
    pub transport: TransportArg,

    /// Skip service discovery and use the built-in endpoints
    #[arg(long)]
    pub fallback: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportArg {
    /// Canned in-process replies
    InMemory,
    /// JSON over HTTP
    Http,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve health, readiness and Prometheus metrics over HTTP until stopped
    Serve {
        /// Interface to bind, overriding `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding `server.http_port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Health-check every service, or only one
    Health {
        /// Service name, e.g. risk-monitor
        #[arg(long)]
        service: Option<String>,
    },

    /// Exercise every client once and print manager and client statistics
    Stats,

    /// Print the effective configuration
    Config,

    /// Fetch a value from the configuration service
    GetConfig {
        /// Configuration key, e.g. trading.max_position_size
        key: String,

        /// Base URL of the configuration service, overriding discovery
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["trading-engine", "stats"]).unwrap();
        assert_eq!(cli.transport, TransportArg::InMemory);
        assert!(!cli.fallback);
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_health_for_one_service_over_http() {
        let cli = Cli::try_parse_from([
            "trading-engine",
            "--transport",
            "http",
            "--fallback",
            "health",
            "--service",
            "risk-monitor",
        ])
        .unwrap();
        assert_eq!(cli.transport, TransportArg::Http);
        assert!(cli.fallback);
        match cli.command {
            Commands::Health { service } => assert_eq!(service.as_deref(), Some("risk-monitor")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_serve_address_overrides() {
        let cli = Cli::try_parse_from([
            "trading-engine",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "9182",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(9182));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["trading-engine", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { host: None, port: None }));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["trading-engine"]).is_err());
    }
}
