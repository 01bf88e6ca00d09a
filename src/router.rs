//! Command routing

use std::sync::Arc;

use anyhow::Context;
use trading_core::config::ConfigLoader;
use trading_core::telemetry::logging;
use trading_core::telemetry::{ConstantLabels, MetricsPort, PrometheusMetrics};
use trading_core::{
    ClientSettings, EngineConfig, HttpJsonTransport, InMemoryTransport, InterServiceClientManager,
    RpcTransport, StaticServiceDiscovery,
};

use crate::args::{Cli, Commands, TransportArg};
use crate::commands;

/// Load configuration, install logging, then run the requested command
pub async fn route(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    logging::init(&config.logging);

    tracing::info!(
        service = %config.service.name,
        instance = %config.service.instance_name,
        environment = %config.service.environment,
        "Trading engine starting"
    );

    match &cli.command {
        Commands::Serve { host, port } => {
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host.clone();
            }
            if let Some(port) = port {
                server.http_port = *port;
            }

            let metrics: Arc<dyn MetricsPort> = Arc::new(
                PrometheusMetrics::new(ConstantLabels::from(&config.service))
                    .context("Failed to initialize metrics")?,
            );
            let manager = build_manager(&cli, &config)?.with_metrics(Arc::clone(&metrics));
            commands::serve(&config, &server, manager, metrics).await
        }
        Commands::Config => commands::show_config(&config),
        Commands::GetConfig { key, endpoint } => {
            commands::get_config(&config, discovery(&config), key, endpoint.as_deref()).await
        }
        Commands::Health { service } => {
            let manager = build_manager(&cli, &config)?;
            commands::health(&manager, service.as_deref(), cli.fallback).await
        }
        Commands::Stats => {
            let manager = build_manager(&cli, &config)?;
            commands::stats(&manager, cli.fallback).await
        }
    }
}

/// Defaults, then the file, then `TRADING_*` variables
pub fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    ConfigLoader::new()
        .with_defaults()
        .with_file(&cli.config)
        .with_env()
        .load()
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))
}

fn discovery(config: &EngineConfig) -> Arc<StaticServiceDiscovery> {
    Arc::new(StaticServiceDiscovery::from_services(
        config.discovery.services.iter().cloned(),
    ))
}

fn build_manager(cli: &Cli, config: &EngineConfig) -> anyhow::Result<InterServiceClientManager> {
    let transport: Arc<dyn RpcTransport> = match cli.transport {
        TransportArg::InMemory => Arc::new(InMemoryTransport::with_default_stubs()),
        TransportArg::Http => Arc::new(
            HttpJsonTransport::new(config.grpc.connection_timeout)
                .context("Failed to build HTTP transport")?,
        ),
    };

    Ok(InterServiceClientManager::new(ClientSettings::from(config), transport)
        .with_discovery(discovery(config)))
}
