//! Health, readiness and metrics HTTP endpoints
//!
//! Every route is served both at the root and under `/api/v1`:
//! - `GET /health`: liveness and identity of this instance
//! - `GET /ready`: 200 when no dependency's circuit is open, 503 otherwise
//! - `GET /metrics`: Prometheus text exposition

mod handlers;
mod middleware;
mod routes;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::clients::InterServiceClientManager;
use crate::config::ServiceConfig;
use crate::telemetry::MetricsPort;

pub use handlers::{HealthBody, ReadinessBody};
pub use routes::create_router;

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ServiceConfig,
    pub manager: Arc<InterServiceClientManager>,
    pub metrics: Arc<dyn MetricsPort>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.service.name)
            .field("manager", &self.manager)
            .finish()
    }
}

/// Serve the router on `listener` until `shutdown` resolves, then drain
/// in-flight requests
pub async fn serve<S>(listener: TcpListener, state: AppState, shutdown: S) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, service = %state.service.name, "HTTP server listening");
    }
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down gracefully"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down gracefully"),
    }
}
