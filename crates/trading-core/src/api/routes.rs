//! Route table

use axum::Router;
use axum::routing::get;

use super::AppState;
use super::handlers;
use super::middleware::red_metrics;

/// Routes at the root and under `/api/v1`, all measured by the RED middleware
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics));

    Router::new()
        .merge(routes.clone())
        .nest("/api/v1", routes)
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), red_metrics))
        .with_state(state)
}
