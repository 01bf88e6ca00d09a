//! Endpoint handlers

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::resilience::CircuitState;
use crate::rpc::ServiceKind;
use crate::telemetry::metrics::{PROMETHEUS_CONTENT_TYPE, names};

/// `GET /health` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub service: String,
    pub instance: String,
    pub version: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
}

/// `GET /ready` body; `checks` maps each dependency to `ok`, `idle`,
/// `recovering` or `unavailable`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessBody {
    pub status: String,
    pub checks: BTreeMap<String, String>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let service = &state.service;
    Json(HealthBody {
        status: "healthy".to_string(),
        service: service.name.clone(),
        instance: service.instance_name.clone(),
        version: service.version.clone(),
        environment: service.environment.to_string(),
        timestamp: Utc::now(),
    })
}

/// Judge each dependency by its client's circuit breaker. A dependency with
/// no client yet has never failed and counts as ready.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let clients = state.manager.get_client_stats();

    let mut checks = BTreeMap::new();
    let mut all_ready = true;
    for kind in ServiceKind::ALL {
        let check = match clients.get(kind.name()).map(|stats| stats.circuit_breaker.state) {
            None => "idle",
            Some(CircuitState::Closed) => "ok",
            Some(CircuitState::HalfOpen) => "recovering",
            Some(CircuitState::Open) => "unavailable",
        };
        let usable = check != "unavailable";
        all_ready &= usable;

        state.metrics.set_gauge(
            names::DEPENDENCY_READY,
            if usable { 1.0 } else { 0.0 },
            &[("dependency", kind.name().to_string())],
        );
        checks.insert(kind.name().to_string(), check.to_string());
    }

    let (code, status) = if all_ready {
        (StatusCode::OK, "ready")
    } else {
        tracing::warn!(?checks, "Readiness check failed");
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };
    (
        code,
        Json(ReadinessBody {
            status: status.to_string(),
            checks,
        }),
    )
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
