//! Request, error and duration metrics for every matched route

use axum::body::Body;
use axum::extract::{MatchedPath, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::Instant;

use super::AppState;
use crate::telemetry::metrics::names;

/// Count, time and classify one request under its route template
pub async fn red_metrics(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    let status = response.status();
    let labels = [
        ("method", method),
        ("route", route),
        ("code", status.as_u16().to_string()),
    ];
    state.metrics.inc_counter(names::HTTP_REQUESTS_TOTAL, &labels);
    state.metrics.observe_histogram(
        names::HTTP_REQUEST_DURATION_SECONDS,
        elapsed.as_secs_f64(),
        &labels,
    );
    if status.is_client_error() || status.is_server_error() {
        state.metrics.inc_counter(names::HTTP_REQUEST_ERRORS_TOTAL, &labels);
    }

    response
}
