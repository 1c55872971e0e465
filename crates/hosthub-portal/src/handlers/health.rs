//! Health and statistics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hosthub_types::{PAYMENTS_CHANNEL, SCHEDULE_CHANNEL};

use crate::service::AppState;

/// `GET /health`
///
/// Liveness plus a few operational counters. Lives outside the gated
/// `/api/` prefix so load balancers can always reach it.
pub async fn health(State(state): State<AppState>) -> Response {
    let limiter = state.gate.limiter().stats();
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "rate_limiter": limiter,
        "stream_listeners": {
            SCHEDULE_CHANNEL: state.bus.listener_count(SCHEDULE_CHANNEL),
            PAYMENTS_CHANNEL: state.bus.listener_count(PAYMENTS_CHANNEL),
        },
    });

    (StatusCode::OK, Json(body)).into_response()
}
