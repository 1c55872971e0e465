//! Schedule read endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::handlers::json_error;
use crate::service::AppState;

/// `GET /api/schedule`
///
/// Authoritative snapshot of current slot assignments. Clients re-fetch this
/// when a `hosthubSchedule` frame arrives on the live stream.
pub async fn get_schedule(State(state): State<AppState>) -> Response {
    match state.schedule.assignments_snapshot().await {
        Ok(assignments) => (
            StatusCode::OK,
            Json(serde_json::json!({ "assignments": assignments })),
        )
            .into_response(),
        Err(error) => {
            error!(%error, "Schedule snapshot failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal storage error")
        }
    }
}
