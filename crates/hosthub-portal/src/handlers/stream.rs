//! Live event stream endpoint.

use axum::extract::State;
use axum::response::Response;

use crate::service::AppState;

/// `GET /api/stream`
///
/// Long-lived NDJSON response fed by the event bus. Exempt from the
/// admission gate: one browser tab holds this open for hours and would
/// otherwise eat its rate window doing nothing.
pub async fn stream_feed(State(state): State<AppState>) -> Response {
    state.feed.response()
}
