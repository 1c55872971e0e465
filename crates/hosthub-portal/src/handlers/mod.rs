//! HTTP handlers for the portal API.
//!
//! Handlers sit behind the admission middleware, so by the time one runs the
//! request has already passed rate limiting and origin validation. Identity
//! comes from the `x-hosthub-user` header the front-end proxy injects after
//! session auth; handlers that act on behalf of a user reject requests
//! without it.

pub mod health;
pub mod jobs;
pub mod schedule;
pub mod storage;
pub mod stream;
pub mod swaps;
pub mod webhooks;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hosthub_types::UserId;

/// Header carrying the authenticated staff id.
pub const USER_HEADER: &str = "x-hosthub-user";

/// Extract the calling staff member, or build the 401 that should be
/// returned instead.
pub(crate) fn require_caller(headers: &HeaderMap) -> Result<UserId, Response> {
    match headers.get(USER_HEADER).and_then(|value| value.to_str().ok()) {
        Some(user) if !user.trim().is_empty() => Ok(UserId::from(user.trim())),
        _ => Err(json_error(
            StatusCode::UNAUTHORIZED,
            "Missing user identity",
        )),
    }
}

/// Uniform JSON error body.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
