//! Shift-swap endpoints.
//!
//! Business refusals (not the slot holder, already resolved, wrong caller)
//! are part of the normal workflow and come back as HTTP 200 with
//! `success: false` so the front-end can surface the message inline. Only
//! storage faults map to 5xx.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hosthub_swap::{ShiftSwapRequest, SwapAction, SwapError};
use hosthub_types::{EventKind, ShiftDate, UserId};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::handlers::{json_error, require_caller};
use crate::service::AppState;

/// Body for `POST /api/swaps`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapBody {
    pub event_type: EventKind,
    pub event_date: ShiftDate,
    pub recipient_id: UserId,
}

/// Body for `POST /api/swaps/:id/respond`.
#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub action: SwapAction,
}

/// Envelope returned by every swap mutation.
#[derive(Debug, Serialize)]
pub struct SwapEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<ShiftSwapRequest>,
}

impl SwapEnvelope {
    fn ok(message: &str, request: ShiftSwapRequest) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            request: Some(request),
        }
    }

    fn refused(message: String) -> Self {
        Self {
            success: false,
            message,
            request: None,
        }
    }
}

/// `POST /api/swaps`
pub async fn create_swap(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateSwapBody>,
) -> Response {
    let caller = match require_caller(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    let result = state
        .coordinator
        .create(&caller, body.event_type, body.event_date, &body.recipient_id)
        .await;
    into_envelope(result, "Swap request sent")
}

/// `POST /api/swaps/:id/respond`
pub async fn respond_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<RespondBody>,
) -> Response {
    let caller = match require_caller(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    let message = match body.action {
        SwapAction::Accept => "Swap request accepted",
        SwapAction::Deny => "Swap request denied",
    };
    into_envelope(
        state.coordinator.respond(&caller, id, body.action).await,
        message,
    )
}

/// `POST /api/swaps/:id/cancel`
pub async fn cancel_swap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let caller = match require_caller(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    into_envelope(
        state.coordinator.cancel(&caller, id).await,
        "Swap request cancelled",
    )
}

/// `GET /api/swaps/pending-count`
///
/// Feeds the badge next to the inbox icon; read-only.
pub async fn pending_count(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let caller = match require_caller(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };

    match state.coordinator.count_pending_for(&caller).await {
        Ok(count) => (
            StatusCode::OK,
            Json(serde_json::json!({ "count": count })),
        )
            .into_response(),
        Err(error) => storage_failure(&caller, error),
    }
}

fn into_envelope(result: Result<ShiftSwapRequest, SwapError>, success_message: &str) -> Response {
    match result {
        Ok(request) => (
            StatusCode::OK,
            Json(SwapEnvelope::ok(success_message, request)),
        )
            .into_response(),
        Err(error) if error.is_business_outcome() => (
            StatusCode::OK,
            Json(SwapEnvelope::refused(error.to_string())),
        )
            .into_response(),
        Err(error) => {
            error!(%error, "Swap mutation hit a storage fault");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal storage error")
        }
    }
}

fn storage_failure(caller: &UserId, error: SwapError) -> Response {
    error!(user = %caller, %error, "Pending count lookup failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal storage error")
}
