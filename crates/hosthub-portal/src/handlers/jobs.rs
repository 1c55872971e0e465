//! Maintenance job trigger.
//!
//! An external scheduler (cron, systemd timer) hits this route to run
//! housekeeping that should not wait for organic traffic. Auth is a shared
//! key in `x-hosthub-job-key`, compared in constant time.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::handlers::json_error;
use crate::service::AppState;

/// Header carrying the shared job key.
pub const JOB_KEY_HEADER: &str = "x-hosthub-job-key";

/// `POST /api/jobs/run`
///
/// Currently the only job is the rate-limiter sweep; the opportunistic
/// sweep already handles steady traffic, this catches idle deployments
/// where no request ever comes along to trigger it.
pub async fn run_jobs(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let presented = headers
        .get(JOB_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !constant_time_compare(presented, &state.config.jobs.secret) {
        warn!("Rejected job trigger with bad key");
        return json_error(StatusCode::UNAUTHORIZED, "Invalid job key");
    }

    let limiter = state.gate.limiter();
    let before = limiter.entry_count();
    limiter.sweep();
    let stats = limiter.stats();
    info!(
        removed = before.saturating_sub(stats.tracked_keys),
        "Manual maintenance sweep completed"
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "completed": ["rate-limiter-sweep"],
            "rate_limiter": stats,
        })),
    )
        .into_response()
}

/// Compare two strings in constant time.
///
/// Both inputs are padded to a common length with different fillers before
/// the comparison, so neither the content check nor the length check leaks
/// how much of a guessed key matched.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let max_len = a_bytes.len().max(b_bytes.len()).max(1);
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a_bytes.len()].copy_from_slice(a_bytes);
    b_padded[..b_bytes.len()].copy_from_slice(b_bytes);

    let lengths_equal = a_bytes.len() == b_bytes.len();
    let contents_equal: bool = a_padded.ct_eq(&b_padded).into();

    lengths_equal & contents_equal
}
