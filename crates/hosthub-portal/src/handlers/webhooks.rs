//! Payment webhook receiver.
//!
//! The payment provider signs each delivery with HMAC-SHA256 over the raw
//! body and sends the hex digest in `x-hosthub-signature`. The route is
//! exempt from the admission gate (the provider is not a browser and sends
//! no Origin), so the signature is the whole trust story: verification
//! failures are rejected before the body is even parsed.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hmac::{Hmac, Mac};
use hosthub_types::PAYMENTS_CHANNEL;
use sha2::Sha256;
use tracing::{info, warn};

use crate::handlers::json_error;
use crate::service::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC digest.
pub const SIGNATURE_HEADER: &str = "x-hosthub-signature";

/// `POST /api/webhooks/payments`
pub async fn receive_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !verify_signature(&state.config.webhook.secret, &body, signature) {
        warn!("Rejected payment webhook with bad signature");
        return json_error(StatusCode::UNAUTHORIZED, "Invalid signature");
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(%error, "Signed webhook carried a non-JSON body");
            return json_error(StatusCode::BAD_REQUEST, "Invalid payload");
        }
    };

    info!(
        event = payload.get("event").and_then(|e| e.as_str()).unwrap_or("unknown"),
        "Payment webhook accepted"
    );
    state.bus.publish(PAYMENTS_CHANNEL, Some(payload));

    (StatusCode::OK, Json(serde_json::json!({ "received": true }))).into_response()
}

/// Verify a hex HMAC-SHA256 digest over the raw body.
fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);

    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    // verify_slice is constant-time
    mac.verify_slice(&signature).is_ok()
}
