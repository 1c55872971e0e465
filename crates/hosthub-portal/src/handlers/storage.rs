//! Static asset stub.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Response;

use crate::handlers::json_error;

/// `GET /storage/*path`
///
/// Uploaded assets (avatars, rota exports) are served by the front-end CDN
/// in production. This stub keeps the path mounted and exempt so reverse
/// proxies that route everything here do not get 403s for image requests.
pub async fn get_asset(Path(path): Path<String>) -> Response {
    tracing::debug!(asset = %path, "Asset requested from stub storage route");
    json_error(StatusCode::NOT_FOUND, "Asset not found")
}
