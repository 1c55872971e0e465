//! Tower middleware wrapping the admission gate for the portal router.
//!
//! The layer evaluates the pipeline on each request and short-circuits
//! rejections into structured JSON errors; admitted requests pass through
//! untouched.

use crate::domain::decision::{AdmissionDecision, RequestMeta};
use crate::gate::AdmissionGate;
use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tower::{Layer, Service};

/// Admission layer
#[derive(Clone)]
pub struct AdmissionLayer {
    gate: Arc<AdmissionGate>,
}

impl AdmissionLayer {
    pub fn new(gate: Arc<AdmissionGate>) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> Arc<AdmissionGate> {
        Arc::clone(&self.gate)
    }
}

impl<S> Layer<S> for AdmissionLayer {
    type Service = AdmissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdmissionService {
            inner,
            gate: Arc::clone(&self.gate),
        }
    }
}

/// Admission service
#[derive(Clone)]
pub struct AdmissionService<S> {
    inner: S,
    gate: Arc<AdmissionGate>,
}

impl<S> Service<Request<Body>> for AdmissionService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let gate = Arc::clone(&self.gate);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let decision = {
                let meta = RequestMeta {
                    method: req.method(),
                    path: req.uri().path(),
                    headers: req.headers(),
                };
                gate.evaluate(&meta)
            };

            match decision {
                AdmissionDecision::Admit => inner.call(req).await,
                AdmissionDecision::RateLimited {
                    retry_after_secs,
                    remaining,
                    reset_at,
                } => Ok(rate_limit_response(retry_after_secs, remaining, reset_at)),
                AdmissionDecision::UntrustedOrigin => Ok(untrusted_origin_response()),
            }
        })
    }
}

/// Create rate limit exceeded response
fn rate_limit_response(retry_after_secs: u64, remaining: u32, reset_at: u64) -> Response {
    let body = serde_json::json!({ "error": "Too many requests" });

    let mut response = Response::new(Body::from(serde_json::to_vec(&body).unwrap_or_default()));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert("Retry-After", HeaderValue::from(retry_after_secs));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(reset_at));

    response
}

/// Create untrusted origin response
fn untrusted_origin_response() -> Response {
    let body = serde_json::json!({ "error": "Invalid request origin" });

    let mut response = Response::new(Body::from(serde_json::to_vec(&body).unwrap_or_default()));
    *response.status_mut() = StatusCode::FORBIDDEN;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    response
}
