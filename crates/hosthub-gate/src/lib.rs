//! # HostHub Gate - Request Admission
//!
//! Every inbound API request passes through the admission gate before any
//! business logic runs. The gate is an ordered pipeline:
//!
//! ```text
//! Request ──▶ Exemption check ──▶ Rate Limiter ──▶ Origin Validator ──▶ Handler
//!                  │                    │                  │
//!                  ▼                    ▼                  ▼
//!              bypass both          429 + JSON         403 + JSON
//! ```
//!
//! - **Rate Limiter**: fixed-window counter keyed by `clientId:routePath`,
//!   with opportunistic eviction of expired windows.
//! - **Origin Validator**: same-host comparison of `Origin`/`Referer`
//!   against `Host` for state-changing methods, substituting for
//!   token-based CSRF defense.
//! - **Exemptions**: webhook receivers, job triggers, streaming endpoints,
//!   and public asset reads bypass both checks and authenticate themselves.
//!
//! The pipeline core ([`AdmissionGate::evaluate`]) takes only method, path,
//! and header values, so it is testable without a live network stack. The
//! [`AdmissionLayer`] wraps it as `tower` middleware for the portal router.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod gate;
pub mod limiter;
pub mod middleware;
pub mod origin;
pub mod ports;

// Re-exports for public API
pub use domain::config::{ConfigError, GateConfig, RateLimitConfig};
pub use domain::decision::{AdmissionDecision, RateLimitDecision, RequestMeta};
pub use gate::{client_id_from_headers, AdmissionGate};
pub use limiter::{RateLimiter, RateLimiterStats};
pub use middleware::AdmissionLayer;
pub use origin::{is_safe_method, is_trusted_origin, verify_csrf_origin};
pub use ports::{SystemTimeSource, TimeSource};
