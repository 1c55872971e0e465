//! # HostHub Portal
//!
//! The staff portal's HTTP service: request admission, shift-swap
//! coordination, the schedule snapshot, the payment webhook receiver, the
//! maintenance job trigger and the live NDJSON event feed, assembled into
//! one axum router.
//!
//! ## Request Path
//!
//! ```text
//! Request ──▶ Trace ──▶ CORS ──▶ Admission Gate ──▶ Handler
//!                                     │
//!                                     ▼
//!                              429 / 403 + JSON
//! ```
//!
//! Identity arrives in the `x-hosthub-user` header, injected by the
//! session-terminating proxy in front of this service. The webhook and job
//! routes are exempt from the gate and authenticate themselves (HMAC
//! signature, shared key).

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod handlers;
pub mod service;

// Re-exports for public API
pub use config::{
    ConfigError, CorsConfig, JobsConfig, PortalConfig, ServerConfig, StreamConfig, WebhookConfig,
};
pub use service::{AppState, PortalError, PortalService};
