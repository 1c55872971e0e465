//! Decision types produced by the admission pipeline stages.

use axum::http::{HeaderMap, Method};
use serde::Serialize;

/// The slice of a request the gate inspects.
///
/// Transport-agnostic on purpose: the pipeline takes only method, path,
/// and header values, never a live connection.
#[derive(Debug, Clone, Copy)]
pub struct RequestMeta<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub headers: &'a HeaderMap,
}

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    /// Whether the request fits inside the current window
    pub allowed: bool,
    /// Requests left in the window (0 when rejected)
    pub remaining: u32,
    /// Epoch milliseconds when the window rolls over
    pub reset_at: u64,
}

/// Outcome of the full admission pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Pass through to the handler
    Admit,
    /// Rejected by the rate limiter
    RateLimited {
        /// Whole seconds until the window rolls over, rounded up
        retry_after_secs: u64,
        /// Requests left in the window
        remaining: u32,
        /// Epoch milliseconds when the window rolls over
        reset_at: u64,
    },
    /// Rejected by the origin validator
    UntrustedOrigin,
}

impl AdmissionDecision {
    /// Whether the request may proceed.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admit)
    }
}
