//! Admission pipeline composing the rate limiter and origin validator.

use crate::domain::config::GateConfig;
use crate::domain::decision::{AdmissionDecision, RequestMeta};
use crate::limiter::RateLimiter;
use crate::origin::verify_csrf_origin;
use crate::ports::TimeSource;
use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::warn;

/// Client identity for rate-limit bucketing.
///
/// First IP in the `x-forwarded-for` chain, else `x-real-ip`, else the
/// literal `"unknown"` - all unidentifiable clients share one bucket per
/// route. That shared fate is the conservative fallback: failing open for
/// clients we cannot name would be worse.
#[must_use]
pub fn client_id_from_headers(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_owned();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_owned();
        }
    }

    "unknown".to_owned()
}

/// The admission checkpoint preceding business logic.
///
/// Constructed explicitly and injected wherever requests enter, never held
/// as an ambient global, so tests can instantiate isolated instances.
pub struct AdmissionGate {
    config: GateConfig,
    limiter: RateLimiter,
    time: Arc<dyn TimeSource>,
}

impl AdmissionGate {
    pub fn new(config: GateConfig, time: Arc<dyn TimeSource>) -> Self {
        let limiter = RateLimiter::new(time.clone(), config.sweep_interval);
        Self {
            config,
            limiter,
            time,
        }
    }

    /// The shared limiter, for stats and the maintenance sweep trigger.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Whether a path bypasses both pipeline stages.
    ///
    /// Exempt endpoints (webhook receivers, job triggers, stream feeds,
    /// asset reads) authenticate themselves; the gate gives them nothing.
    #[must_use]
    pub fn is_exempt(&self, path: &str) -> bool {
        self.config
            .exempt_paths
            .iter()
            .any(|exempt| exempt == path)
            || self
                .config
                .exempt_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Run the pipeline: exemptions, then rate limit (cheapest rejection
    /// first), then origin validation for non-safe methods. A rejection at
    /// either stage short-circuits.
    pub fn evaluate(&self, meta: &RequestMeta<'_>) -> AdmissionDecision {
        if !self.config.enabled {
            return AdmissionDecision::Admit;
        }
        if !meta.path.starts_with(self.config.api_prefix.as_str()) {
            return AdmissionDecision::Admit;
        }
        if self.is_exempt(meta.path) {
            return AdmissionDecision::Admit;
        }

        let client_id = client_id_from_headers(meta.headers);
        let profile = if self
            .config
            .strict_prefixes
            .iter()
            .any(|prefix| meta.path.starts_with(prefix.as_str()))
        {
            &self.config.strict_limit
        } else {
            &self.config.default_limit
        };

        let decision = self.limiter.check(&client_id, meta.path, profile);
        if !decision.allowed {
            let now = self.time.now();
            let retry_after_ms = decision.reset_at.saturating_sub(now);
            warn!(
                client = %client_id,
                path = %meta.path,
                retry_after_ms = retry_after_ms,
                "Rate limit exceeded"
            );
            return AdmissionDecision::RateLimited {
                retry_after_secs: ((retry_after_ms + 999) / 1000).max(1),
                remaining: decision.remaining,
                reset_at: decision.reset_at,
            };
        }

        if !verify_csrf_origin(meta.method, meta.headers) {
            warn!(
                client = %client_id,
                path = %meta.path,
                method = %meta.method,
                "Untrusted request origin"
            );
            return AdmissionDecision::UntrustedOrigin;
        }

        AdmissionDecision::Admit
    }
}
