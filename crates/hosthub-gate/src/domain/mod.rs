//! Domain types for the admission gate.
//!
//! Configuration, limit profiles, and the decision types the pipeline
//! stages produce.

pub mod config;
pub mod decision;

// Re-exports for convenience
pub use config::{ConfigError, GateConfig, RateLimitConfig};
pub use decision::{AdmissionDecision, RateLimitDecision, RequestMeta};
