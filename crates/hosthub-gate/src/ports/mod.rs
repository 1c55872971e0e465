//! Ports layer for the admission gate.
//!
//! The gate's only driven dependency is a clock, abstracted so window
//! arithmetic is testable with deterministic time.

pub mod outbound;

pub use outbound::*;
