//! Ports layer for the shift-swap subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Outbound (Driven) ports: schedule persistence, cache invalidation,
//!   and the clock.

pub mod outbound;

pub use outbound::*;
