//! # Shift-Swap Coordinator
//!
//! Lets two staff members trade a scheduled duty slot with mutual consent.
//! A requester proposes handing a slot they hold to a recipient; the
//! recipient accepts or denies; the requester may cancel while the proposal
//! is still open.
//!
//! ## State Machine
//!
//! ```text
//!              ┌─accept─▶ accepted   (slot transferred)
//!              │
//! pending ─────┼─deny───▶ denied
//!              │
//!              └─cancel─▶ cancelled
//! ```
//!
//! Transitions out of `pending` are mutually exclusive and guarded against
//! replay: a request that has already resolved answers any further
//! accept/deny/cancel with a conflict instead of double-applying.
//!
//! ## Consistency Rules
//!
//! - On accept, the schedule assignment transfers from requester to
//!   recipient **before** the request status advances; a failed transfer
//!   leaves the request `pending` and surfaces an error.
//! - After every successful mutation the coordinator broadcasts on the
//!   schedule channel and invalidates cached schedule views. Both are
//!   best-effort and can never fail the mutation they follow: push is a
//!   freshness hint, the schedule read endpoint is authoritative.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! adapters/  - In-memory schedule store, no-op cache invalidator
//! ports/     - ScheduleStore, CacheInvalidator, TimeSource traits
//! domain/    - ShiftSwapRequest, SwapStatus, SwapError
//! coordinator.rs - The operations: create, respond, cancel, count
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod coordinator;
pub mod domain;
pub mod ports;

// Re-exports for public API
pub use adapters::{MemoryScheduleStore, NoopCacheInvalidator};
pub use coordinator::SwapCoordinator;
pub use domain::entities::{ShiftSwapRequest, SlotAssignment, SwapAction, SwapStatus};
pub use domain::errors::SwapError;
pub use ports::{CacheInvalidator, ScheduleStore, SystemTimeSource, TimeSource};

/// Cache view key for schedule page data.
pub const SCHEDULE_VIEW: &str = "schedule";
