//! # HostHub Types Crate
//!
//! This crate contains the domain vocabulary shared across the portal
//! subsystems: user identity, roles, duty-event kinds, schedule slots, and
//! the pub/sub channel names.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Cross-subsystem types are defined here.
//! - **Wire Stability**: Serde representations are part of the portal's
//!   public contract; the kebab-case event-kind strings and lowercase role
//!   strings must not change without a client migration.

pub mod channels;
pub mod identity;
pub mod schedule;

pub use channels::*;
pub use identity::{Role, UserId};
pub use schedule::{EventKind, EventKindParseError, ShiftDate, ShiftSlot};
