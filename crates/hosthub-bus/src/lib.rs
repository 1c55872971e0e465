//! # HostHub Bus - In-Process Event Bus
//!
//! Process-wide publish/subscribe registry driving live portal updates.
//! Channels are plain strings created implicitly on first subscribe or
//! publish; there is no registration step and no cross-instance fanout.
//!
//! ## Delivery Model
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Coordinator │                    │ Stream Feed  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  │              │  subscribe()
//!                  └──────────────┘
//! ```
//!
//! Listeners are invoked **synchronously, in subscription order**, on the
//! publishing task. There is no back-pressure: a slow listener delays every
//! listener subscribed after it on the same publish call. Listeners must
//! therefore enqueue work and return instead of performing blocking I/O
//! inline.
//!
//! ## Registry Safety
//!
//! Publish copies the channel's listener list out under a read lock and
//! iterates the copy with no lock held, so a listener may subscribe or
//! unsubscribe (including itself) during delivery without deadlocking or
//! invalidating the iteration.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod subscription;

// Re-export main types
pub use bus::{BusEvent, EventBus};
pub use subscription::Subscription;
