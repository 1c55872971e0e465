//! # Live Stream Bridge
//!
//! Pushes bus events to clients over a long-lived NDJSON stream and mirrors
//! them back into a client-side event bus.
//!
//! ## Data Flow
//!
//! ```text
//!  server                                      client
//!  ┌──────────┐   frames    ┌──────────┐  lines  ┌──────────────┐
//!  │ EventBus │──subscribe─▶│StreamFeed│═══HTTP══▶│ StreamBridge │
//!  └──────────┘             └──────────┘          └──────┬───────┘
//!       ▲                    one queue per              fan-out per
//!       │                    connection,                channel to
//!    publishers              drop on full               listeners
//! ```
//!
//! One frame per line: `{"channel": "...", "payload": ...}`. Undecodable
//! lines are dropped silently on the client side. The feed writes a
//! keep-alive frame every 30 seconds so idle connections survive
//! intermediaries.
//!
//! The bridge maintains exactly one connection per context, established
//! lazily on the first listener subscription and kept alive through a
//! fixed-delay reconnect loop until `shutdown()`. Unsubscribing listeners
//! never tears the connection down.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod feed;
pub mod frame;

// Re-exports for public API
pub use bridge::{BridgeState, ConnectError, StreamBridge, StreamConnector};
pub use feed::{FeedConfig, StreamFeed};
pub use frame::StreamFrame;
