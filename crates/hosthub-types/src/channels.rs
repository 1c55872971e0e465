//! Pub/sub channel names shared between publishers and subscribers.
//!
//! Channels are created implicitly on first subscribe or publish; these
//! constants exist only so both sides spell the topic the same way.

/// Schedule mutations (swap created/accepted/denied/cancelled, assignment
/// transfers). Clients listening here re-fetch the authoritative schedule.
pub const SCHEDULE_CHANNEL: &str = "hosthubSchedule";

/// Payment webhook notifications relayed to connected clients.
pub const PAYMENTS_CHANNEL: &str = "hosthubPayments";

/// Idle-connection keep-alive frames on the stream feed. Carries no payload.
pub const KEEPALIVE_CHANNEL: &str = "keepalive";
