//! Cross-crate integration flows.

pub mod admission;
pub mod live_updates;
pub mod swap_flows;
