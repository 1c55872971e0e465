//! Domain layer for shift swaps.

pub mod entities;
pub mod errors;

pub use entities::{ShiftSwapRequest, SlotAssignment, SwapAction, SwapStatus};
pub use errors::SwapError;
