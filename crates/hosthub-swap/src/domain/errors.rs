//! Shift-swap error taxonomy.
//!
//! Authorization failures and conflicts are expected outcomes here, not
//! faults: the portal converts every variant except `Storage` into a
//! structured `{success: false, message}` result so the UI can render
//! inline feedback without a crash boundary.

use hosthub_types::{ShiftSlot, UserId};

/// Why a swap operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    /// No request with that id exists.
    #[error("Swap request not found")]
    NotFound,

    /// The request has already been accepted, denied, or cancelled.
    #[error("Swap request is not pending")]
    NotPending,

    /// Only the recipient may accept or deny.
    #[error("Only the recipient can respond to this swap request")]
    NotRecipient,

    /// Only the requester may cancel.
    #[error("Only the requester can cancel this swap request")]
    NotRequester,

    /// Requester and recipient must differ.
    #[error("Cannot create a swap request with yourself")]
    SelfSwap,

    /// An identical pending request already exists.
    #[error("A pending swap request for this shift already exists")]
    DuplicatePending,

    /// The requester does not currently hold the slot.
    #[error("You are not assigned to {0}")]
    SlotNotHeld(ShiftSlot),

    /// The addressed recipient is not a known user.
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(UserId),

    /// The backing store failed; the only variant that is a real fault.
    #[error("storage error: {0}")]
    Storage(String),
}

impl SwapError {
    /// Whether this is an expected business outcome (reported as a
    /// structured failure) rather than an infrastructure fault.
    #[must_use]
    pub fn is_business_outcome(&self) -> bool {
        !matches!(self, SwapError::Storage(_))
    }
}
