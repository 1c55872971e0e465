//! Outbound (Driven) ports for the shift-swap subsystem.
//!
//! The coordinator talks to persistence, the page cache, and the clock
//! only through these traits so every operation is testable with in-memory
//! fakes and deterministic time.

use crate::domain::entities::{ShiftSwapRequest, SlotAssignment, SwapStatus};
use crate::domain::errors::SwapError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hosthub_types::{ShiftSlot, UserId};
use uuid::Uuid;

/// Persistence for schedule assignments and swap-request records.
///
/// Implementations guarantee per-operation atomicity only; the coordinator
/// layers its transfer-before-status rule on top of that.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Current holder of a slot, if anyone is assigned.
    async fn slot_holder(&self, slot: &ShiftSlot) -> Result<Option<UserId>, SwapError>;

    /// Move a slot from `from` to `to`.
    ///
    /// Compare-and-swap semantics: fails with [`SwapError::SlotNotHeld`]
    /// unless `from` holds the slot at the moment of the transfer.
    async fn transfer_slot(
        &self,
        slot: &ShiftSlot,
        from: &UserId,
        to: &UserId,
    ) -> Result<(), SwapError>;

    /// Whether a user id names a known staff member.
    async fn user_exists(&self, user: &UserId) -> Result<bool, SwapError>;

    /// Persist a new request record.
    async fn insert_request(&self, request: ShiftSwapRequest) -> Result<(), SwapError>;

    /// Fetch a request by id.
    async fn get_request(&self, id: Uuid) -> Result<Option<ShiftSwapRequest>, SwapError>;

    /// Advance a request out of `pending`.
    ///
    /// Compare-and-swap on status: fails with [`SwapError::NotPending`] if
    /// the request has already resolved, so concurrent transitions are
    /// mutually exclusive. Returns the updated record.
    async fn update_status(
        &self,
        id: Uuid,
        status: SwapStatus,
        resolved_at: DateTime<Utc>,
    ) -> Result<ShiftSwapRequest, SwapError>;

    /// The outstanding `pending` request by this requester for this slot,
    /// if one exists.
    async fn find_pending(
        &self,
        requester: &UserId,
        slot: &ShiftSlot,
    ) -> Result<Option<ShiftSwapRequest>, SwapError>;

    /// Count of `pending` requests addressed to this recipient.
    async fn pending_for_recipient(&self, recipient: &UserId) -> Result<u64, SwapError>;

    /// Authoritative snapshot of all slot assignments.
    async fn assignments_snapshot(&self) -> Result<Vec<SlotAssignment>, SwapError>;
}

/// Best-effort invalidation of cached page data.
///
/// Infallible by contract: implementations swallow and log their own
/// failures so invalidation can never fail the mutation it follows.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Drop cached data for a view key.
    async fn invalidate(&self, view: &str);
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// The current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock time source for testing.
#[cfg(test)]
pub struct MockTimeSource {
    time: parking_lot::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl MockTimeSource {
    pub fn new(initial: DateTime<Utc>) -> Self {
        Self {
            time: parking_lot::Mutex::new(initial),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.time.lock();
        *time += duration;
    }
}

#[cfg(test)]
impl TimeSource for MockTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.time.lock()
    }
}
