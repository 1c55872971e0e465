//! In-memory schedule store.
//!
//! Backs the portal in single-process deployments and every test. Each
//! method takes one short lock; nothing is held across awaits, which is
//! the per-operation atomicity the [`ScheduleStore`] contract promises.

use crate::domain::entities::{ShiftSwapRequest, SlotAssignment, SwapStatus};
use crate::domain::errors::SwapError;
use crate::ports::ScheduleStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hosthub_types::{ShiftSlot, UserId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// In-memory implementation of [`ScheduleStore`].
#[derive(Default)]
pub struct MemoryScheduleStore {
    assignments: RwLock<HashMap<ShiftSlot, UserId>>,
    requests: RwLock<HashMap<Uuid, ShiftSwapRequest>>,
    users: RwLock<HashSet<UserId>>,
}

impl MemoryScheduleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style user registration for test and seed setup.
    #[must_use]
    pub fn with_user(self, user: impl Into<UserId>) -> Self {
        self.users.write().insert(user.into());
        self
    }

    /// Builder-style slot assignment for test and seed setup.
    ///
    /// Also registers the holder as a known user.
    #[must_use]
    pub fn with_assignment(self, slot: ShiftSlot, holder: impl Into<UserId>) -> Self {
        let holder = holder.into();
        self.users.write().insert(holder.clone());
        self.assignments.write().insert(slot, holder);
        self
    }

    /// Assign (or reassign) a slot at runtime.
    pub fn assign(&self, slot: ShiftSlot, holder: UserId) {
        self.users.write().insert(holder.clone());
        self.assignments.write().insert(slot, holder);
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn slot_holder(&self, slot: &ShiftSlot) -> Result<Option<UserId>, SwapError> {
        Ok(self.assignments.read().get(slot).cloned())
    }

    async fn transfer_slot(
        &self,
        slot: &ShiftSlot,
        from: &UserId,
        to: &UserId,
    ) -> Result<(), SwapError> {
        let mut assignments = self.assignments.write();
        match assignments.get(slot) {
            Some(holder) if holder == from => {
                assignments.insert(*slot, to.clone());
                Ok(())
            }
            _ => Err(SwapError::SlotNotHeld(*slot)),
        }
    }

    async fn user_exists(&self, user: &UserId) -> Result<bool, SwapError> {
        Ok(self.users.read().contains(user))
    }

    async fn insert_request(&self, request: ShiftSwapRequest) -> Result<(), SwapError> {
        self.requests.write().insert(request.id, request);
        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<ShiftSwapRequest>, SwapError> {
        Ok(self.requests.read().get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: SwapStatus,
        resolved_at: DateTime<Utc>,
    ) -> Result<ShiftSwapRequest, SwapError> {
        let mut requests = self.requests.write();
        let request = requests.get_mut(&id).ok_or(SwapError::NotFound)?;
        if request.status != SwapStatus::Pending {
            return Err(SwapError::NotPending);
        }
        request.status = status;
        request.resolved_at = Some(resolved_at);
        Ok(request.clone())
    }

    async fn find_pending(
        &self,
        requester: &UserId,
        slot: &ShiftSlot,
    ) -> Result<Option<ShiftSwapRequest>, SwapError> {
        Ok(self
            .requests
            .read()
            .values()
            .find(|request| {
                request.status == SwapStatus::Pending
                    && request.requester_id == *requester
                    && request.slot() == *slot
            })
            .cloned())
    }

    async fn pending_for_recipient(&self, recipient: &UserId) -> Result<u64, SwapError> {
        Ok(self
            .requests
            .read()
            .values()
            .filter(|request| {
                request.status == SwapStatus::Pending && request.recipient_id == *recipient
            })
            .count() as u64)
    }

    async fn assignments_snapshot(&self) -> Result<Vec<SlotAssignment>, SwapError> {
        let mut snapshot: Vec<SlotAssignment> = self
            .assignments
            .read()
            .iter()
            .map(|(slot, holder)| SlotAssignment::new(*slot, holder.clone()))
            .collect();
        snapshot.sort_by(|a, b| {
            (a.event_date, a.event_type.as_str()).cmp(&(b.event_date, b.event_type.as_str()))
        });
        Ok(snapshot)
    }
}
