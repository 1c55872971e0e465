//! The shift-swap coordinator: create, respond, cancel, count.
//!
//! Every mutating operation validates, commits through the store, then
//! broadcasts on the schedule channel and invalidates cached schedule
//! views. The broadcast and invalidation run after the commit and cannot
//! fail the operation.

use crate::domain::entities::{ShiftSwapRequest, SwapAction, SwapStatus};
use crate::domain::errors::SwapError;
use crate::ports::{CacheInvalidator, ScheduleStore, TimeSource};
use crate::SCHEDULE_VIEW;
use hosthub_bus::EventBus;
use hosthub_types::{EventKind, ShiftDate, ShiftSlot, UserId, SCHEDULE_CHANNEL};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Coordinates duty-slot trades between staff members.
pub struct SwapCoordinator {
    store: Arc<dyn ScheduleStore>,
    bus: Arc<EventBus>,
    cache: Arc<dyn CacheInvalidator>,
    time: Arc<dyn TimeSource>,
}

impl SwapCoordinator {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        bus: Arc<EventBus>,
        cache: Arc<dyn CacheInvalidator>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            bus,
            cache,
            time,
        }
    }

    /// Propose handing a held slot to a recipient.
    ///
    /// Validation order: distinct recipient, recipient exists, requester
    /// holds the slot, no duplicate pending request for the same
    /// (requester, kind, date) triple. The first failure wins.
    pub async fn create(
        &self,
        requester: &UserId,
        kind: EventKind,
        date: ShiftDate,
        recipient: &UserId,
    ) -> Result<ShiftSwapRequest, SwapError> {
        if requester == recipient {
            return Err(SwapError::SelfSwap);
        }
        if !self.store.user_exists(recipient).await? {
            return Err(SwapError::UnknownRecipient(recipient.clone()));
        }

        let slot = ShiftSlot::new(kind, date);
        match self.store.slot_holder(&slot).await? {
            Some(holder) if holder == *requester => {}
            _ => return Err(SwapError::SlotNotHeld(slot)),
        }

        if self.store.find_pending(requester, &slot).await?.is_some() {
            return Err(SwapError::DuplicatePending);
        }

        let request = ShiftSwapRequest::new_pending(
            slot,
            requester.clone(),
            recipient.clone(),
            self.time.now(),
        );
        self.store.insert_request(request.clone()).await?;

        info!(
            request_id = %request.id,
            requester = %requester,
            recipient = %recipient,
            slot = %slot,
            "Swap request created"
        );
        self.after_commit("created", &request).await;
        Ok(request)
    }

    /// Accept or deny a pending request. Recipient only.
    ///
    /// On accept the slot transfers from requester to recipient first; the
    /// status advances only after the transfer is confirmed, so a failed
    /// transfer leaves the request `pending` with the schedule untouched.
    pub async fn respond(
        &self,
        caller: &UserId,
        request_id: Uuid,
        action: SwapAction,
    ) -> Result<ShiftSwapRequest, SwapError> {
        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or(SwapError::NotFound)?;
        if request.status != SwapStatus::Pending {
            return Err(SwapError::NotPending);
        }
        if request.recipient_id != *caller {
            return Err(SwapError::NotRecipient);
        }

        let updated = match action {
            SwapAction::Accept => {
                let slot = request.slot();
                self.store
                    .transfer_slot(&slot, &request.requester_id, &request.recipient_id)
                    .await?;
                match self
                    .store
                    .update_status(request_id, SwapStatus::Accepted, self.time.now())
                    .await
                {
                    Ok(updated) => updated,
                    Err(status_error) => {
                        // A concurrent transition won between transfer and
                        // status update. Hand the slot back so schedule and
                        // request agree, then surface the conflict.
                        if let Err(undo_error) = self
                            .store
                            .transfer_slot(&slot, &request.recipient_id, &request.requester_id)
                            .await
                        {
                            error!(
                                request_id = %request_id,
                                error = %undo_error,
                                "Failed to return slot after lost status race"
                            );
                        }
                        return Err(status_error);
                    }
                }
            }
            SwapAction::Deny => {
                self.store
                    .update_status(request_id, SwapStatus::Denied, self.time.now())
                    .await?
            }
        };

        info!(
            request_id = %request_id,
            caller = %caller,
            status = %updated.status,
            "Swap request resolved"
        );
        self.after_commit(&action.to_string(), &updated).await;
        Ok(updated)
    }

    /// Withdraw a pending request. Requester only.
    pub async fn cancel(
        &self,
        caller: &UserId,
        request_id: Uuid,
    ) -> Result<ShiftSwapRequest, SwapError> {
        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or(SwapError::NotFound)?;
        if request.status != SwapStatus::Pending {
            return Err(SwapError::NotPending);
        }
        if request.requester_id != *caller {
            return Err(SwapError::NotRequester);
        }

        let updated = self
            .store
            .update_status(request_id, SwapStatus::Cancelled, self.time.now())
            .await?;

        info!(request_id = %request_id, caller = %caller, "Swap request cancelled");
        self.after_commit("cancelled", &updated).await;
        Ok(updated)
    }

    /// Pending requests addressed to this user (notification badge).
    /// Read-only; no broadcast.
    pub async fn count_pending_for(&self, user: &UserId) -> Result<u64, SwapError> {
        self.store.pending_for_recipient(user).await
    }

    /// Broadcast the mutation and drop cached schedule views.
    ///
    /// Runs after the store commit; failures are logged and swallowed so
    /// the committed mutation stands. Connected clients treat the push as
    /// a hint and re-fetch the authoritative schedule.
    async fn after_commit(&self, action: &str, request: &ShiftSwapRequest) {
        let payload = match serde_json::to_value(request) {
            Ok(value) => Some(json!({ "action": action, "request": value })),
            Err(encode_error) => {
                warn!(error = %encode_error, "Failed to encode schedule broadcast");
                None
            }
        };
        self.bus.publish(SCHEDULE_CHANNEL, payload);
        self.cache.invalidate(SCHEDULE_VIEW).await;
    }
}
