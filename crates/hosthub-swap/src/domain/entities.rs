//! Shift-swap domain entities.
//!
//! `ShiftSwapRequest` is the persisted record of one proposed trade. Its
//! camelCase serde form is the wire contract the portal UI consumes.

use chrono::{DateTime, Utc};
use hosthub_types::{EventKind, ShiftDate, ShiftSlot, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle of a swap request. Everything but `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Denied,
    Cancelled,
}

impl SwapStatus {
    /// Terminal statuses are immutable; only `pending` is actionable.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Denied => "denied",
            SwapStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The recipient's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapAction {
    Accept,
    Deny,
}

impl fmt::Display for SwapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SwapAction::Accept => "accept",
            SwapAction::Deny => "deny",
        })
    }
}

/// One proposed duty-slot trade between two staff members.
///
/// Created by the requester for a slot they currently hold, addressed to
/// the recipient who would take it over. Mutated only by the recipient
/// (accept/deny) or the requester (cancel), and only while `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSwapRequest {
    pub id: Uuid,
    pub event_type: EventKind,
    pub event_date: ShiftDate,
    pub requester_id: UserId,
    pub recipient_id: UserId,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ShiftSwapRequest {
    /// Build a fresh `pending` request.
    #[must_use]
    pub fn new_pending(
        slot: ShiftSlot,
        requester_id: UserId,
        recipient_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: slot.kind,
            event_date: slot.date,
            requester_id,
            recipient_id,
            status: SwapStatus::Pending,
            created_at,
            resolved_at: None,
        }
    }

    /// The slot this request proposes to trade.
    #[must_use]
    pub fn slot(&self) -> ShiftSlot {
        ShiftSlot::new(self.event_type, self.event_date)
    }
}

/// One row of the authoritative schedule snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAssignment {
    pub event_type: EventKind,
    pub event_date: ShiftDate,
    pub user_id: UserId,
}

impl SlotAssignment {
    #[must_use]
    pub fn new(slot: ShiftSlot, user_id: UserId) -> Self {
        Self {
            event_type: slot.kind,
            event_date: slot.date,
            user_id,
        }
    }
}
