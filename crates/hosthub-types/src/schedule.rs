//! # Schedule Vocabulary
//!
//! Duty-event kinds and the (kind, date) slot unit that schedule
//! assignments and swap requests are keyed on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar date of a scheduled duty, ISO `YYYY-MM-DD` on the wire.
pub type ShiftDate = chrono::NaiveDate;

/// The kinds of recurring duty events staff can be assigned to.
///
/// Wire form is kebab-case (`"security-am"`, `"building-892"`, ...) and is
/// part of the portal's public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Standup,
    Demo,
    // kebab-case renaming does not break before digits
    #[serde(rename = "building-892")]
    Building892,
    SecurityAm,
    SecurityPm,
}

impl EventKind {
    /// All kinds, in display order.
    pub const ALL: [EventKind; 5] = [
        EventKind::Standup,
        EventKind::Demo,
        EventKind::Building892,
        EventKind::SecurityAm,
        EventKind::SecurityPm,
    ];

    /// The stable wire string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Standup => "standup",
            EventKind::Demo => "demo",
            EventKind::Building892 => "building-892",
            EventKind::SecurityAm => "security-am",
            EventKind::SecurityPm => "security-pm",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an event-kind string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind: {0}")]
pub struct EventKindParseError(pub String);

impl FromStr for EventKind {
    type Err = EventKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standup" => Ok(EventKind::Standup),
            "demo" => Ok(EventKind::Demo),
            "building-892" => Ok(EventKind::Building892),
            "security-am" => Ok(EventKind::SecurityAm),
            "security-pm" => Ok(EventKind::SecurityPm),
            other => Err(EventKindParseError(other.to_owned())),
        }
    }
}

/// One assignable unit of the schedule: a duty kind on a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub kind: EventKind,
    pub date: ShiftDate,
}

impl ShiftSlot {
    pub fn new(kind: EventKind, date: ShiftDate) -> Self {
        Self { kind, date }
    }
}

impl fmt::Display for ShiftSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.kind, self.date)
    }
}
