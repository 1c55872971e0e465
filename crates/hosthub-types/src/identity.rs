//! # User Identity
//!
//! Identifies staff members across the portal. Identity issuance itself is
//! delegated to the external identity provider; these types only carry the
//! already-authenticated subject through the subsystems.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a staff member.
///
/// Wraps the subject string issued by the identity provider. Compared
/// byte-for-byte; the portal never inspects its structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Portal role attached to a staff member.
///
/// Swap actions require an identified staff member; roles ride along for
/// handlers that branch on elevated access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Lead,
    Admin,
}

impl Role {
    /// Whether this role may act on behalf of other users.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Lead | Role::Admin)
    }
}
