//! # Subscription Handle
//!
//! Ties a registered listener to its owning context. Dropping the handle
//! removes the listener, so subscriptions cannot outlive the connection or
//! task that created them.

use crate::bus::ListenerRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Handle for one registered listener.
///
/// Removal happens on [`unsubscribe`](Self::unsubscribe) or on drop,
/// whichever comes first; both paths are idempotent and safe to hit after
/// the bus has already discarded the channel.
pub struct Subscription {
    registry: ListenerRegistry,
    channel: String,
    listener_id: u64,
    removed: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(registry: ListenerRegistry, channel: String, listener_id: u64) -> Self {
        Self {
            registry,
            channel,
            listener_id,
            removed: AtomicBool::new(false),
        }
    }

    /// Channel this subscription listens on.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Remove the listener from the registry.
    ///
    /// Safe to call multiple times; later calls are no-ops.
    pub fn unsubscribe(&self) {
        if self.removed.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut registry = self.registry.write();
        let Some(listeners) = registry.get_mut(&self.channel) else {
            return;
        };

        listeners.retain(|listener| listener.id != self.listener_id);
        if listeners.is_empty() {
            registry.remove(&self.channel);
        }

        debug!(
            channel = %self.channel,
            listener_id = self.listener_id,
            "Listener unsubscribed"
        );
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
