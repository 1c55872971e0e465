//! # Event Bus
//!
//! The publishing side of the bus and the listener registry.

use crate::subscription::Subscription;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A single event delivered to listeners.
#[derive(Debug, Clone, Serialize)]
pub struct BusEvent {
    /// Channel the event was published on.
    pub channel: String,
    /// Optional JSON payload supplied by the publisher.
    pub payload: Option<serde_json::Value>,
}

/// Listener callback signature.
///
/// Invoked on the publishing task; must enqueue and return rather than
/// block.
pub type Listener = dyn Fn(&BusEvent) + Send + Sync;

/// One registered listener on a channel.
#[derive(Clone)]
pub(crate) struct RegisteredListener {
    pub(crate) id: u64,
    pub(crate) callback: Arc<Listener>,
}

/// Channel name -> listeners, in subscription order.
pub(crate) type ListenerRegistry = Arc<RwLock<HashMap<String, Vec<RegisteredListener>>>>;

/// In-process event bus.
///
/// A process-wide singleton constructed explicitly and injected into the
/// subsystems that need it, so tests can instantiate isolated instances.
/// Lifetime is tied to the process; nothing here persists across restarts.
pub struct EventBus {
    /// Channel -> ordered listener list.
    listeners: ListenerRegistry,

    /// Monotonic listener id source.
    next_listener_id: AtomicU64,

    /// Total events published (one per channel per publish call).
    events_published: AtomicU64,
}

impl EventBus {
    /// Create a new, empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(HashMap::new())),
            next_listener_id: AtomicU64::new(1),
            events_published: AtomicU64::new(0),
        }
    }

    /// Register a listener on a channel.
    ///
    /// The channel is created implicitly if this is its first listener.
    /// Returns a [`Subscription`] handle; dropping it (or calling
    /// [`Subscription::unsubscribe`]) removes the listener.
    #[must_use]
    pub fn subscribe<F>(&self, channel: &str, listener: F) -> Subscription
    where
        F: Fn(&BusEvent) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let registered = RegisteredListener {
            id,
            callback: Arc::new(listener),
        };

        self.listeners
            .write()
            .entry(channel.to_owned())
            .or_default()
            .push(registered);

        debug!(channel = %channel, listener_id = id, "Listener subscribed");

        Subscription::new(self.listeners.clone(), channel.to_owned(), id)
    }

    /// Publish an event on a single channel.
    ///
    /// Every listener registered on the channel is invoked synchronously,
    /// in subscription order, before this call returns. A channel with no
    /// listeners is a no-op.
    ///
    /// # Returns
    ///
    /// The number of listeners notified.
    pub fn publish(&self, channel: &str, payload: Option<serde_json::Value>) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        // Copy the listener list out under the read lock, then release it
        // before invoking callbacks, so a listener can mutate the registry
        // mid-delivery without deadlocking.
        let snapshot: Vec<RegisteredListener> = {
            let registry = self.listeners.read();
            match registry.get(channel) {
                Some(list) => list.clone(),
                None => {
                    debug!(channel = %channel, "Event published with no listeners");
                    return 0;
                }
            }
        };

        let event = BusEvent {
            channel: channel.to_owned(),
            payload,
        };

        for listener in &snapshot {
            (listener.callback)(&event);
        }

        debug!(
            channel = %channel,
            listeners = snapshot.len(),
            "Event published"
        );
        snapshot.len()
    }

    /// Publish the same payload on several channels.
    ///
    /// Equivalent to calling [`publish`](Self::publish) once per channel,
    /// in order.
    ///
    /// # Returns
    ///
    /// The total number of listener invocations across all channels.
    pub fn publish_many(&self, channels: &[&str], payload: Option<serde_json::Value>) -> usize {
        channels
            .iter()
            .map(|channel| self.publish(channel, payload.clone()))
            .sum()
    }

    /// Number of listeners currently registered on a channel.
    #[must_use]
    pub fn listener_count(&self, channel: &str) -> usize {
        self.listeners
            .read()
            .get(channel)
            .map_or(0, std::vec::Vec::len)
    }

    /// Number of channels with at least one listener.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Total events published since construction.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
