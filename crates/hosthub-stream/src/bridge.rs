//! Client side of the live stream: one shared, self-healing connection.
//!
//! A context (one portal tab, one TUI session) creates a single
//! `StreamBridge` and hangs any number of channel listeners off it. The
//! first subscription establishes the connection; losing the transport
//! triggers an indefinite fixed-delay reconnect loop; only `shutdown()`
//! ends it.

use crate::frame::StreamFrame;
use async_trait::async_trait;
use hosthub_bus::{BusEvent, EventBus, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Delay between reconnection attempts. Fixed, not exponential: the feed
/// is same-deployment and a thundering herd of one is not a concern.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Connection lifecycle, observable via [`StreamBridge::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// No transport. Initial state, and the resting state between
    /// reconnect attempts and after shutdown.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Frames are flowing.
    Connected,
}

/// A connection attempt failed before producing a line stream.
#[derive(Debug, thiserror::Error)]
#[error("stream connect failed: {0}")]
pub struct ConnectError(pub String);

/// Transport port. One call is one connection attempt; the returned
/// receiver yields raw NDJSON lines until the transport ends (channel
/// closed). The production adapter reads the portal's feed endpoint;
/// tests script connections directly.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self) -> Result<mpsc::Receiver<String>, ConnectError>;
}

enum StreamEnd {
    Ended,
    Shutdown,
}

/// The shared per-context stream client.
pub struct StreamBridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    connector: Arc<dyn StreamConnector>,
    /// Fan-out registry: decoded frames are republished here, keyed by
    /// their originating channel.
    bus: EventBus,
    reconnect_delay: Duration,
    state_tx: watch::Sender<BridgeState>,
    /// Taken by the first subscriber to start the connection loop, or by
    /// `shutdown()` to make sure it never starts.
    run_slot: Mutex<Option<mpsc::Receiver<()>>>,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
}

impl StreamBridge {
    pub fn new(connector: Arc<dyn StreamConnector>) -> Self {
        Self::with_reconnect_delay(connector, DEFAULT_RECONNECT_DELAY)
    }

    pub fn with_reconnect_delay(connector: Arc<dyn StreamConnector>, delay: Duration) -> Self {
        let (state_tx, _) = watch::channel(BridgeState::Disconnected);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        Self {
            inner: Arc::new(BridgeInner {
                connector,
                bus: EventBus::new(),
                reconnect_delay: delay,
                state_tx,
                run_slot: Mutex::new(Some(shutdown_rx)),
                shutdown_tx: Mutex::new(Some(shutdown_tx)),
            }),
        }
    }

    /// Register a listener for one channel's frames.
    ///
    /// The first subscription on a fresh bridge starts the connection
    /// loop. Dropping or unsubscribing the returned guard removes only the
    /// listener; the connection stays up for everyone else.
    pub fn subscribe<F>(&self, channel: &str, listener: F) -> Subscription
    where
        F: Fn(&BusEvent) + Send + Sync + 'static,
    {
        let subscription = self.inner.bus.subscribe(channel, listener);
        self.ensure_started();
        subscription
    }

    /// Current connection state.
    pub fn state(&self) -> BridgeState {
        *self.inner.state_tx.borrow()
    }

    /// Watch state transitions (used by status indicators and tests).
    pub fn watch_state(&self) -> watch::Receiver<BridgeState> {
        self.inner.state_tx.subscribe()
    }

    /// Listeners currently registered for a channel.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.inner.bus.listener_count(channel)
    }

    /// Stop the connection loop and drop the transport. Idempotent; a
    /// bridge that never connected shuts down cleanly too. Listeners stay
    /// registered but no further frames arrive.
    pub fn shutdown(&self) {
        // Claim the run slot so a later subscribe cannot start the loop.
        self.inner.run_slot.lock().take();
        if let Some(tx) = self.inner.shutdown_tx.lock().take() {
            let _ = tx.try_send(());
        }
    }

    fn ensure_started(&self) {
        let Some(shutdown_rx) = self.inner.run_slot.lock().take() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.run(shutdown_rx));
    }
}

impl BridgeInner {
    async fn run(self: Arc<Self>, mut shutdown_rx: mpsc::Receiver<()>) {
        loop {
            self.set_state(BridgeState::Connecting);
            let connected = tokio::select! {
                result = self.connector.connect() => result,
                _ = shutdown_rx.recv() => break,
            };

            match connected {
                Ok(lines) => {
                    self.set_state(BridgeState::Connected);
                    info!("Event stream connected");
                    if let StreamEnd::Shutdown = self.pump(lines, &mut shutdown_rx).await {
                        break;
                    }
                    debug!("Event stream ended");
                }
                Err(error) => {
                    debug!(%error, "Event stream connect failed");
                }
            }

            self.set_state(BridgeState::Disconnected);
            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                _ = shutdown_rx.recv() => break,
            }
        }
        self.set_state(BridgeState::Disconnected);
    }

    /// Forward lines until the transport ends or shutdown is requested.
    async fn pump(
        &self,
        mut lines: mpsc::Receiver<String>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> StreamEnd {
        loop {
            tokio::select! {
                line = lines.recv() => match line {
                    Some(line) => self.dispatch(&line),
                    None => return StreamEnd::Ended,
                },
                _ = shutdown_rx.recv() => return StreamEnd::Shutdown,
            }
        }
    }

    fn dispatch(&self, line: &str) {
        let Some(frame) = StreamFrame::decode(line) else {
            debug!("Dropped undecodable stream line");
            return;
        };
        self.bus.publish(&frame.channel, frame.payload);
    }

    fn set_state(&self, state: BridgeState) {
        self.state_tx.send_replace(state);
    }
}
