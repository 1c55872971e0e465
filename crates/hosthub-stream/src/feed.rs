//! Server side of the live stream: bus events out over a streaming response.
//!
//! Each connection gets its own bounded frame queue. Bus listeners enqueue
//! and return; when a slow client lets the queue fill, further frames are
//! dropped rather than blocking the publisher. Push is a freshness hint,
//! the read API stays authoritative.

use crate::frame::StreamFrame;
use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures::Stream;
use hosthub_bus::{EventBus, Subscription};
use hosthub_types::{PAYMENTS_CHANNEL, SCHEDULE_CHANNEL};
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// Default keep-alive cadence.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(30);

/// Default per-connection frame queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Feed tuning knobs.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Bus channels forwarded to every connected client.
    pub channels: Vec<String>,
    /// Keep-alive frame interval.
    pub keepalive: Duration,
    /// Per-connection queue depth before frames are dropped.
    pub queue_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channels: vec![SCHEDULE_CHANNEL.to_string(), PAYMENTS_CHANNEL.to_string()],
            keepalive: DEFAULT_KEEPALIVE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Bridges the in-process bus onto per-connection NDJSON streams.
pub struct StreamFeed {
    bus: Arc<EventBus>,
    config: FeedConfig,
}

impl StreamFeed {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self::with_config(bus, FeedConfig::default())
    }

    pub fn with_config(bus: Arc<EventBus>, config: FeedConfig) -> Self {
        Self { bus, config }
    }

    /// Open one client connection's frame stream.
    ///
    /// The returned stream owns its bus subscriptions; dropping it (the
    /// client went away) unregisters them. The keep-alive task notices the
    /// closed queue on its next tick and exits.
    pub fn open(&self) -> FeedBody {
        let (tx, rx) = mpsc::channel::<StreamFrame>(self.config.queue_capacity);

        let mut subscriptions = Vec::with_capacity(self.config.channels.len());
        for channel in &self.config.channels {
            let tx = tx.clone();
            subscriptions.push(self.bus.subscribe(channel, move |event| {
                let frame = StreamFrame::new(event.channel.clone(), event.payload.clone());
                if tx.try_send(frame).is_err() {
                    // Queue full or client gone. Drop the frame.
                    debug!(channel = %event.channel, "Dropped stream frame");
                }
            }));
        }

        let keepalive = self.config.keepalive;
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + keepalive;
            let mut ticker = tokio::time::interval_at(start, keepalive);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tx.send(StreamFrame::keepalive()).await.is_err() {
                    break;
                }
            }
        });

        FeedBody {
            frames: ReceiverStream::new(rx),
            _subscriptions: subscriptions,
        }
    }

    /// The full HTTP response: status, NDJSON content type, streaming body.
    pub fn response(&self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "application/x-ndjson"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(self.open()),
        )
            .into_response()
    }
}

/// Streaming body yielding one encoded frame line at a time.
///
/// Holds the connection's bus subscriptions so they live exactly as long
/// as the client is attached.
pub struct FeedBody {
    frames: ReceiverStream<StreamFrame>,
    _subscriptions: Vec<Subscription>,
}

impl Stream for FeedBody {
    type Item = Result<String, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.frames).poll_next(cx) {
            Poll::Ready(Some(frame)) => Poll::Ready(Some(Ok(frame.encode()))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
