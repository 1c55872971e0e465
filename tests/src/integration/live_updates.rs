//! # Live Update Delivery
//!
//! End-to-end proof that committed mutations become frames on open NDJSON
//! streams, and that the client-side bridge republishes those frames onto
//! its local bus for UI listeners.

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use futures::{Stream, StreamExt};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tower::ServiceExt;

    use hosthub_portal::{AppState, PortalConfig, PortalService};
    use hosthub_stream::{BridgeState, ConnectError, StreamBridge, StreamConnector};
    use hosthub_swap::MemoryScheduleStore;
    use hosthub_types::{
        EventKind, ShiftSlot, KEEPALIVE_CHANNEL, PAYMENTS_CHANNEL, SCHEDULE_CHANNEL,
    };

    const WEBHOOK_SECRET: &str = "it-webhook-secret";

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn portal() -> PortalService {
        let store = MemoryScheduleStore::new().with_user("bob").with_assignment(
            ShiftSlot::new(
                EventKind::SecurityAm,
                chrono::NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            ),
            "alice",
        );

        let mut config = PortalConfig::default();
        config.webhook.secret = WEBHOOK_SECRET.to_string();
        config.jobs.secret = "it-job-key".to_string();
        PortalService::with_store(config, Arc::new(store)).expect("portal")
    }

    fn create_request(requester: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/swaps")
            .header("host", "portal.example")
            .header("origin", "https://portal.example")
            .header("x-real-ip", "203.0.113.20")
            .header("x-hosthub-user", requester)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({
                    "eventType": "security-am",
                    "eventDate": "2024-06-05",
                    "recipientId": "bob",
                })
                .to_string(),
            ))
            .unwrap()
    }

    fn respond_request(id: &str, action: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/swaps/{id}/respond"))
            .header("host", "portal.example")
            .header("origin", "https://portal.example")
            .header("x-real-ip", "203.0.113.20")
            .header("x-hosthub-user", "bob")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "action": action }).to_string(),
            ))
            .unwrap()
    }

    async fn json_of(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Next non-keepalive frame from an open feed body.
    async fn next_data_frame<S>(body: &mut S) -> serde_json::Value
    where
        S: Stream<Item = Result<String, Infallible>> + Unpin,
    {
        loop {
            let line = timeout(Duration::from_secs(2), body.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("frame");
            let frame: serde_json::Value = serde_json::from_str(&line).unwrap();
            if frame["channel"] != KEEPALIVE_CHANNEL {
                return frame;
            }
        }
    }

    // =========================================================================
    // SERVER SIDE: MUTATIONS BECOME FRAMES
    // =========================================================================

    #[tokio::test]
    async fn test_swap_creation_reaches_an_open_stream() {
        let service = portal();
        let app = service.router();
        let mut body = service.state().feed.open();

        let response = app.oneshot(create_request("alice")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let frame = next_data_frame(&mut body).await;
        assert_eq!(frame["channel"], SCHEDULE_CHANNEL);
        assert_eq!(frame["payload"]["action"], "created");
        assert_eq!(frame["payload"]["request"]["status"], "pending");
        assert_eq!(frame["payload"]["request"]["requesterId"], "alice");
    }

    #[tokio::test]
    async fn test_every_lifecycle_step_is_broadcast_in_order() {
        let service = portal();
        let app = service.router();
        let mut body = service.state().feed.open();

        let created = json_of(app.clone().oneshot(create_request("alice")).await.unwrap()).await;
        let id = created["request"]["id"].as_str().unwrap().to_string();

        let response = app.oneshot(respond_request(&id, "accept")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let first = next_data_frame(&mut body).await;
        assert_eq!(first["payload"]["action"], "created");

        let second = next_data_frame(&mut body).await;
        assert_eq!(second["payload"]["action"], "accept");
        assert_eq!(second["payload"]["request"]["status"], "accepted");
    }

    #[tokio::test]
    async fn test_signed_webhook_reaches_the_payments_channel() {
        let service = portal();
        let app = service.router();
        let mut body = service.state().feed.open();

        let payload = br#"{"event":"payment.settled","amount":125}"#;
        let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
        mac.update(payload);
        let signature = hex::encode(mac.finalize().into_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/api/webhooks/payments")
            .header("host", "portal.example")
            .header("x-hosthub-signature", signature)
            .body(Body::from(&payload[..]))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let frame = next_data_frame(&mut body).await;
        assert_eq!(frame["channel"], PAYMENTS_CHANNEL);
        assert_eq!(frame["payload"]["amount"], 125);
    }

    #[tokio::test]
    async fn test_http_stream_endpoint_serves_ndjson_frames() {
        let service = portal();
        let app = service.router();
        let state = service.state();

        let request = Request::builder()
            .method("GET")
            .uri("/api/stream")
            .header("host", "portal.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/x-ndjson"
        );

        let mut chunks = response.into_body().into_data_stream();
        state.bus.publish(
            SCHEDULE_CHANNEL,
            Some(serde_json::json!({ "action": "probe" })),
        );

        let chunk = timeout(Duration::from_secs(2), chunks.next())
            .await
            .expect("timed out waiting for chunk")
            .expect("body ended")
            .expect("chunk");
        let frame: serde_json::Value = serde_json::from_slice(&chunk).unwrap();
        assert_eq!(frame["channel"], SCHEDULE_CHANNEL);
        assert_eq!(frame["payload"]["action"], "probe");
    }

    // =========================================================================
    // CLIENT SIDE: BRIDGE MIRRORS THE FEED
    // =========================================================================

    /// Connector that opens a fresh server-side feed per connection, the
    /// in-process equivalent of dialing `GET /api/stream`.
    struct FeedConnector {
        state: AppState,
    }

    #[async_trait]
    impl StreamConnector for FeedConnector {
        async fn connect(&self) -> Result<mpsc::Receiver<String>, ConnectError> {
            let (tx, rx) = mpsc::channel(32);
            let mut body = self.state.feed.open();
            tokio::spawn(async move {
                while let Some(Ok(line)) = body.next().await {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
            });
            Ok(rx)
        }
    }

    #[tokio::test]
    async fn test_bridge_republishes_portal_frames_to_local_listeners() {
        let service = portal();
        let app = service.router();

        let bridge = StreamBridge::with_reconnect_delay(
            Arc::new(FeedConnector {
                state: service.state(),
            }),
            Duration::from_millis(20),
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = bridge.subscribe(SCHEDULE_CHANNEL, move |event| {
            let _ = tx.send(event.payload.clone());
        });

        // Wait for the lazy connection before mutating, otherwise the
        // broadcast can land before the feed listener exists.
        let mut watch = bridge.watch_state();
        timeout(
            Duration::from_secs(2),
            watch.wait_for(|state| *state == BridgeState::Connected),
        )
        .await
        .expect("timed out waiting for connect")
        .expect("state watch closed");

        let response = app.oneshot(create_request("alice")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let payload = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for mirrored event")
            .expect("listener dropped")
            .expect("payload");
        assert_eq!(payload["action"], "created");
        assert_eq!(payload["request"]["recipientId"], "bob");

        bridge.shutdown();
    }
}
