//! # Swap Lifecycle Flows
//!
//! Drives the shift-swap coordinator through the portal router the way the
//! front-end does: JSON over HTTP, proxy-injected identity headers, and the
//! admission gate live in the middleware stack.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    use hosthub_portal::{PortalConfig, PortalService};
    use hosthub_swap::MemoryScheduleStore;
    use hosthub_types::{EventKind, ShiftSlot, UserId};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn june(day: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    /// Portal with alice holding the 2024-06-05 morning security shift and
    /// bob registered as swap-eligible staff.
    fn portal() -> PortalService {
        let store = MemoryScheduleStore::new()
            .with_user("bob")
            .with_assignment(ShiftSlot::new(EventKind::SecurityAm, june(5)), "alice");

        let mut config = PortalConfig::default();
        config.webhook.secret = "it-webhook-secret".to_string();
        config.jobs.secret = "it-job-key".to_string();
        PortalService::with_store(config, Arc::new(store)).expect("portal")
    }

    fn post(path: &str, user: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header("host", "portal.example")
            .header("origin", "https://portal.example")
            .header("x-real-ip", "203.0.113.7")
            .header("x-hosthub-user", user)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(path: &str, user: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(path)
            .header("host", "portal.example")
            .header("x-real-ip", "203.0.113.7")
            .header("x-hosthub-user", user)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_of(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Create alice's standard request to bob and return the response body.
    async fn create_swap(app: &Router, requester: &str, recipient: &str) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(post(
                "/api/swaps",
                requester,
                serde_json::json!({
                    "eventType": "security-am",
                    "eventDate": "2024-06-05",
                    "recipientId": recipient,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        json_of(response).await
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_deny_then_replayed_accept_is_refused() {
        let service = portal();
        let app = service.router();

        let created = create_swap(&app, "alice", "bob").await;
        assert_eq!(created["success"], true);
        assert_eq!(created["request"]["status"], "pending");
        let id = created["request"]["id"].as_str().unwrap().to_string();

        // Bob has exactly one request waiting.
        let count = json_of(
            app.clone()
                .oneshot(get("/api/swaps/pending-count", "bob"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(count["count"], 1);

        // Bob denies.
        let denied = json_of(
            app.clone()
                .oneshot(post(
                    &format!("/api/swaps/{id}/respond"),
                    "bob",
                    serde_json::json!({ "action": "deny" }),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(denied["success"], true);
        assert_eq!(denied["request"]["status"], "denied");

        // A replayed accept cannot resurrect the resolved request.
        let replay_response = app
            .clone()
            .oneshot(post(
                &format!("/api/swaps/{id}/respond"),
                "bob",
                serde_json::json!({ "action": "accept" }),
            ))
            .await
            .unwrap();
        assert_eq!(replay_response.status(), StatusCode::OK);
        let replay = json_of(replay_response).await;
        assert_eq!(replay["success"], false);
        assert_eq!(replay["message"], "Swap request is not pending");

        // The slot never moved.
        let holder = service
            .state()
            .schedule
            .slot_holder(&ShiftSlot::new(EventKind::SecurityAm, june(5)))
            .await
            .unwrap();
        assert_eq!(holder, Some(UserId::from("alice")));
    }

    #[tokio::test]
    async fn test_accept_transfers_the_slot_in_the_snapshot() {
        let service = portal();
        let app = service.router();

        let created = create_swap(&app, "alice", "bob").await;
        let id = created["request"]["id"].as_str().unwrap().to_string();

        let accepted = json_of(
            app.clone()
                .oneshot(post(
                    &format!("/api/swaps/{id}/respond"),
                    "bob",
                    serde_json::json!({ "action": "accept" }),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(accepted["success"], true);
        assert_eq!(accepted["request"]["status"], "accepted");
        assert!(accepted["request"]["resolvedAt"].is_string());

        let snapshot = json_of(
            app.clone()
                .oneshot(get("/api/schedule", "bob"))
                .await
                .unwrap(),
        )
        .await;
        let assignments = snapshot["assignments"].as_array().unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0]["eventType"], "security-am");
        assert_eq!(assignments[0]["userId"], "bob");
    }

    #[tokio::test]
    async fn test_cancel_releases_the_duplicate_guard() {
        let service = portal();
        let app = service.router();

        let first = create_swap(&app, "alice", "bob").await;
        assert_eq!(first["success"], true);
        let id = first["request"]["id"].as_str().unwrap().to_string();

        // Same slot, same requester: refused while the first is open.
        let duplicate = create_swap(&app, "alice", "bob").await;
        assert_eq!(duplicate["success"], false);
        assert_eq!(
            duplicate["message"],
            "A pending swap request for this shift already exists"
        );

        // Cancelling clears the guard.
        let cancelled = json_of(
            app.clone()
                .oneshot(post(
                    &format!("/api/swaps/{id}/cancel"),
                    "alice",
                    serde_json::json!({}),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(cancelled["success"], true);
        assert_eq!(cancelled["request"]["status"], "cancelled");

        let retry = create_swap(&app, "alice", "bob").await;
        assert_eq!(retry["success"], true);
    }

    #[tokio::test]
    async fn test_requester_cannot_answer_their_own_request() {
        let service = portal();
        let app = service.router();

        let created = create_swap(&app, "alice", "bob").await;
        let id = created["request"]["id"].as_str().unwrap().to_string();

        let answered = json_of(
            app.clone()
                .oneshot(post(
                    &format!("/api/swaps/{id}/respond"),
                    "alice",
                    serde_json::json!({ "action": "accept" }),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(answered["success"], false);
        assert_eq!(
            answered["message"],
            "Only the recipient can respond to this swap request"
        );
    }

    #[tokio::test]
    async fn test_swap_for_unheld_slot_is_refused_with_slot_name() {
        let service = portal();
        let app = service.router();

        // Bob holds nothing on that date.
        let refused = create_swap(&app, "bob", "alice").await;
        assert_eq!(refused["success"], false);
        assert_eq!(
            refused["message"],
            "You are not assigned to security-am on 2024-06-05"
        );
    }

    #[tokio::test]
    async fn test_unknown_request_id_yields_not_found_envelope() {
        let service = portal();
        let app = service.router();

        let missing = uuid::Uuid::new_v4();
        let response = json_of(
            app.clone()
                .oneshot(post(
                    &format!("/api/swaps/{missing}/cancel"),
                    "alice",
                    serde_json::json!({}),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(response["success"], false);
        assert_eq!(response["message"], "Swap request not found");
    }
}
