//! # Admission Decisions Through the Router
//!
//! The gate crate unit-tests its pipeline in isolation; these flows prove
//! the same decisions hold once the gate sits in the portal's middleware
//! stack, with real routes behind it and exempt surfaces mounted.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use tower::ServiceExt;

    use hosthub_gate::RateLimitConfig;
    use hosthub_portal::{PortalConfig, PortalService};
    use hosthub_swap::MemoryScheduleStore;
    use hosthub_types::{EventKind, ShiftSlot};

    const WEBHOOK_SECRET: &str = "it-webhook-secret";
    const JOB_KEY: &str = "it-job-key";

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn base_config() -> PortalConfig {
        let mut config = PortalConfig::default();
        config.webhook.secret = WEBHOOK_SECRET.to_string();
        config.jobs.secret = JOB_KEY.to_string();
        config
    }

    fn portal_with(config: PortalConfig) -> PortalService {
        let store = MemoryScheduleStore::new().with_user("bob").with_assignment(
            ShiftSlot::new(
                EventKind::SecurityAm,
                chrono::NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            ),
            "alice",
        );
        PortalService::with_store(config, Arc::new(store)).expect("portal")
    }

    fn get_schedule(client_ip: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("GET")
            .uri("/api/schedule")
            .header("host", "portal.example");
        if let Some(ip) = client_ip {
            builder = builder.header("x-real-ip", ip);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn swap_post(origin: Option<&str>, referer: Option<&str>, ip: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/swaps")
            .header("host", "portal.example")
            .header("x-real-ip", ip)
            .header("x-hosthub-user", "alice")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(origin) = origin {
            builder = builder.header("origin", origin);
        }
        if let Some(referer) = referer {
            builder = builder.header("referer", referer);
        }
        builder
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

    fn sign(body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    async fn status_of(app: &Router, request: Request<Body>) -> StatusCode {
        app.clone().oneshot(request).await.unwrap().status()
    }

    // =========================================================================
    // RATE LIMITING
    // =========================================================================

    #[tokio::test]
    async fn test_burst_over_ceiling_gets_429_and_other_clients_do_not() {
        let mut config = base_config();
        config.gate.default_limit = RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 3,
        };
        let app = portal_with(config).router();

        for _ in 0..3 {
            assert_eq!(
                status_of(&app, get_schedule(Some("198.51.100.1"))).await,
                StatusCode::OK
            );
        }

        let response = app
            .clone()
            .oneshot(get_schedule(Some("198.51.100.1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("Retry-After"));
        assert_eq!(response.headers().get("X-RateLimit-Remaining").unwrap(), "0");

        // A different client keys a different window.
        assert_eq!(
            status_of(&app, get_schedule(Some("198.51.100.2"))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_strict_profile_caps_swap_mutations_independently() {
        let mut config = base_config();
        config.gate.strict_limit = RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 2,
        };
        let app = portal_with(config).router();

        let origin = Some("https://portal.example");
        for _ in 0..2 {
            assert_eq!(
                status_of(&app, swap_post(origin, None, "198.51.100.9")).await,
                StatusCode::OK
            );
        }
        assert_eq!(
            status_of(&app, swap_post(origin, None, "198.51.100.9")).await,
            StatusCode::TOO_MANY_REQUESTS
        );

        // Reads ride the default profile and are keyed per route, so the
        // same client can still load the schedule.
        assert_eq!(
            status_of(&app, get_schedule(Some("198.51.100.9"))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_clients_without_an_ip_share_the_fallback_bucket() {
        let mut config = base_config();
        config.gate.default_limit = RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 2,
        };
        let app = portal_with(config).router();

        // Two anonymous requests drain the shared window; the third is
        // rejected even though it could be a different caller.
        assert_eq!(status_of(&app, get_schedule(None)).await, StatusCode::OK);
        assert_eq!(status_of(&app, get_schedule(None)).await, StatusCode::OK);
        assert_eq!(
            status_of(&app, get_schedule(None)).await,
            StatusCode::TOO_MANY_REQUESTS
        );

        // An identified client is unaffected.
        assert_eq!(
            status_of(&app, get_schedule(Some("198.51.100.3"))).await,
            StatusCode::OK
        );
    }

    // =========================================================================
    // ORIGIN VALIDATION
    // =========================================================================

    #[tokio::test]
    async fn test_cross_origin_mutation_blocked_but_safe_read_allowed() {
        let app = portal_with(base_config()).router();

        let blocked = status_of(
            &app,
            swap_post(Some("https://evil.example"), None, "198.51.100.4"),
        )
        .await;
        assert_eq!(blocked, StatusCode::FORBIDDEN);

        // Same foreign origin on a GET sails through; safe methods are
        // never origin-checked.
        let mut read = get_schedule(Some("198.51.100.4"));
        read.headers_mut()
            .insert("origin", "https://evil.example".parse().unwrap());
        assert_eq!(status_of(&app, read).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_referer_fallback_when_origin_is_absent() {
        let app = portal_with(base_config()).router();

        let same_host = swap_post(
            None,
            Some("https://portal.example/schedule/week"),
            "198.51.100.5",
        );
        assert_eq!(status_of(&app, same_host).await, StatusCode::OK);

        let foreign = swap_post(None, Some("https://evil.example/x"), "198.51.100.6");
        assert_eq!(status_of(&app, foreign).await, StatusCode::FORBIDDEN);
    }

    // =========================================================================
    // EXEMPT SURFACES
    // =========================================================================

    #[tokio::test]
    async fn test_webhook_bypasses_gate_and_trusts_its_signature() {
        let app = portal_with(base_config()).router();
        let payload = br#"{"event":"payment.settled","amount":125}"#;

        // Foreign origin, no rate headers: still reaches the handler, which
        // rejects on signature alone.
        let unsigned = Request::builder()
            .method("POST")
            .uri("/api/webhooks/payments")
            .header("host", "portal.example")
            .header("origin", "https://payments.example")
            .body(Body::from(&payload[..]))
            .unwrap();
        assert_eq!(status_of(&app, unsigned).await, StatusCode::UNAUTHORIZED);

        let signed = Request::builder()
            .method("POST")
            .uri("/api/webhooks/payments")
            .header("host", "portal.example")
            .header("origin", "https://payments.example")
            .header("x-hosthub-signature", sign(payload))
            .body(Body::from(&payload[..]))
            .unwrap();
        assert_eq!(status_of(&app, signed).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_job_trigger_bypasses_gate_and_checks_its_key() {
        let app = portal_with(base_config()).router();

        let wrong = Request::builder()
            .method("POST")
            .uri("/api/jobs/run")
            .header("host", "portal.example")
            .header("x-hosthub-job-key", "guess")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(&app, wrong).await, StatusCode::UNAUTHORIZED);

        let right = Request::builder()
            .method("POST")
            .uri("/api/jobs/run")
            .header("host", "portal.example")
            .header("x-hosthub-job-key", JOB_KEY)
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(&app, right).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejections_are_structured_json() {
        let mut config = base_config();
        config.gate.default_limit = RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 1,
        };
        let app = portal_with(config).router();

        let _ = status_of(&app, get_schedule(Some("198.51.100.8"))).await;
        let response = app
            .clone()
            .oneshot(get_schedule(Some("198.51.100.8")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Too many requests");
    }
}
