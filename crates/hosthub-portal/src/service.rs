//! Portal service assembly.
//!
//! Wires the event bus, swap coordinator, admission gate and live feed into
//! one axum router and runs it. Construction validates configuration and
//! fails fast; `start` then binds and serves until `shutdown` (or ctrl-c)
//! drains the listener.

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use hosthub_bus::EventBus;
use hosthub_gate::{AdmissionGate, AdmissionLayer, SystemTimeSource as GateClock};
use hosthub_stream::{FeedConfig, StreamFeed};
use hosthub_swap::{
    MemoryScheduleStore, NoopCacheInvalidator, ScheduleStore, SwapCoordinator,
    SystemTimeSource as SwapClock,
};
use hosthub_types::{PAYMENTS_CHANNEL, SCHEDULE_CHANNEL};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{ConfigError, CorsConfig, PortalConfig};
use crate::handlers;

/// Portal service errors.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Configuration rejected before startup
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Bind or serve failure
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub bus: Arc<EventBus>,
    pub schedule: Arc<dyn ScheduleStore>,
    pub coordinator: Arc<SwapCoordinator>,
    pub gate: Arc<AdmissionGate>,
    pub feed: Arc<StreamFeed>,
    pub started_at: Instant,
}

/// The assembled portal service.
pub struct PortalService {
    config: PortalConfig,
    state: AppState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl PortalService {
    /// Build with a fresh in-memory schedule store.
    pub fn new(config: PortalConfig) -> Result<Self, PortalError> {
        Self::with_store(config, Arc::new(MemoryScheduleStore::new()))
    }

    /// Build around an existing schedule store.
    pub fn with_store(
        config: PortalConfig,
        store: Arc<dyn ScheduleStore>,
    ) -> Result<Self, PortalError> {
        config.validate()?;
        if config.uses_dev_secrets() {
            warn!("Shared secrets are still the shipped defaults; set real ones before exposing this portal");
        }

        let bus = Arc::new(EventBus::new());
        let coordinator = Arc::new(SwapCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&bus),
            Arc::new(NoopCacheInvalidator),
            Arc::new(SwapClock),
        ));
        let gate = Arc::new(AdmissionGate::new(config.gate.clone(), Arc::new(GateClock)));
        let feed = Arc::new(StreamFeed::with_config(
            Arc::clone(&bus),
            FeedConfig {
                channels: vec![SCHEDULE_CHANNEL.to_string(), PAYMENTS_CHANNEL.to_string()],
                keepalive: config.stream.keepalive,
                queue_capacity: config.stream.queue_capacity,
            },
        ));

        let state = AppState {
            config: Arc::new(config.clone()),
            bus,
            schedule: store,
            coordinator,
            gate,
            feed,
            started_at: Instant::now(),
        };

        Ok(Self {
            config,
            state,
            shutdown_tx: None,
        })
    }

    /// Handler state, exposed for tests and embedding.
    #[must_use]
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the HTTP router.
    ///
    /// Middleware runs outermost-first: request tracing, then CORS, then
    /// the admission gate. Rejections never reach a handler.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/api/swaps", post(handlers::swaps::create_swap))
            .route(
                "/api/swaps/pending-count",
                get(handlers::swaps::pending_count),
            )
            .route("/api/swaps/:id/respond", post(handlers::swaps::respond_swap))
            .route("/api/swaps/:id/cancel", post(handlers::swaps::cancel_swap))
            .route("/api/schedule", get(handlers::schedule::get_schedule))
            .route("/api/stream", get(handlers::stream::stream_feed))
            .route("/storage/*path", get(handlers::storage::get_asset))
            .route("/health", get(handlers::health::health));

        if self.config.webhook.enabled {
            router = router.route(
                "/api/webhooks/payments",
                post(handlers::webhooks::receive_payment),
            );
        }
        if self.config.jobs.enabled {
            router = router.route("/api/jobs/run", post(handlers::jobs::run_jobs));
        }

        router
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(create_cors_layer(&self.config.cors))
                    .layer(AdmissionLayer::new(Arc::clone(&self.state.gate))),
            )
            .with_state(self.state.clone())
    }

    /// Bind and serve until shutdown.
    pub async fn start(&mut self) -> Result<(), PortalError> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let listener = TcpListener::bind(&self.config.server.bind_addr).await?;
        info!(addr = %self.config.server.bind_addr, "Portal listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_requested(shutdown_rx))
            .await?;

        info!("Portal stopped");
        Ok(())
    }

    /// Trigger graceful shutdown.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn shutdown_requested(shutdown_rx: oneshot::Receiver<()>) {
    tokio::select! {
        _ = shutdown_rx => {
            info!("Received shutdown signal");
        }
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received ctrl-c"),
                Err(error) => warn!(%error, "Failed to listen for ctrl-c"),
            }
        }
    }
}

/// Build the CORS layer from config.
///
/// Same-origin deployments leave `allowed_origins` empty and this stays
/// fully restrictive; `tower-http` rejects credentials combined with a
/// wildcard origin, so credentials are only honored for an explicit list.
fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::new();
    }

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(handlers::USER_HEADER),
        ]);

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
        if config.allow_credentials {
            cors = cors.allow_credentials(true);
        }
    }

    cors
}
