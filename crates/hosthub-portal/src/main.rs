//! HostHub portal binary.
//!
//! Loads configuration (file via `HOSTHUB_CONFIG`, then environment
//! overrides), seeds the in-memory schedule and serves until ctrl-c.

use anyhow::{Context, Result};
use hosthub_portal::{PortalConfig, PortalService};
use hosthub_swap::MemoryScheduleStore;
use hosthub_types::{EventKind, ShiftSlot};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Load configuration from file and environment.
fn load_config() -> Result<PortalConfig> {
    let mut config = match std::env::var("HOSTHUB_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading configuration file");
            PortalConfig::from_file(&path)?
        }
        Err(_) => {
            warn!("HOSTHUB_CONFIG not set, using default configuration");
            PortalConfig::default()
        }
    };

    if let Ok(addr) = std::env::var("HOSTHUB_BIND_ADDR") {
        config.server.bind_addr = addr;
    }
    if let Ok(secret) = std::env::var("HOSTHUB_WEBHOOK_SECRET") {
        config.webhook.secret = secret;
    }
    if let Ok(secret) = std::env::var("HOSTHUB_JOB_KEY") {
        config.jobs.secret = secret;
    }

    Ok(config)
}

/// Seed a staffed fortnight so a fresh deployment has slots to trade.
///
/// A database-backed store replaces this in production; the rotation here
/// only has to look plausible for demos and local development.
fn seed_schedule() -> MemoryScheduleStore {
    let roster = ["alice", "bob", "carol", "dave"];
    let mut store = MemoryScheduleStore::new();
    for user in roster {
        store = store.with_user(user);
    }

    let today = chrono::Utc::now().date_naive();
    let mut holder = 0usize;
    for day in 0..14i64 {
        let date = today + chrono::Duration::days(day);
        for kind in EventKind::ALL {
            store = store.with_assignment(ShiftSlot::new(kind, date), roster[holder % roster.len()]);
            holder += 1;
        }
    }

    info!(
        staff = roster.len(),
        days = 14,
        "Seeded in-memory schedule"
    );
    store
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting HostHub portal...");

    let config = load_config().context("Failed to load configuration")?;
    let store = Arc::new(seed_schedule());

    let mut service =
        PortalService::with_store(config, store).context("Failed to build portal service")?;
    service.start().await.context("Portal server error")?;

    Ok(())
}
