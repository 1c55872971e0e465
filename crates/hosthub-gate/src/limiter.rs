//! Fixed-window rate limiter.
//!
//! Counts requests per `clientId:routePath` key inside a fixed window.
//! When the window's `reset_at` passes, the next check rolls the entry
//! over to a fresh window regardless of the prior count, so entries are
//! overwritten in place rather than explicitly freed.
//!
//! Expired entries that never see another request are removed by an
//! opportunistic sweep: there is no dedicated timer task; instead each
//! check consults an atomic last-sweep stamp and at most one caller per
//! interval pays the sweep cost.

use crate::domain::config::RateLimitConfig;
use crate::domain::decision::RateLimitDecision;
use crate::ports::TimeSource;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One tracked window for a `clientId:routePath` key.
///
/// Owned exclusively by the limiter and mutated only by [`RateLimiter::check`].
/// Logically expired once `reset_at` has passed, even if not yet evicted.
#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    /// Requests seen in the current window
    count: u32,
    /// Epoch milliseconds when the window rolls over
    reset_at: u64,
}

/// Counter snapshot for the health surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RateLimiterStats {
    /// Keys currently tracked (including logically expired ones)
    pub tracked_keys: usize,
    /// Total checks performed
    pub checks: u64,
    /// Checks that were rejected
    pub rejections: u64,
    /// Sweep runs completed
    pub sweeps: u64,
}

/// Fixed-window rate limiter state shared across requests.
///
/// Per-key mutations go through the map's sharded entry locks; there is no
/// global lock over the table.
pub struct RateLimiter {
    /// `clientId:routePath` -> current window
    entries: DashMap<String, RateLimitEntry>,
    /// Clock
    time: Arc<dyn TimeSource>,
    /// Minimum milliseconds between sweeps
    sweep_interval_ms: u64,
    /// Epoch milliseconds of the last sweep; CAS-guarded so one caller
    /// per interval runs the sweep
    last_sweep_ms: AtomicU64,
    /// Total checks
    checks: AtomicU64,
    /// Rejected checks
    rejections: AtomicU64,
    /// Completed sweeps
    sweeps: AtomicU64,
}

impl RateLimiter {
    pub fn new(time: Arc<dyn TimeSource>, sweep_interval: Duration) -> Self {
        let now = time.now();
        Self {
            entries: DashMap::new(),
            time,
            sweep_interval_ms: sweep_interval.as_millis() as u64,
            last_sweep_ms: AtomicU64::new(now),
            checks: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
        }
    }

    /// Check whether a request fits inside the current window for its key.
    ///
    /// First request in a window creates the entry with `count = 1` and a
    /// fresh `reset_at`; later requests increment the count and are allowed
    /// while `count <= max_requests`. A check after `reset_at` rolls the
    /// window over and is allowed regardless of the prior count.
    pub fn check(
        &self,
        client_id: &str,
        route_path: &str,
        config: &RateLimitConfig,
    ) -> RateLimitDecision {
        let now = self.time.now();
        self.checks.fetch_add(1, Ordering::Relaxed);
        self.maybe_sweep(now);

        let window_ms = config.window.as_millis() as u64;
        let key = format!("{client_id}:{route_path}");

        let (count, reset_at) = {
            let mut entry = self.entries.entry(key).or_insert_with(|| {
                debug!(client_id = %client_id, route = %route_path, "Creating rate limit window");
                RateLimitEntry {
                    count: 0,
                    reset_at: now + window_ms,
                }
            });

            if now >= entry.reset_at {
                // Window rolled over: fresh count, fresh deadline.
                entry.count = 1;
                entry.reset_at = now + window_ms;
            } else {
                entry.count += 1;
            }
            (entry.count, entry.reset_at)
        };

        let allowed = count <= config.max_requests;
        if !allowed {
            self.rejections.fetch_add(1, Ordering::Relaxed);
        }

        RateLimitDecision {
            allowed,
            remaining: config.max_requests.saturating_sub(count),
            reset_at,
        }
    }

    /// Remove entries whose window has passed.
    ///
    /// Also callable directly (maintenance job trigger); the opportunistic
    /// path throttles itself through [`maybe_sweep`](Self::maybe_sweep).
    pub fn sweep(&self) {
        let now = self.time.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at > now);
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        // Concurrent inserts during retain can grow the map past `before`.
        debug!(
            removed = before.saturating_sub(self.entries.len()),
            remaining = self.entries.len(),
            "Swept expired rate limit windows"
        );
    }

    /// Run the sweep if at least one interval has elapsed since the last
    /// one. The CAS ensures a single winner per interval; losers skip.
    fn maybe_sweep(&self, now: u64) {
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        if now.saturating_sub(last) < self.sweep_interval_ms {
            return;
        }
        if self
            .last_sweep_ms
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        self.sweep();
    }

    /// Number of tracked keys.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            tracked_keys: self.entries.len(),
            checks: self.checks.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }
}
