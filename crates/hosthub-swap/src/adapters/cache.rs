//! Cache invalidation adapters.

use crate::ports::CacheInvalidator;
use async_trait::async_trait;
use tracing::debug;

/// Invalidator for deployments with no page cache in front of the portal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheInvalidator;

#[async_trait]
impl CacheInvalidator for NoopCacheInvalidator {
    async fn invalidate(&self, view: &str) {
        debug!(view = %view, "Cache invalidation (no-op)");
    }
}
