//! Periodic removal of expired OAuth `state` values.
//!
//! Unredeemed login attempts would otherwise stay in the store until the
//! process restarts.

use std::sync::Arc;
use std::time::Duration;

use contacthub_core::store::ExpiringStore;
use tokio_util::sync::CancellationToken;

/// How often expired entries are purged.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Run the purge loop until `cancel` is triggered.
pub async fn run(store: Arc<dyn ExpiringStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "OAuth state purge started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("OAuth state purge stopping");
                break;
            }
            _ = ticker.tick() => {
                let purged = store.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired OAuth states");
                }
            }
        }
    }
}
