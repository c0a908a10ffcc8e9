//! Background purge of expired fallback images.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use super::image_cache::ImageCache;

/// Start the image cache purge task.
///
/// This spawns a tokio task that periodically drops cached images whose
/// TTL has elapsed, so memory is reclaimed even for images nobody reads.
pub fn start_cleanup_task(cache: ImageCache, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting image cache cleanup (interval: {} seconds)",
            interval_secs
        );

        let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));

        loop {
            ticker.tick().await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!("Image cache cleanup: {} expired images removed", removed);
            } else {
                debug!("Image cache cleanup: nothing to remove");
            }
        }
    })
}
