//! Process-local image cache used when object storage is unavailable.
//!
//! Entries expire once they have not been read for the configured TTL, and
//! the cache never holds more than `max_entries` images; inserting into a
//! full cache evicts the least recently accessed entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::ImageCacheSettings;

/// Cache key for an image path, e.g. `/uploads/images/<uuid>.png`.
pub fn cache_key(path: &str) -> String {
    format!("/uploads/{}", path.trim_start_matches('/'))
}

/// A cached image.
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub data: Vec<u8>,
    pub mime: String,
    pub created_at: DateTime<Utc>,
    last_accessed: Instant,
}

/// Shared image cache with TTL and capacity bounds.
#[derive(Clone)]
pub struct ImageCache {
    entries: Arc<RwLock<HashMap<String, CachedImage>>>,
    ttl: Duration,
    max_entries: usize,
}

impl ImageCache {
    pub fn new(settings: &ImageCacheSettings) -> Self {
        Self::with_limits(Duration::from_secs(settings.ttl_secs), settings.max_entries)
    }

    pub fn with_limits(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Insert or replace an image.
    pub async fn insert(&self, key: String, data: Vec<u8>, mime: String) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        self.purge_expired_internal(&mut entries, now);

        if !entries.contains_key(&key) {
            while entries.len() >= self.max_entries {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, image)| image.last_accessed)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                debug!("Evicting least recently used image {}", oldest);
                entries.remove(&oldest);
            }
        }

        debug!("Cached image {} ({} bytes)", key, data.len());
        entries.insert(
            key,
            CachedImage {
                data,
                mime,
                created_at: Utc::now(),
                last_accessed: now,
            },
        );
    }

    /// Read an image and mark it as accessed. Expired entries are dropped.
    pub async fn get(&self, key: &str) -> Option<CachedImage> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        let expired = match entries.get(key) {
            Some(image) => now.duration_since(image.last_accessed) >= self.ttl,
            None => return None,
        };

        if expired {
            debug!("Image {} expired", key);
            entries.remove(key);
            return None;
        }

        let image = entries.get_mut(key)?;
        image.last_accessed = now;
        Some(image.clone())
    }

    /// Remove an image. Returns true when an entry was present.
    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drop every expired entry and return how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        self.purge_expired_internal(&mut entries, Instant::now())
    }

    fn purge_expired_internal(&self, entries: &mut HashMap<String, CachedImage>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, image| now.duration_since(image.last_accessed) < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
