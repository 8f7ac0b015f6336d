//! Key-value store with per-entry expiry.
//!
//! Used for short-lived server-side secrets such as OAuth `state` values.
//! The store is injected where it is needed; [`MemoryStore`] is the
//! in-process implementation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Insert or replace `key`, expiring after `ttl`.
    async fn put(&self, key: String, value: String, ttl: Duration);

    /// Remove `key` and return its value if it had not yet expired.
    async fn take(&self, key: &str) -> Option<String>;

    /// Drop every expired entry, returning how many were removed.
    async fn purge_expired(&self) -> usize;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory [`ExpiringStore`] guarded by a `tokio` `RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn put(&self, key: String, value: String, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    async fn take(&self, key: &str) -> Option<String> {
        let entry = self.entries.write().await.remove(key)?;
        entry.is_live(Instant::now()).then_some(entry.value)
    }

    async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }
}
