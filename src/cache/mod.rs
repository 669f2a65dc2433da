//! In-memory cache with time-based expiry
//!
//! Loaded documents, collections and settings are kept here for the life of
//! a session. An entry older than the TTL is treated as missing, and the read
//! that notices this removes it. The cache is an ordinary value: build one per
//! session and share it by reference.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Default time-to-live (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache key of the global settings document
pub const SETTINGS_KEY: &str = "settings:global";

/// Cache key of a single document
pub fn content_key(collection: &str, slug: &str) -> String {
    format!("{}:{}", collection, slug)
}

/// Cache key of a whole collection listing
pub fn collection_key(collection: &str) -> String {
    format!("collection:{}", collection)
}

/// A cached value and when it was stored
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    timestamp: Instant,
}

/// String-keyed cache whose entries expire after a fixed TTL
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a key, evicting it if it has outlived the TTL.
    ///
    /// The stored value is cloned out as-is; store `Arc`s to share rather
    /// than copy.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            Some(entry) => entry.timestamp.elapsed() > self.ttl,
            None => {
                tracing::debug!("Cache miss: {}", key);
                return None;
            }
        };

        if expired {
            entries.remove(key);
            tracing::debug!("Cache expired: {}", key);
            return None;
        }

        tracing::debug!("Cache hit: {}", key);
        entries.get(key).map(|entry| entry.data.clone())
    }

    /// Store a value, replacing any previous entry with a fresh timestamp
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.lock().insert(
            key.into(),
            CacheEntry {
                data: value,
                timestamp: Instant::now(),
            },
        );
    }

    /// Drop a single entry
    pub fn remove(&self, key: &str) -> Option<V> {
        self.lock().remove(key).map(|entry| entry.data)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, expired ones included until they are read
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // A panic elsewhere cannot leave a half-written map behind
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
