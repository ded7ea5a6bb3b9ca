//! In-memory cache implementation with TTL and a size bound

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::CacheOptions;

/// A cached entry with expiration time
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When this entry expires; `None` when the TTL runs past what an
    /// `Instant` can represent
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// In-memory cache with a TTL and a maximum size
///
/// All reads and writes go through a single mutex that owns the map, so lookup,
/// insertion and eviction are never interleaved. The cache is not persistent
/// across process restarts.
#[derive(Debug)]
pub struct BoundedTtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    options: CacheOptions,
}

impl<K, V> Default for BoundedTtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<K, V> BoundedTtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new empty cache
    pub fn new(options: CacheOptions) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            options,
        }
    }

    pub fn options(&self) -> CacheOptions {
        self.options
    }

    pub fn ttl(&self) -> Duration {
        self.options.ttl
    }

    /// Look up a live entry
    ///
    /// An expired entry is removed and reported as a miss.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a value that expires one TTL from now, then enforce the size bound
    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now.checked_add(self.options.ttl),
            },
        );

        if entries.len() > self.options.capacity {
            evict(&mut entries, self.options.capacity, now);
        }
    }

    /// Remove expired entries from the cache
    pub async fn cleanup_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| !entry.is_expired(now));
    }

    /// Get the number of entries in the cache (including expired ones)
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

/// Bring `entries` back within `capacity`
///
/// Every expired entry is dropped first. If that is not enough, live entries
/// are dropped in order of soonest expiry.
fn evict<K, V>(entries: &mut HashMap<K, CacheEntry<V>>, capacity: usize, now: Instant)
where
    K: Eq + Hash + Clone,
{
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    let expired = before - entries.len();

    let mut evicted = 0;
    if entries.len() > capacity {
        let mut by_expiry: Vec<(K, Option<Instant>)> = entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.expires_at))
            .collect();
        // Entries that never expire sort last
        by_expiry.sort_by_key(|(_, expires_at)| (expires_at.is_none(), *expires_at));

        let excess = entries.len() - capacity;
        for (key, _) in by_expiry.into_iter().take(excess) {
            entries.remove(&key);
            evicted += 1;
        }
    }

    tracing::debug!(expired, evicted, remaining = entries.len(), "Evicted cache entries");
}
