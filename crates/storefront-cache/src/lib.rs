//! Bounded in-memory cache with TTL expiry
//!
//! This crate provides [`BoundedTtlCache`], the process-local store used to
//! remember successful chain verifications. Entries expire after a fixed TTL and
//! the cache never holds more than a configured number of entries: when an
//! insert pushes it over the bound, expired entries are purged first and then
//! the entries closest to expiry are dropped.
//!
//! # Example
//!
//! ```
//! use storefront_cache::{BoundedTtlCache, CacheOptions};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let cache = BoundedTtlCache::new(
//!     CacheOptions::default()
//!         .with_capacity(8)
//!         .with_ttl(Duration::from_secs(60)),
//! );
//!
//! cache.insert("key", 1u32).await;
//! assert_eq!(cache.get(&"key").await, Some(1));
//! # }
//! ```

mod memory;

pub use memory::BoundedTtlCache;

use std::time::Duration;

/// Default maximum number of cached entries
pub const DEFAULT_CAPACITY: usize = 32;

/// Default lifetime of a cached entry (15 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Sizing and lifetime options for a [`BoundedTtlCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Maximum number of entries held at any time
    pub capacity: usize,
    /// How long an entry stays valid after insertion
    pub ttl: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheOptions {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
