//! Shared Cache Handle
//!
//! `TtlCache` is the thread-safe, cheaply clonable handle callers pass around.
//! Each operation holds the store lock for exactly one map access and never
//! across an `.await`.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore, Clock, SystemClock};
use crate::config::Config;

// == TTL Cache ==
/// Process-local TTL cache shared between tasks and threads.
///
/// Construct one at startup and hand clones to whoever needs it; all clones
/// see the same entries.
pub struct TtlCache<V> {
    /// Lock-protected storage
    store: Arc<RwLock<CacheStore<V>>>,
    /// Time source for expiry checks
    clock: Arc<dyn Clock>,
    /// TTL used by `add_default` and `WrapOptions::default`
    default_ttl: Duration,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            default_ttl: self.default_ttl,
        }
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.read().len())
            .field("clock", &self.clock)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    // == Constructors ==
    /// Creates an empty cache with the default configuration and wall clock.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Creates an empty cache from configuration, using the wall clock.
    pub fn with_config(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty cache that reads time from `clock`.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(config.invalidation_offset))),
            clock,
            default_ttl: config.default_ttl,
        }
    }

    // The store has no invariants spanning more than one call, so a panic
    // while the lock was held cannot leave it inconsistent.
    fn read(&self) -> RwLockReadGuard<'_, CacheStore<V>> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheStore<V>> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current instant according to the cache's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// TTL applied when none is given.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Add ==
    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    ///
    /// A zero TTL is accepted and leaves an entry that is already expired.
    pub fn add(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let now = self.now();
        let expires_at = self.write().add(key.clone(), value, ttl, now);
        info!(
            "Cache set for {} valid until {} UTC",
            key,
            expires_at.format("%H:%M:%S")
        );
    }

    /// Stores `value` under `key` with the default TTL.
    pub fn add_default(&self, key: impl Into<String>, value: V) {
        self.add(key, value, self.default_ttl);
    }

    // == Invalidate ==
    /// Marks the entry for `key` as expired without removing it.
    ///
    /// Absent keys are ignored.
    pub fn invalidate(&self, key: &str) {
        self.invalidate_entry(key);
    }

    /// Invalidates `key` if it has any entry; reports whether it did.
    pub(crate) fn invalidate_entry(&self, key: &str) -> bool {
        let now = self.now();
        let invalidated = self.write().invalidate(key, now);
        if invalidated {
            info!("Cache invalidated for {}", key);
        }
        invalidated
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        let removed = self.write().clear();
        info!("Cache cleared ({} entries dropped)", removed);
    }

    // == Inspection ==
    /// Returns true if `key` has an entry, expired or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Remaining life of the entry for `key`, `None` if absent or expired.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.now();
        self.read().ttl_remaining(key, now)
    }

    /// Number of expired entries still held.
    pub fn expired_count(&self) -> usize {
        let now = self.now();
        self.read().expired_count(now)
    }

    /// Number of entries held, expired ones included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.read().stats()
    }
}

impl<V: Clone> TtlCache<V> {
    // == Get ==
    /// Returns a copy of the value for `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.now();
        let value = self.read().get(key, now).cloned();
        match value {
            Some(_) => debug!("Cache hit for {}", key),
            None => debug!("Cache miss for {}", key),
        }
        value
    }
}
