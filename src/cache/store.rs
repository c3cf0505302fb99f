//! Cache Store Module
//!
//! Unsynchronised TTL store. Every operation takes the instant it runs at, so
//! expiry is evaluated lazily at read time and never by a background task.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::entry::expiry_before;
use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats};

// == Cache Store ==
/// Key to entry mapping with lazy TTL expiry.
///
/// Expired entries stay in the map, inert, until they are overwritten or the
/// store is cleared.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Activity counters
    stats: StatsCounters,
    /// How far into the past an invalidated entry's expiry is pushed
    invalidation_offset: Duration,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `invalidation_offset` - how far before "now" invalidated entries expire
    pub fn new(invalidation_offset: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: StatsCounters::default(),
            invalidation_offset,
        }
    }

    // == Add ==
    /// Stores `value` under `key`, valid for `ttl` from `now`.
    ///
    /// Any previous entry for the key is discarded regardless of its
    /// remaining life. Returns the new entry's expiry.
    pub fn add(&mut self, key: String, value: V, ttl: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
        let entry = CacheEntry::new(value, ttl, now);
        let expires_at = entry.expires_at;
        self.entries.insert(key, entry);
        self.stats.record_set();
        expires_at
    }

    // == Get ==
    /// Returns the value for `key` if its expiry is strictly after `now`.
    ///
    /// Never-set and expired keys are both reported as `None`. Expired
    /// entries are left in place.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<&V> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.stats.record_hit();
                Some(&entry.value)
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Invalidate ==
    /// Pushes the expiry of `key` to `now - invalidation_offset`.
    ///
    /// The entry keeps its slot. Returns `false` (and changes nothing) when
    /// the key is absent.
    pub fn invalidate(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        entry.expire_at(expiry_before(now, self.invalidation_offset));
        self.stats.record_invalidation();
        true
    }

    // == Clear ==
    /// Drops every entry. Returns how many were held.
    pub fn clear(&mut self) -> usize {
        let removed = std::mem::take(&mut self.entries).len();
        self.stats.record_clear();
        removed
    }

    // == Contains Key ==
    /// Returns true if `key` has an entry, expired or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == TTL Remaining ==
    /// Remaining life of a valid entry, `None` when absent or expired.
    pub fn ttl_remaining(&self, key: &str, now: DateTime<Utc>) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.ttl_remaining_at(now))
    }

    // == Expired Count ==
    /// Number of expired entries still held by the store.
    pub fn expired_count(&self, now: DateTime<Utc>) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    // == Length ==
    /// Returns the number of entries held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    const OFFSET: Duration = Duration::from_secs(60);

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new(OFFSET);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_add_and_get() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), "value1".to_string(), secs(300), now);

        assert_eq!(store.get("key1", now).map(String::as_str), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store: CacheStore<String> = CacheStore::new(OFFSET);
        assert!(store.get("nonexistent", Utc::now()).is_none());
    }

    #[test]
    fn test_store_concrete_timeline() {
        let mut store = CacheStore::new(OFFSET);
        let t0 = Utc::now();

        store.add("a".to_string(), "x", secs(10), t0);
        assert_eq!(store.get("a", t0), Some(&"x"));

        let t11 = t0 + TimeDelta::seconds(11);
        assert_eq!(store.get("a", t11), None);

        store.add("a".to_string(), "y", secs(10), t11);
        assert_eq!(store.get("a", t0 + TimeDelta::seconds(12)), Some(&"y"));
    }

    #[test]
    fn test_store_expired_entries_stay_in_place() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), 1, secs(1), now);
        let later = now + TimeDelta::seconds(5);

        assert!(store.get("key1", later).is_none());
        assert!(store.contains_key("key1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.expired_count(later), 1);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), "value1", secs(1), now);
        store.add("key1".to_string(), "value2", secs(300), now);

        let later = now + TimeDelta::seconds(5);
        assert_eq!(store.get("key1", later), Some(&"value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_zero_ttl() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), "value1", Duration::ZERO, now);

        assert!(store.get("key1", now).is_none());
        assert!(store.contains_key("key1"));
    }

    #[test]
    fn test_store_invalidate() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), "value1", secs(3600), now);
        assert!(store.invalidate("key1", now));

        assert!(store.get("key1", now).is_none());
        assert!(store.contains_key("key1"));
        // Stays expired even if the clock steps back a little
        assert!(store.get("key1", now - TimeDelta::seconds(30)).is_none());
    }

    #[test]
    fn test_store_invalidate_nonexistent() {
        let mut store: CacheStore<&str> = CacheStore::new(OFFSET);

        assert!(!store.invalidate("nonexistent", Utc::now()));
        assert!(store.is_empty());
        assert_eq!(store.stats().invalidations, 0);
    }

    #[test]
    fn test_store_invalidate_already_expired() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), "value1", secs(1), now);
        assert!(store.invalidate("key1", now + TimeDelta::seconds(10)));
        assert_eq!(store.expired_count(now + TimeDelta::seconds(10)), 1);
    }

    #[test]
    fn test_store_clear() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), "value1", secs(300), now);
        store.add("key2".to_string(), "value2", secs(1), now);

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert!(store.get("key1", now).is_none());
        assert!(store.get("key2", now).is_none());
    }

    #[test]
    fn test_store_ttl_remaining() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), "value1", secs(10), now);

        assert_eq!(
            store.ttl_remaining("key1", now + TimeDelta::seconds(3)),
            Some(secs(7))
        );
        assert_eq!(store.ttl_remaining("key1", now + TimeDelta::seconds(10)), None);
        assert_eq!(store.ttl_remaining("missing", now), None);
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(OFFSET);
        let now = Utc::now();

        store.add("key1".to_string(), "value1", secs(300), now);
        store.get("key1", now); // hit
        store.get("nonexistent", now); // miss
        store.invalidate("key1", now);
        store.get("key1", now); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
