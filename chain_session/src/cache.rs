//! Value-keyed TTL cache for computed views and scope listings.
//!
//! The session layer recomputes cheaply but fetches expensively, so the
//! cache sits in front of the loader: whole values in, [`Arc`] handles out.
//! Entries expire individually by insertion age; [`TtlCache::clear`] drops
//! everything at once, which is the only invalidation the dashboard's
//! refresh action needs.
//!
//! Expired entries are evicted lazily on the `get` that observes them.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

struct Entry<V> {
    inserted_at: Instant,
    value: Arc<V>,
}

/// Thread-safe map whose entries expire `ttl` after insertion.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    /// New empty cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        // No invariant spans a panic point while the lock is held, so a
        // poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Live value for `key`, or `None`. An expired entry is removed here.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut entries = self.lock();
        if let Some(entry) = entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(Arc::clone(&entry.value));
            }
        }
        entries.remove(key);
        None
    }

    /// Store `value` under `key`, resetting its age, and hand back the
    /// shared handle.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.lock().insert(
            key,
            Entry {
                inserted_at: Instant::now(),
                value: Arc::clone(&value),
            },
        );
        value
    }

    /// Drop every entry, live or expired.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, counting ones past their TTL that no `get`
    /// has evicted yet.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn hit_within_ttl_returns_same_handle() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        let stored = cache.insert("nifty", 7);
        let hit = cache.get(&"nifty").unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
        assert_eq!(*hit, 7);
    }

    #[test]
    fn miss_on_unknown_key() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        assert!(cache.get(&"nifty").is_none());
    }

    #[test]
    fn expired_entry_is_evicted_on_get() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_millis(10));
        cache.insert("nifty", 7);
        thread::sleep(Duration::from_millis(25));
        assert!(cache.get(&"nifty").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn reinsert_resets_age_and_value() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("nifty", 7);
        cache.insert("nifty", 8);
        assert_eq!(*cache.get(&"nifty").unwrap(), 8);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("nifty", 1);
        cache.insert("banknifty", 2);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&"nifty").is_none());
    }
}
