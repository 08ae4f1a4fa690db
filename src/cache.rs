use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Concurrent response cache with per-entry expiry.
///
/// Staleness within the TTL is acceptable; the cache is a latency
/// optimization, not a correctness dependency. Insertion is atomic per key
/// via the underlying shard locks.
pub struct TtlCache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: String, value: V) {
        if self.entries.len() >= self.max_entries {
            self.prune_expired();
        }

        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn prune_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() <= ttl);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_inserted_value() {
        let cache = TtlCache::new(Duration::from_secs(60), 16);
        cache.insert("k".to_string(), 42);
        assert_eq!(cache.get("k"), Some(42));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_entries_expire() {
        let cache = TtlCache::new(Duration::from_millis(20), 16);
        cache.insert("k".to_string(), 1);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let cache = TtlCache::new(Duration::from_secs(60), 16);
        cache.insert("k".to_string(), 1);
        cache.insert("k".to_string(), 2);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_prune_drops_expired_entries_at_capacity() {
        let cache = TtlCache::new(Duration::from_millis(10), 2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        std::thread::sleep(Duration::from_millis(30));
        cache.insert("c".to_string(), 3);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.len(), 1);
    }
}
