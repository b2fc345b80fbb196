//! Bounded in-memory track cache
//!
//! Strict FIFO by insertion order: when full, the oldest inserted entry is
//! evicted no matter how recently it was hit. This is deliberate — a cheap,
//! predictable policy for short-lived gameplay sessions, not an LRU.

use aria_core::ContentHash;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Bounded key -> track store with FIFO eviction
pub struct TrackCache {
    capacity: usize,
    tracks: HashMap<String, Arc<Vec<u8>>>,
    order: VecDeque<String>,
}

impl Default for TrackCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl TrackCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tracks: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Insert a track, evicting the oldest entry when at capacity.
    /// Re-inserting an existing key replaces the track without aging it.
    pub fn put(&mut self, key: impl Into<String>, track: Arc<Vec<u8>>) {
        let key = key.into();
        if self.tracks.contains_key(&key) {
            self.tracks.insert(key, track);
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.tracks.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.tracks.insert(key, track);
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.tracks.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tracks.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Deterministic cache key from a context label (zone, scene name) and the
/// generation prompt
pub fn cache_key(context: &str, prompt: &str) -> String {
    format!("{}_{}", context, ContentHash::from_str(prompt).short_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(byte: u8) -> Arc<Vec<u8>> {
        Arc::new(vec![byte; 8])
    }

    #[test]
    fn test_put_get() {
        let mut cache = TrackCache::new(4);
        cache.put("a", track(1));
        assert_eq!(cache.get("a").unwrap(), track(1));
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let capacity = 3;
        let mut cache = TrackCache::new(capacity);
        for (i, key) in ["a", "b", "c"].iter().enumerate() {
            cache.put(*key, track(i as u8));
        }

        // hit "a" — FIFO must ignore access recency
        assert!(cache.get("a").is_some());

        cache.put("d", track(9));
        assert_eq!(cache.len(), capacity);
        assert!(!cache.contains("a"), "oldest inserted key must be evicted");
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));

        cache.put("e", track(10));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_reinsert_existing_key_keeps_age() {
        let mut cache = TrackCache::new(2);
        cache.put("a", track(1));
        cache.put("b", track(2));
        // refresh "a" with a new track; it stays the oldest
        cache.put("a", track(3));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap(), track(3));

        cache.put("c", track(4));
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_clear() {
        let mut cache = TrackCache::new(2);
        cache.put("a", track(1));
        cache.clear();
        assert!(cache.is_empty());
        // order queue is reset too: filling past capacity works again
        cache.put("b", track(2));
        cache.put("c", track(3));
        cache.put("d", track(4));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_key_deterministic() {
        let k1 = cache_key("zone_forest", "mysterious forest exploration");
        let k2 = cache_key("zone_forest", "mysterious forest exploration");
        assert_eq!(k1, k2);
        assert!(k1.starts_with("zone_forest_"));

        assert_ne!(k1, cache_key("zone_forest", "dark dungeon"));
        assert_ne!(k1, cache_key("zone_cave", "mysterious forest exploration"));
    }
}
