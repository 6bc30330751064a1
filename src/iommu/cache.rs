//! Small fixed-capacity LRU directory caches: a DDT cache keyed by device id
//! (64 entries) and a PDT cache keyed by (device id, process id) (128
//! entries), each storing the cached context plus a monotonically
//! increasing access timestamp. Generalizes the small-cache idiom used for
//! the PMP/PMA "last region" accelerator (`PmaChecker`) to a key-addressed,
//! capacity-bounded set with eviction, rather than an unbounded map.

use std::collections::HashMap;
use std::hash::Hash;

struct Entry<V> {
    value: V,
    last_used: u64,
}

/// A fixed-capacity LRU cache keyed by `K`, evicting the least-recently
/// used entry once `capacity` is exceeded.
pub struct LruCache<K, V> {
    capacity: usize,
    entries: HashMap<K, Entry<V>>,
    clock: u64,
}

impl<K: Eq + Hash + Copy, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        LruCache {
            capacity,
            entries: HashMap::with_capacity(capacity),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.tick();
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_used = now;
            Some(&entry.value)
        } else {
            None
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        let now = self.tick();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(lru_key) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| *k)
            {
                self.entries.remove(&lru_key);
            }
        }
        self.entries.insert(
            key,
            Entry {
                value,
                last_used: now,
            },
        );
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub const DDT_CACHE_CAPACITY: usize = 64;
pub const PDT_CACHE_CAPACITY: usize = 128;

pub type DdtCache<V> = LruCache<u32, V>;
pub type PdtCache<V> = LruCache<(u32, u32), V>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used_once_full() {
        let mut cache: LruCache<u32, u32> = LruCache::new(2);
        cache.insert(1, 100);
        cache.insert(2, 200);
        // Touch key 1 so key 2 becomes the least-recently used.
        assert_eq!(cache.get(&1), Some(&100));
        cache.insert(3, 300);
        assert_eq!(cache.get(&2), None, "key 2 should have been evicted");
        assert_eq!(cache.get(&1), Some(&100));
        assert_eq!(cache.get(&3), Some(&300));
    }

    #[test]
    fn invalidate_removes_single_entry() {
        let mut cache: LruCache<u32, u32> = LruCache::new(4);
        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.invalidate(&1);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&20));
    }

    #[test]
    fn pdt_cache_keys_by_device_and_process() {
        let mut cache: PdtCache<u32> = LruCache::new(PDT_CACHE_CAPACITY);
        cache.insert((1, 2), 99);
        assert_eq!(cache.get(&(1, 2)), Some(&99));
        assert_eq!(cache.get(&(1, 3)), None);
    }
}
