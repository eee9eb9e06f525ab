//! Bounded LRU cache of shared profile Info objects.
//!
//! Info construction is expensive (root finds, quadrature, table
//! builds), so each family keeps a process-wide cache keyed by its
//! shape parameter and the exact accuracy-parameter bits. The cache
//! guarantees:
//!
//! - bit-identical keys share one `Arc<V>` while the entry lives;
//! - at most one construction runs per key even when several threads
//!   request it at once; late arrivals wait on the entry's build cell,
//!   not on the cache lock, so lookups for other keys never serialize
//!   behind a slow build;
//! - capacity is enforced by exact least-recently-used eviction, which
//!   drops only the cache's own reference (outstanding holders keep
//!   their Info alive);
//! - a failed build leaves no entry behind, so the key can be retried.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use log::debug;
use once_cell::sync::OnceCell;

type Slot<V> = Arc<OnceCell<Arc<V>>>;

struct Entry<V> {
    slot: Slot<V>,
    last_used: u64,
}

struct State<K, V> {
    entries: HashMap<K, Entry<V>>,
    tick: u64,
}

/// A bounded, thread-safe, build-once cache from keys to shared values.
pub struct InfoCache<K, V> {
    capacity: usize,
    state: Mutex<State<K, V>>,
}

impl<K, V> InfoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Cache capacity must be positive");
        Self {
            capacity,
            state: Mutex::new(State {
                entries: HashMap::new(),
                tick: 0,
            }),
        }
    }

    /// Return the cached value for `key`, building it if necessary.
    ///
    /// On a hit the entry's recency is refreshed. On a miss the builder
    /// runs outside the cache lock; concurrent requests for the same
    /// key block until it finishes and then share its result. If the
    /// builder fails the error is returned and the entry is removed.
    pub fn get_or_build<E, F>(&self, key: &K, build: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let (slot, fresh) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.tick += 1;
            let tick = state.tick;
            if let Some(entry) = state.entries.get_mut(key) {
                entry.last_used = tick;
                (entry.slot.clone(), false)
            } else {
                let slot: Slot<V> = Arc::new(OnceCell::new());
                state.entries.insert(
                    key.clone(),
                    Entry {
                        slot: slot.clone(),
                        last_used: tick,
                    },
                );
                if state.entries.len() > self.capacity {
                    Self::evict_lru(&mut state, key);
                }
                (slot, true)
            }
        };
        if !fresh {
            debug!("info cache hit");
        }

        match slot.get_or_try_init(|| build().map(Arc::new)) {
            Ok(value) => Ok(value.clone()),
            Err(err) => {
                // Drop the failed entry (only if it is still ours) so a
                // later request can retry construction.
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(entry) = state.entries.get(key) {
                    if Arc::ptr_eq(&entry.slot, &slot) {
                        state.entries.remove(key);
                    }
                }
                Err(err)
            }
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry (outstanding `Arc`s stay valid).
    pub fn clear(&self) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .clear();
    }

    fn evict_lru(state: &mut State<K, V>, keep: &K) {
        // Capacities are small (tens of entries), so a linear scan per
        // insertion is cheaper than maintaining an intrusive list.
        let victim = state
            .entries
            .iter()
            .filter(|&(k, _)| k != keep)
            .min_by_key(|(_, e)| e.last_used)
            .map(|(k, _)| k.clone());
        if let Some(victim) = victim {
            state.entries.remove(&victim);
            debug!("info cache evicted least-recently-used entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_build(counter: &AtomicUsize, v: u64) -> Result<u64, Infallible> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(v)
    }

    #[test]
    fn test_same_key_shares_instance() {
        let cache: InfoCache<u32, u64> = InfoCache::new(4);
        let builds = AtomicUsize::new(0);
        let a = cache.get_or_build(&1, || counting_build(&builds, 10)).unwrap();
        let b = cache.get_or_build(&1, || counting_build(&builds, 10)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_distinct_keys_do_not_collide() {
        let cache: InfoCache<u32, u64> = InfoCache::new(4);
        let builds = AtomicUsize::new(0);
        let a = cache.get_or_build(&1, || counting_build(&builds, 10)).unwrap();
        let b = cache.get_or_build(&2, || counting_build(&builds, 20)).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, 10);
        assert_eq!(*b, 20);
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_eviction_is_exact_lru() {
        let cache: InfoCache<u32, u64> = InfoCache::new(3);
        let builds = AtomicUsize::new(0);
        for k in 1..=3u32 {
            cache.get_or_build(&k, || counting_build(&builds, k as u64)).unwrap();
        }
        // Touch 1 so that 2 becomes the least recently used…
        cache.get_or_build(&1, || counting_build(&builds, 1)).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 3);

        // …then overflow: key 2 must be the one evicted.
        cache.get_or_build(&4, || counting_build(&builds, 4)).unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(builds.load(Ordering::SeqCst), 4);

        // 1 and 3 are still cached (no rebuild)…
        cache.get_or_build(&1, || counting_build(&builds, 1)).unwrap();
        cache.get_or_build(&3, || counting_build(&builds, 3)).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 4);

        // …while 2 was reconstructed on re-fetch.
        cache.get_or_build(&2, || counting_build(&builds, 2)).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_evicted_value_survives_for_holders() {
        let cache: InfoCache<u32, u64> = InfoCache::new(1);
        let held = cache.get_or_build(&1, || Ok::<_, Infallible>(11)).unwrap();
        cache.get_or_build(&2, || Ok::<_, Infallible>(22)).unwrap();
        assert_eq!(cache.len(), 1);
        // The evicted value is still usable through the held Arc.
        assert_eq!(*held, 11);
    }

    #[test]
    fn test_clear_and_capacity() {
        let cache: InfoCache<u32, u64> = InfoCache::new(3);
        assert_eq!(cache.capacity(), 3);
        assert!(cache.is_empty());

        let builds = AtomicUsize::new(0);
        cache.get_or_build(&1, || counting_build(&builds, 1)).unwrap();
        let held = cache.get_or_build(&2, || counting_build(&builds, 2)).unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        // Held values survive the clear; re-fetching rebuilds.
        assert_eq!(*held, 2);
        cache.get_or_build(&1, || counting_build(&builds, 1)).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_build_can_retry() {
        let cache: InfoCache<u32, u64> = InfoCache::new(2);
        let err = cache.get_or_build(&1, || Err::<u64, _>("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert_eq!(cache.len(), 0);

        let ok = cache.get_or_build(&1, || Ok::<_, &str>(7)).unwrap();
        assert_eq!(*ok, 7);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_same_key_builds_once() {
        let cache: InfoCache<u32, u64> = InfoCache::new(4);
        let builds = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let v = cache
                        .get_or_build(&42, || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            // Widen the race window so rivals really overlap.
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok::<_, Infallible>(99)
                        })
                        .unwrap();
                    assert_eq!(*v, 99);
                });
            }
        });
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_distinct_keys() {
        let cache: InfoCache<u32, u64> = InfoCache::new(16);
        std::thread::scope(|scope| {
            for k in 0..8u32 {
                let cache = &cache;
                scope.spawn(move || {
                    let v = cache.get_or_build(&k, || Ok::<_, Infallible>(k as u64 * 3)).unwrap();
                    assert_eq!(*v, k as u64 * 3);
                });
            }
        });
        assert_eq!(cache.len(), 8);
    }

    #[test]
    #[should_panic(expected = "Cache capacity must be positive")]
    fn test_zero_capacity_rejected() {
        let _cache: InfoCache<u32, u64> = InfoCache::new(0);
    }
}
