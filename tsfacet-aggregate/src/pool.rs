//! Arena of reusable aggregation maps.
//!
//! Each segment scan checks a map out of the pool and the map finds its way
//! back when the last owner drops it, whether that is the aggregator of an
//! abandoned scan, a consumed partial result or a finished merge.

use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::entry::EntryMap;

/// Sizing of a [`MapPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Upper bound on idle maps kept for reuse. Extra maps are dropped.
    pub max_pooled_maps: usize,
    /// Capacity reserved for freshly allocated maps.
    pub initial_capacity: usize,
    /// Returned maps grown past this capacity are shrunk back to it, so one
    /// high-cardinality query does not pin its memory in the pool.
    pub max_retained_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pooled_maps: 64,
            initial_capacity: 1024,
            max_retained_capacity: 1 << 16,
        }
    }
}

/// Shared arena of [`EntryMap`] buffers. Cloning shares the arena.
#[derive(Clone, Debug, Default)]
pub struct MapPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug, Default)]
struct PoolInner {
    config: PoolConfig,
    idle: Mutex<Vec<EntryMap>>,
    acquired: AtomicU64,
    allocated: AtomicU64,
}

impl PoolInner {
    fn release(&self, mut map: EntryMap) {
        if map.capacity() == 0 {
            return;
        }
        map.clear();
        if map.capacity() > self.config.max_retained_capacity {
            map.shrink_to(self.config.max_retained_capacity);
        }
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.config.max_pooled_maps {
            idle.push(map);
        }
    }
}

impl MapPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(Vec::with_capacity(config.max_pooled_maps)),
                config,
                acquired: AtomicU64::new(0),
                allocated: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Check out an empty map. It returns to this pool when dropped.
    pub fn acquire(&self) -> PooledMap {
        self.inner.acquired.fetch_add(1, Ordering::Relaxed);
        let reused = self
            .inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let map = reused.unwrap_or_else(|| {
            self.inner.allocated.fetch_add(1, Ordering::Relaxed);
            EntryMap::with_capacity_and_hasher(
                self.inner.config.initial_capacity,
                Default::default(),
            )
        });
        PooledMap {
            map,
            home: Some(Arc::clone(&self.inner)),
        }
    }

    /// Idle maps currently held for reuse.
    pub fn pooled(&self) -> usize {
        self.inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Total number of [`MapPool::acquire`] calls.
    pub fn acquired_total(&self) -> u64 {
        self.inner.acquired.load(Ordering::Relaxed)
    }

    /// Number of acquisitions that had to allocate a new map.
    pub fn allocated_total(&self) -> u64 {
        self.inner.allocated.load(Ordering::Relaxed)
    }
}

/// An [`EntryMap`] checked out of a [`MapPool`].
///
/// Dropping the guard clears the map and hands it back to its pool. A
/// detached map (for example one decoded from transport bytes) has no pool
/// and is simply freed.
#[derive(Debug, Default)]
pub struct PooledMap {
    map: EntryMap,
    home: Option<Arc<PoolInner>>,
}

impl PooledMap {
    /// Wrap a map that belongs to no pool.
    pub fn detached(map: EntryMap) -> Self {
        Self { map, home: None }
    }

    pub fn is_pooled(&self) -> bool {
        self.home.is_some()
    }

    /// Take the map out; it will not return to the pool.
    pub fn into_inner(mut self) -> EntryMap {
        self.home = None;
        mem::take(&mut self.map)
    }
}

impl Deref for PooledMap {
    type Target = EntryMap;

    fn deref(&self) -> &EntryMap {
        &self.map
    }
}

impl DerefMut for PooledMap {
    fn deref_mut(&mut self) -> &mut EntryMap {
        &mut self.map
    }
}

impl Drop for PooledMap {
    fn drop(&mut self) {
        if let Some(home) = self.home.take() {
            home.release(mem::take(&mut self.map));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    #[test]
    fn dropped_maps_are_cleared_and_reused() {
        let pool = MapPool::new(PoolConfig {
            max_pooled_maps: 4,
            initial_capacity: 16,
            ..PoolConfig::default()
        });
        {
            let mut map = pool.acquire();
            map.insert(1, Entry::new(1, 1));
            assert_eq!(pool.pooled(), 0);
        }
        assert_eq!(pool.pooled(), 1);

        let map = pool.acquire();
        assert!(map.is_empty());
        assert!(map.is_pooled());
        assert_eq!(pool.acquired_total(), 2);
        assert_eq!(pool.allocated_total(), 1);
    }

    #[test]
    fn idle_maps_are_capped() {
        let pool = MapPool::new(PoolConfig {
            max_pooled_maps: 2,
            initial_capacity: 4,
            ..PoolConfig::default()
        });
        let maps: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        drop(maps);
        assert_eq!(pool.pooled(), 2);
    }

    #[test]
    fn oversized_maps_are_shrunk_on_return() {
        let pool = MapPool::new(PoolConfig {
            max_pooled_maps: 4,
            initial_capacity: 16,
            max_retained_capacity: 256,
        });
        {
            let mut map = pool.acquire();
            for k in 0..50_000 {
                map.insert(k, Entry::new(k, 0));
            }
            assert!(map.capacity() >= 50_000);
        }
        assert_eq!(pool.pooled(), 1);

        let map = pool.acquire();
        assert!(map.is_empty());
        assert!(map.capacity() < 1024, "capacity {}", map.capacity());
        assert_eq!(pool.allocated_total(), 1);
    }

    #[test]
    fn detached_and_extracted_maps_skip_the_pool() {
        let pool = MapPool::new(PoolConfig::default());
        let map = pool.acquire();
        let raw = map.into_inner();
        assert!(raw.capacity() > 0);
        assert_eq!(pool.pooled(), 0);

        drop(PooledMap::detached(raw));
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn maps_return_when_a_panic_unwinds() {
        let pool = MapPool::new(PoolConfig::default());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _map = pool.acquire();
            panic!("scan aborted");
        }));
        assert!(result.is_err());
        assert_eq!(pool.pooled(), 1);
    }
}
