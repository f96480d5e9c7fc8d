//! Bounded cache backing `cache.policy`: a thin wrapper around the `lru`
//! crate's `LruCache` behind a `parking_lot::Mutex`, with a `Disabled`
//! variant that bypasses storage entirely so the engine can treat both
//! cache policies uniformly.

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::config::CachePolicy;

/// `capacity <= 0` means unbounded.
fn capacity_for(capacity: i64) -> NonZeroUsize {
    if capacity <= 0 {
        NonZeroUsize::new(usize::MAX).expect("usize::MAX is nonzero")
    } else {
        NonZeroUsize::new(capacity as usize).unwrap_or(NonZeroUsize::new(1).expect("1 is nonzero"))
    }
}

pub struct BoundedCache<K, V> {
    inner: Option<Mutex<LruCache<K, V>>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(policy: CachePolicy, capacity: i64) -> Self {
        match policy {
            CachePolicy::Disabled => BoundedCache { inner: None },
            CachePolicy::Lru => BoundedCache {
                inner: Some(Mutex::new(LruCache::new(capacity_for(capacity)))),
            },
        }
    }

    /// Look up `key`; on miss, compute `f()`, store it, and return it.
    /// Concurrent misses on the same key may compute redundantly, but the
    /// last write wins and all results are equal for pure builders.
    pub fn get_or_insert_with(&self, key: K, f: impl FnOnce() -> V) -> V {
        match &self.inner {
            None => f(),
            Some(cache) => {
                if let Some(hit) = cache.lock().get(&key) {
                    return hit.clone();
                }
                let value = f();
                cache.lock().put(key, value.clone());
                value
            }
        }
    }

    /// Like `get_or_insert_with`, but for a fallible builder (e.g. building
    /// a `DependencyGraph`); a failed build is never cached.
    pub fn get_or_try_insert_with<E>(&self, key: K, f: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        match &self.inner {
            None => f(),
            Some(cache) => {
                if let Some(hit) = cache.lock().get(&key) {
                    return Ok(hit.clone());
                }
                let value = f()?;
                cache.lock().put(key, value.clone());
                Ok(value)
            }
        }
    }
}
