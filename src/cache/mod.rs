use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Thread-safe keyed cache with time-to-live expiry.
///
/// Expiry is lazy: an expired entry is treated as a miss and removed on
/// read; there is no background sweep. The TTL is supplied by the caller
/// per lookup, so different external identities can carry different
/// freshness policies through one shared cache. An LRU capacity bound
/// keeps memory finite.
///
/// Created once by the owning component and passed down explicitly;
/// tests construct isolated instances.
pub struct TtlCache<V> {
    cache: Mutex<LruCache<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache bounded to `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity floor is 1");

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Look up `key`, treating entries older than `ttl` as misses.
    ///
    /// An expired entry is evicted before returning `None`.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        let mut cache = self.cache.lock().unwrap();
        match cache.get(key) {
            Some(entry) if entry.stored_at.elapsed() < ttl => Some(entry.value.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key`, refreshing its stored-at timestamp.
    /// One entry per key; a re-put overwrites.
    pub fn put(&self, key: String, value: V) {
        self.cache.lock().unwrap().put(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Current number of entries, including any not-yet-evicted expired ones
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }

    /// Explicit reset; otherwise entries live until expiry or LRU eviction
    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }
}
