//! In-memory TTL cache.
//!
//! Every entry carries an absolute expiry instant. Expired entries are
//! purged lazily: a `get` that finds an entry at or past its expiry removes
//! it and reports a miss. There is no background sweep and no capacity
//! bound.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Default time-to-live for cached values.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);

/// A stored value and the instant it stops being visible.
///
/// `None` means the TTL reaches past what `Instant` can represent, so the
/// entry never expires.
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Thread-safe key/value cache with a fixed per-instance TTL.
///
/// `get`, `set` and `clear` are serialized by a single mutex; the lock is
/// only held for the map operation itself.
pub struct TtlCache<K, V> {
    ttl: Duration,
    store: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache whose entries live for `ttl_seconds` seconds.
    pub fn from_secs(ttl_seconds: u64) -> Self {
        Self::new(Duration::from_secs(ttl_seconds))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Lock the store, recovering from poison if necessary.
    ///
    /// Entries are written whole, so a panic elsewhere cannot leave a
    /// half-written entry behind.
    fn lock_store(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.store.lock().unwrap_or_else(|poisoned| {
            warn!("Cache store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Return a clone of the live value for `key`.
    ///
    /// An entry whose expiry is at or before now is removed and `None` is
    /// returned.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut store = self.lock_store();

        match store.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }

        store.remove(key);
        debug!("Cache entry expired and evicted");
        None
    }

    /// Insert or overwrite `key`, expiring `ttl` from now.
    pub fn set(&self, key: K, value: V) {
        let expires_at = Instant::now().checked_add(self.ttl);
        if expires_at.is_none() {
            debug!("Cache TTL {:?} is unrepresentable, entry never expires", self.ttl);
        }
        let mut store = self.lock_store();
        store.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock_store().clear();
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock_store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
