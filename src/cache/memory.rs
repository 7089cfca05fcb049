//! Memory Tier
//!
//! Unbounded in-process map behind a single `parking_lot::Mutex`. Every
//! operation, including bulk dumps and key walks, takes the same lock.
//!
//! # Limitations
//!
//! - No capacity bound or eviction: the map grows with the key set.
//! - The lock is not reentrant. Only [`MemoryCache::iterate_keys`] calls
//!   back into caller code, and it does so after releasing the lock.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::debug;

use super::error::CacheResult;
use super::traits::{SyncCache, Tier};

/// In-process cache tier
pub struct MemoryCache<K, V> {
    name: String,
    storage: Mutex<HashMap<K, V>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache identified by `name` in logs
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.storage.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.lock().is_empty()
    }

    /// Copy of every entry
    pub fn dump(&self) -> HashMap<K, V> {
        self.storage.lock().clone()
    }

    /// Point-in-time snapshot of the key set
    pub fn keys(&self) -> HashSet<K> {
        self.storage.lock().keys().cloned().collect()
    }

    /// Visit every key present when the walk started.
    ///
    /// The visitor runs on a snapshot, so it may mutate this cache.
    pub fn iterate_keys<F>(&self, mut visit: F)
    where
        F: FnMut(&K),
    {
        let snapshot = self.keys();
        for key in &snapshot {
            visit(key);
        }
    }
}

impl<K, V> Tier for MemoryCache<K, V>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    type Key = K;
    type Value = V;
}

impl<K, V> SyncCache for MemoryCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let value = self.storage.lock().get(key).cloned();
        debug!(cache = %self.name, ?key, hit = value.is_some(), "Memory get");
        value
    }

    fn set(&self, key: K, value: V) -> CacheResult<K> {
        debug!(cache = %self.name, ?key, "Memory set");
        self.storage.lock().insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &K) -> CacheResult<K> {
        debug!(cache = %self.name, ?key, "Memory remove");
        self.storage.lock().remove(key);
        Ok(())
    }

    fn remove_all(&self) -> CacheResult<K> {
        debug!(cache = %self.name, "Memory clear");
        self.storage.lock().clear();
        Ok(())
    }
}

impl<K, V> fmt::Debug for MemoryCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("name", &self.name)
            .field("len", &self.storage.lock().len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
