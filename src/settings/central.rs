//! Central Settings Cache
//!
//! One memory tier and one disk tier behind a single persisted blob.
//!
//! # Lifecycle
//!
//! ```text
//! warmup()          disk blob ──decode──▶ memory (key by key)
//! typed get/set     memory only; every mutation marks dirty
//! synchronize(f)    if dirty || f: memory snapshot ──▶ disk blob
//! ```
//!
//! # Durability
//!
//! The dirty flag is cleared only after the blob write succeeds. A mutation
//! landing between the snapshot and the flag reset is not in the written
//! blob and no longer marks the cache dirty, so it is lost if the process
//! ends before the next mutation triggers another flush.
//!
//! Blocking and non-blocking flushes share one queue, so an older snapshot
//! never overwrites a newer one on disk.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{
    wait_fetch, wait_store, DiskCache, DiskCacheConfig, DiskCacheError, MemoryCache, SerialQueue,
    SyncCache,
};
use crate::json::{DynamicJson, JsonObject};
use crate::perf;

use super::keys::SettingKey;
use super::typed::{TypeSafeStore, TypedResult};

/// File name of the settings blob inside the disk tier
pub const DEFAULT_BLOB_KEY: &str = "settings";

struct CentralState {
    memory: MemoryCache<String, DynamicJson>,
    disk: DiskCache<String, DynamicJson>,
    blob_key: String,
    dirty: AtomicBool,
}

impl CentralState {
    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    fn snapshot(&self) -> JsonObject {
        self.memory.dump().into_iter().collect()
    }

    fn synchronize(&self, force: bool) -> bool {
        if !force && !self.dirty.load(Ordering::SeqCst) {
            debug!("No changes in cache, skipping disk write");
            return false;
        }

        debug!(force, "Cache sync started");
        let blob = DynamicJson::Object(self.snapshot());
        match wait_store(&self.disk, self.blob_key.clone(), blob) {
            Ok(()) => {
                self.dirty.store(false, Ordering::SeqCst);
                debug!("Cache sync successful");
                true
            }
            Err(e) => {
                error!(key = %self.blob_key, error = %e, "Cache sync failed");
                false
            }
        }
    }
}

/// Settings store with warmup/synchronize lifecycle
pub struct CentralCache {
    state: Arc<CentralState>,
    sync_queue: SerialQueue,
}

impl CentralCache {
    /// Open the central cache using [`DEFAULT_BLOB_KEY`]
    pub fn new(config: &DiskCacheConfig) -> crate::Result<Self> {
        Self::with_blob_key(config, DEFAULT_BLOB_KEY)
    }

    pub fn with_blob_key(config: &DiskCacheConfig, blob_key: impl Into<String>) -> crate::Result<Self> {
        let state = CentralState {
            memory: MemoryCache::new("central"),
            disk: DiskCache::new(config)?,
            blob_key: blob_key.into(),
            dirty: AtomicBool::new(false),
        };
        Ok(Self {
            state: Arc::new(state),
            sync_queue: SerialQueue::new("tiercache.central.sync")?,
        })
    }

    /// Memory tier holding the live settings
    pub fn memory(&self) -> &MemoryCache<String, DynamicJson> {
        &self.state.memory
    }

    pub fn blob_key(&self) -> &str {
        &self.state.blob_key
    }

    /// True if memory may differ from the last successful flush
    pub fn is_dirty(&self) -> bool {
        self.state.dirty.load(Ordering::SeqCst)
    }

    /// Every live setting as one object
    pub fn dump(&self) -> DynamicJson {
        DynamicJson::Object(self.state.snapshot())
    }

    /// Load the persisted blob into memory.
    ///
    /// A missing, unreadable or non-object blob is empty state. Returns the
    /// loaded object (empty when nothing was loaded). Loading does not mark
    /// the cache dirty.
    pub fn warmup(&self) -> DynamicJson {
        let blob = match wait_fetch(&self.state.disk, self.state.blob_key.clone()) {
            Ok(blob) => blob,
            Err(e) if e.cause().is(DiskCacheError::ReadDataFailed) => {
                debug!(key = %self.state.blob_key, "No persisted settings");
                return DynamicJson::object();
            }
            Err(e) => {
                warn!(error = %e, "Persisted settings unreadable, starting empty");
                return DynamicJson::object();
            }
        };

        let Some(entries) = blob.as_object() else {
            warn!(kind = %blob.kind(), "Persisted settings are not an object, starting empty");
            return DynamicJson::object();
        };

        for (key, value) in entries {
            if let Err(e) = self.state.memory.set(key.clone(), value.clone()) {
                warn!(%key, error = %e, "Restoring setting failed");
            }
        }
        blob
    }

    /// [`CentralCache::warmup`] with lifecycle logging
    pub fn perform_warmup(&self) -> DynamicJson {
        debug!("Start warming up the central cache");
        let loaded = perf::measure("Cache Warmup", || self.warmup());
        let settings = loaded.as_object().map_or(0, |entries| entries.len());
        info!(settings, "Central cache warmed up");
        loaded
    }

    /// Flush memory to disk if dirty or `force`; blocks until written.
    ///
    /// Runs on the sync queue behind any pending
    /// [`CentralCache::synchronize_async`], so snapshots reach the disk in
    /// the order they were taken. Returns true only when a write happened
    /// and succeeded.
    pub fn synchronize(&self, force: bool) -> bool {
        let state = Arc::clone(&self.state);
        let (tx, rx) = crossbeam::channel::bounded(1);
        self.sync_queue.dispatch(move || {
            let written = perf::measure("Cache Synchronization", || state.synchronize(force));
            let _ = tx.send(written);
        });
        rx.recv().unwrap_or(false)
    }

    /// Non-blocking [`CentralCache::synchronize`] on the sync queue.
    ///
    /// A call that does not pass the dirty/force gate completes with
    /// `false` right away. Calls that pass are not coalesced.
    pub fn synchronize_async<F>(&self, force: bool, completion: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        if !force && !self.is_dirty() {
            debug!("No changes in cache, skipping disk write");
            completion(false);
            return;
        }
        let state = Arc::clone(&self.state);
        self.sync_queue.dispatch(move || {
            let written = perf::measure("Cache Synchronization", || state.synchronize(force));
            completion(written);
        });
    }
}

impl TypeSafeStore for CentralCache {
    type Key = SettingKey;

    fn raw_value(&self, key: &SettingKey) -> Option<DynamicJson> {
        self.state.memory.raw_value(key.as_str())
    }

    fn store_value(&self, key: &SettingKey, value: DynamicJson) -> TypedResult {
        self.state.mark_dirty();
        self.state.memory.store_value(key.as_str(), value)
    }

    fn remove_object(&self, key: &SettingKey) -> TypedResult {
        self.state.mark_dirty();
        self.state.memory.remove_object(key.as_str())
    }

    fn remove_all_objects(&self) -> TypedResult {
        self.state.mark_dirty();
        self.state.memory.remove_all_objects()
    }
}

impl std::fmt::Debug for CentralCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CentralCache")
            .field("blob_key", &self.state.blob_key)
            .field("dirty", &self.is_dirty())
            .field("disk", &self.state.disk)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> CentralCache {
        CentralCache::new(&DiskCacheConfig::new(dir.path(), "central")).unwrap()
    }

    fn blob_path(dir: &TempDir) -> std::path::PathBuf {
        dir.path().join("central").join(DEFAULT_BLOB_KEY)
    }

    #[test]
    fn test_dirty_flag_lifecycle() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        assert!(!cache.is_dirty());

        cache.set_bool(&SettingKey::LimitEventAndDataUsage, true).unwrap();
        assert!(cache.is_dirty());

        assert!(cache.synchronize(false));
        assert!(!cache.is_dirty());

        // Nothing changed: no write
        fs::remove_file(blob_path(&dir)).unwrap();
        assert!(!cache.synchronize(false));
        assert!(!blob_path(&dir).exists());

        assert!(cache.synchronize(true));
        assert!(blob_path(&dir).exists());
    }

    #[test]
    fn test_redundant_write_still_marks_dirty() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        cache.set_int(&SettingKey::Bitmask, 3).unwrap();
        cache.synchronize(false);

        cache.set_int(&SettingKey::Bitmask, 3).unwrap();
        assert!(cache.is_dirty());
        cache.remove_object(&SettingKey::Domain).unwrap();
        assert!(cache.is_dirty());
    }

    #[test]
    fn test_failed_write_keeps_dirty() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        cache.set_string(&SettingKey::Domain, "example.com").unwrap();

        // A directory squatting on the blob path makes the write fail
        fs::create_dir_all(blob_path(&dir)).unwrap();
        assert!(!cache.synchronize(false));
        assert!(cache.is_dirty());
    }

    #[test]
    fn test_synchronize_then_warmup_restores_settings() {
        let dir = TempDir::new().unwrap();
        {
            let cache = open(&dir);
            cache.set_string(&SettingKey::Domain, "example.com").unwrap();
            cache.set_int(&SettingKey::EndpointBackoffRetryCount, 4).unwrap();
            cache
                .set_json(
                    &SettingKey::UserData,
                    DynamicJson::parse(r#"{"em": "hash", "tags": [1, 2]}"#).unwrap(),
                )
                .unwrap();
            assert!(cache.synchronize(false));
        }

        let cache = open(&dir);
        assert!(cache.memory().is_empty());
        let loaded = cache.warmup();
        assert_eq!(loaded.as_object().map(|m| m.len()), Some(3));
        assert!(!cache.is_dirty());

        assert_eq!(cache.string(&SettingKey::Domain).as_deref(), Some("example.com"));
        assert_eq!(cache.integer(&SettingKey::EndpointBackoffRetryCount), Some(4));
        let user = cache.json(&SettingKey::UserData).unwrap();
        assert_eq!(user["tags"][1].int_value(), 2);
    }

    #[test]
    fn test_warmup_missing_file() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        let loaded = cache.perform_warmup();
        assert_eq!(loaded, DynamicJson::object());
        assert!(cache.memory().is_empty());
    }

    #[test]
    fn test_warmup_corrupt_or_non_object_blob() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);

        fs::write(blob_path(&dir), b"not json at all").unwrap();
        assert_eq!(cache.warmup(), DynamicJson::object());

        fs::write(blob_path(&dir), b"[1, 2, 3]").unwrap();
        assert_eq!(cache.warmup(), DynamicJson::object());
        assert!(cache.memory().is_empty());
    }

    #[test]
    fn test_warmup_is_idempotent() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("central")).unwrap();
        fs::write(blob_path(&dir), br#"{"a": 1, "b": true}"#).unwrap();

        let cache = open(&dir);
        cache.warmup();
        cache.warmup();
        assert_eq!(cache.memory().len(), 2);
        assert_eq!(cache.dump()["b"], DynamicJson::Bool(true));
    }

    #[test]
    fn test_synchronize_async() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);

        let (tx, rx) = crossbeam::channel::bounded(2);
        let skipped = tx.clone();
        cache.synchronize_async(false, move |written| {
            let _ = skipped.send(written);
        });
        assert!(!rx.recv_timeout(Duration::from_secs(5)).unwrap());

        cache.set_double(&SettingKey::AppInstallTimestamp, 1.5).unwrap();
        cache.synchronize_async(false, move |written| {
            let _ = tx.send(written);
        });
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        assert!(!cache.is_dirty());
        assert!(blob_path(&dir).exists());
    }

    #[test]
    fn test_blocking_synchronize_waits_behind_queued_flush() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        cache.set_int(&SettingKey::Bitmask, 1).unwrap();

        let (release, gate) = crossbeam::channel::bounded::<()>(0);
        cache.sync_queue.dispatch(move || {
            let _ = gate.recv();
        });

        std::thread::scope(|s| {
            let flush = s.spawn(|| cache.synchronize(false));
            std::thread::sleep(Duration::from_millis(50));
            assert!(!blob_path(&dir).exists());

            release.send(()).unwrap();
            assert!(flush.join().unwrap());
        });
        assert!(blob_path(&dir).exists());
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_mixed_flushes_leave_latest_state_on_disk() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);

        for i in 0..20 {
            cache.set_int(&SettingKey::EndpointBackoffRetryCount, i).unwrap();
            if i % 2 == 0 {
                cache.synchronize_async(false, |_| {});
            } else {
                cache.synchronize(false);
            }
        }
        cache.synchronize(true);

        let reopened = open(&dir);
        reopened.warmup();
        assert_eq!(reopened.integer(&SettingKey::EndpointBackoffRetryCount), Some(19));
    }

    #[test]
    fn test_remove_all_objects() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        cache.set_int(&SettingKey::Bitmask, 1).unwrap();
        cache.synchronize(false);

        cache.remove_all_objects().unwrap();
        assert!(cache.is_dirty());
        assert!(cache.synchronize(false));

        let reopened = open(&dir);
        assert_eq!(reopened.warmup(), DynamicJson::object());
    }
}
