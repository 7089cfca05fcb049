//! tiercache Integration Tests
//!
//! End-to-end behaviour through the public API:
//! - Memory tier semantics
//! - Disk tier round trip and corruption handling
//! - Promotion and write short-circuit in composed caches
//! - Central cache dirty tracking, synchronize and warmup
//! - Value model coercion and indexing

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use tiercache::cache::{
    CacheResult, DiskCacheError, GetCompletion, Tier, WriteCompletion,
};
use tiercache::{
    compose, compose_with_async, AsyncCache, CacheError, CacheFuturesExt, CentralCache,
    DiskCache, DiskCacheConfig, DynamicJson, MemoryCache, SettingKey, SyncCache, TypeSafeStore,
};

fn disk<V>(dir: &TempDir, name: &str) -> DiskCache<String, V> {
    DiskCache::new(&DiskCacheConfig::new(dir.path(), name)).unwrap()
}

// =============================================================================
// Memory Tier
// =============================================================================

mod memory_tests {
    use super::*;

    #[test]
    fn test_set_get_remove_remove_all() {
        let cache: MemoryCache<String, DynamicJson> = MemoryCache::new("it");

        for i in 0..20 {
            let key = format!("k{i}");
            cache.set(key.clone(), DynamicJson::from(i)).unwrap();
            assert_eq!(cache.get(&key), Some(DynamicJson::from(i)));
        }

        cache.remove(&"k3".to_string()).unwrap();
        assert_eq!(cache.get(&"k3".to_string()), None);
        assert_eq!(cache.len(), 19);

        cache.remove_all().unwrap();
        assert!(cache.keys().is_empty());
    }
}

// =============================================================================
// Disk Tier
// =============================================================================

mod disk_tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_preserves_structure() {
        let dir = TempDir::new().unwrap();
        let cache = disk::<DynamicJson>(&dir, "round_trip");
        let value = DynamicJson::parse(
            r#"{"name": "x", "n": 3, "f": 0.25, "ok": false, "list": [null, {"deep": [1]}]}"#,
        )
        .unwrap();

        cache.store_async("k".to_string(), value.clone()).await.unwrap();
        assert_eq!(cache.fetch_async("k".to_string()).await.unwrap(), value);
    }

    #[tokio::test]
    async fn test_invalid_bytes_are_decode_failures() {
        let dir = TempDir::new().unwrap();
        let cache = disk::<DynamicJson>(&dir, "corrupt");
        fs::write(cache.directory().join("k"), [0xde, 0xad, 0xbe, 0xef]).unwrap();

        let err = cache.fetch_async("k".to_string()).await.unwrap_err();
        assert!(matches!(err, CacheError::FailToGet { .. }));
        assert!(err.cause().is(DiskCacheError::DecodingFailed));
    }

    #[test]
    fn test_evict_all_with_blocking_runtime() {
        let dir = TempDir::new().unwrap();
        let cache = disk::<i64>(&dir, "clear");

        tokio_test::block_on(async {
            for i in 0..3 {
                cache.store_async(format!("k{i}"), i).await.unwrap();
            }
            cache.evict_all_async().await.unwrap();
            assert!(cache.fetch_async("k0".to_string()).await.is_err());
        });
        assert_eq!(fs::read_dir(cache.directory()).unwrap().count(), 0);
    }
}

// =============================================================================
// Composition
// =============================================================================

mod compose_tests {
    use super::*;

    /// Blocking tier whose writes always fail
    struct FailingNear;

    impl Tier for FailingNear {
        type Key = String;
        type Value = i64;
    }

    impl SyncCache for FailingNear {
        fn get(&self, _key: &String) -> Option<i64> {
            None
        }
        fn set(&self, key: String, _value: i64) -> CacheResult<String> {
            Err(CacheError::set_failed(key, DiskCacheError::WriteDataFailed))
        }
        fn remove(&self, key: &String) -> CacheResult<String> {
            Err(CacheError::remove_failed(key.clone(), DiskCacheError::RemoveItemFailed))
        }
        fn remove_all(&self) -> CacheResult<String> {
            Err(CacheError::remove_all_failed(DiskCacheError::RemoveItemFailed))
        }
    }

    /// Non-blocking tier counting writes
    #[derive(Default)]
    struct CountingFar {
        sets: AtomicUsize,
    }

    impl Tier for CountingFar {
        type Key = String;
        type Value = i64;
    }

    impl AsyncCache for CountingFar {
        fn fetch(&self, key: String, completion: GetCompletion<String, i64>) {
            completion(Err(CacheError::get_failed(key, DiskCacheError::ReadDataFailed)));
        }
        fn store(&self, _key: String, _value: i64, completion: WriteCompletion<String>) {
            self.sets.fetch_add(1, Ordering::SeqCst);
            completion(Ok(()));
        }
        fn evict(&self, _key: String, completion: WriteCompletion<String>) {
            completion(Ok(()));
        }
        fn evict_all(&self, completion: WriteCompletion<String>) {
            completion(Ok(()));
        }
    }

    #[tokio::test]
    async fn test_promotion_from_prepopulated_disk() {
        let dir = TempDir::new().unwrap();
        let far = disk::<i64>(&dir, "far");
        far.store_async("x".to_string(), 42).await.unwrap();

        let near: Arc<MemoryCache<String, i64>> = Arc::new(MemoryCache::new("near"));
        let composed = compose_with_async(Arc::clone(&near), far);

        let read = tokio::task::spawn_blocking(move || SyncCache::get(&composed, &"x".to_string()))
            .await
            .unwrap();
        assert_eq!(read, Some(42));
        assert_eq!(near.get(&"x".to_string()), Some(42));
    }

    #[test]
    fn test_near_failure_never_reaches_far() {
        let far = Arc::new(CountingFar::default());
        let composed = compose_with_async(FailingNear, Arc::clone(&far));

        assert!(SyncCache::set(&composed, "k".to_string(), 1).is_err());
        tokio_test::block_on(async {
            assert!(composed.store_async("k".to_string(), 2).await.is_err());
        });

        assert_eq!(far.sets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sync_pair_attempts_far_even_when_near_fails() {
        let far: Arc<MemoryCache<String, i64>> = Arc::new(MemoryCache::new("far"));
        let composed = compose(FailingNear, Arc::clone(&far));

        let err = composed.set("k".to_string(), 5).unwrap_err();
        assert!(err.cause().is(DiskCacheError::WriteDataFailed));
        assert_eq!(far.get(&"k".to_string()), Some(5));
    }
}

// =============================================================================
// Central Cache
// =============================================================================

mod central_tests {
    use super::*;

    fn open(dir: &TempDir) -> CentralCache {
        CentralCache::new(&DiskCacheConfig::new(dir.path(), "settings_store")).unwrap()
    }

    #[test]
    fn test_dirty_flag_and_write_count() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        let blob = dir.path().join("settings_store").join(cache.blob_key());

        assert!(!cache.is_dirty());
        cache.set_string(&SettingKey::Domain, "example.org").unwrap();
        assert!(cache.is_dirty());

        assert!(cache.synchronize(false));
        assert!(!cache.is_dirty());
        assert!(blob.exists());

        // With no mutation, a second synchronize must not touch the disk
        fs::remove_file(&blob).unwrap();
        assert!(!cache.synchronize(false));
        assert!(!blob.exists());
    }

    #[test]
    fn test_warmup_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);

        assert_eq!(cache.warmup(), DynamicJson::object());
        assert_eq!(cache.memory().len(), 0);
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_settings_survive_restart() {
        let dir = TempDir::new().unwrap();
        {
            let cache = open(&dir);
            cache.set_bool(&SettingKey::IsAutoLogAppEventsEnabled, true).unwrap();
            cache.set_array(&SettingKey::UnsentCrashReports, vec!["a", "b"]).unwrap();
            assert!(cache.synchronize(false));
        }

        let cache = open(&dir);
        cache.warmup();
        assert_eq!(cache.bool(&SettingKey::IsAutoLogAppEventsEnabled), Some(true));
        assert_eq!(
            cache.array::<String>(&SettingKey::UnsentCrashReports),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }
}

// =============================================================================
// Value Model
// =============================================================================

mod value_tests {
    use super::*;

    #[test]
    fn test_coercion_and_indexing() {
        assert!(DynamicJson::from("yes").bool_value());
        assert_eq!(DynamicJson::Null.int_value(), 0);

        let object = DynamicJson::parse(r#"{"a": 1}"#).unwrap();
        assert!(object["missing"].is_null());
        assert!(object["a"]["deeper"][7].is_null());
    }

    #[test]
    fn test_cross_kind_values_differ() {
        assert_ne!(DynamicJson::from(1), DynamicJson::from("1"));
        assert_ne!(DynamicJson::from(true), DynamicJson::from(1));
        assert_ne!(DynamicJson::Null, DynamicJson::from(0));
    }
}
