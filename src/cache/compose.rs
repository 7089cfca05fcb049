//! Composition Algebra
//!
//! Combinators that build a new cache out of a near tier and a far tier
//! with identical key/value types. A composed cache owns no data; it only
//! holds shared handles to its tiers.
//!
//! ```text
//!              get                          set / remove / remove_all
//!   near ──hit──────────▶ value        near ──────────────┐
//!     │ miss                             │                │
//!     ▼                                  ▼                ▼
//!   far ──hit──▶ promote into near     far        first failure wins
//! ```
//!
//! | Pair | Capability | Writes |
//! |------|------------|--------|
//! | [`SyncPair`] | sync + async | both tiers always attempted |
//! | [`MixedPair`] | sync + async | far skipped if near fails |
//! | [`AsyncPair`] | async | far skipped if near fails |
//!
//! Promotion failures are logged and swallowed. Every pair is itself a
//! cache, so longer chains are built by composing again; each step keeps
//! the near-consumes-from-far direction.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::bridge;
use super::error::{first_failure, CacheError, CacheResult, ComposeError};
use super::traits::{AsyncCache, GetCompletion, SyncCache, Tier, WriteCompletion};

/// Compose two blocking tiers
pub fn compose<A, B>(near: A, far: B) -> SyncPair<A, B>
where
    A: SyncCache,
    B: SyncCache<Key = A::Key, Value = A::Value>,
{
    SyncPair {
        near: Arc::new(near),
        far: Arc::new(far),
    }
}

/// Compose a blocking near tier with a non-blocking far tier
pub fn compose_with_async<A, B>(near: A, far: B) -> MixedPair<A, B>
where
    A: SyncCache,
    B: AsyncCache<Key = A::Key, Value = A::Value>,
{
    MixedPair {
        near: Arc::new(near),
        far: Arc::new(far),
    }
}

/// Compose two non-blocking tiers
pub fn compose_async<A, B>(near: A, far: B) -> AsyncPair<A, B>
where
    A: AsyncCache,
    B: AsyncCache<Key = A::Key, Value = A::Value>,
{
    AsyncPair {
        near: Arc::new(near),
        far: Arc::new(far),
    }
}

fn log_promotion<K: fmt::Debug>(result: CacheResult<K>) {
    if let Err(e) = result {
        warn!(error = ?e, "Promotion into near tier failed");
    }
}

// =============================================================================
// Sync + Sync
// =============================================================================

/// Two blocking tiers
pub struct SyncPair<A, B> {
    near: Arc<A>,
    far: Arc<B>,
}

impl<A, B> Clone for SyncPair<A, B> {
    fn clone(&self) -> Self {
        Self {
            near: Arc::clone(&self.near),
            far: Arc::clone(&self.far),
        }
    }
}

impl<A, B> Tier for SyncPair<A, B>
where
    A: SyncCache,
    B: SyncCache<Key = A::Key, Value = A::Value>,
{
    type Key = A::Key;
    type Value = A::Value;
}

impl<A, B> SyncCache for SyncPair<A, B>
where
    A: SyncCache,
    B: SyncCache<Key = A::Key, Value = A::Value>,
{
    fn get(&self, key: &Self::Key) -> Option<Self::Value> {
        if let Some(value) = self.near.get(key) {
            return Some(value);
        }
        let value = self.far.get(key)?;
        debug!(?key, "Promoting far hit");
        log_promotion(self.near.set(key.clone(), value.clone()));
        Some(value)
    }

    fn set(&self, key: Self::Key, value: Self::Value) -> CacheResult<Self::Key> {
        let near = self.near.set(key.clone(), value.clone());
        let far = self.far.set(key, value);
        first_failure(near, far)
    }

    fn remove(&self, key: &Self::Key) -> CacheResult<Self::Key> {
        let near = self.near.remove(key);
        let far = self.far.remove(key);
        first_failure(near, far)
    }

    fn remove_all(&self) -> CacheResult<Self::Key> {
        let near = self.near.remove_all();
        let far = self.far.remove_all();
        first_failure(near, far)
    }
}

impl<A, B> AsyncCache for SyncPair<A, B>
where
    A: SyncCache,
    B: SyncCache<Key = A::Key, Value = A::Value>,
{
    fn fetch(&self, key: Self::Key, completion: GetCompletion<Self::Key, Self::Value>) {
        match SyncCache::get(self, &key) {
            Some(value) => completion(Ok(value)),
            None => completion(Err(CacheError::get_failed(key, ComposeError::InternalError))),
        }
    }

    fn store(&self, key: Self::Key, value: Self::Value, completion: WriteCompletion<Self::Key>) {
        completion(SyncCache::set(self, key, value));
    }

    fn evict(&self, key: Self::Key, completion: WriteCompletion<Self::Key>) {
        completion(SyncCache::remove(self, &key));
    }

    fn evict_all(&self, completion: WriteCompletion<Self::Key>) {
        completion(SyncCache::remove_all(self));
    }
}

// =============================================================================
// Sync + Async
// =============================================================================

/// Blocking near tier in front of a non-blocking far tier.
///
/// The blocking capability set waits for the far tier, so it must not be
/// called from the far tier's own queue.
pub struct MixedPair<A, B> {
    near: Arc<A>,
    far: Arc<B>,
}

impl<A, B> Clone for MixedPair<A, B> {
    fn clone(&self) -> Self {
        Self {
            near: Arc::clone(&self.near),
            far: Arc::clone(&self.far),
        }
    }
}

impl<A, B> Tier for MixedPair<A, B>
where
    A: SyncCache,
    B: AsyncCache<Key = A::Key, Value = A::Value>,
{
    type Key = A::Key;
    type Value = A::Value;
}

impl<A, B> SyncCache for MixedPair<A, B>
where
    A: SyncCache,
    B: AsyncCache<Key = A::Key, Value = A::Value>,
{
    fn get(&self, key: &Self::Key) -> Option<Self::Value> {
        if let Some(value) = self.near.get(key) {
            return Some(value);
        }
        match bridge::wait_fetch(&*self.far, key.clone()) {
            Ok(value) => {
                debug!(?key, "Promoting far hit");
                log_promotion(self.near.set(key.clone(), value.clone()));
                Some(value)
            }
            Err(e) => {
                debug!(?key, error = ?e, "Miss in both tiers");
                None
            }
        }
    }

    fn set(&self, key: Self::Key, value: Self::Value) -> CacheResult<Self::Key> {
        self.near.set(key.clone(), value.clone())?;
        bridge::wait_store(&*self.far, key, value)
    }

    fn remove(&self, key: &Self::Key) -> CacheResult<Self::Key> {
        self.near.remove(key)?;
        bridge::wait_evict(&*self.far, key.clone())
    }

    fn remove_all(&self) -> CacheResult<Self::Key> {
        self.near.remove_all()?;
        bridge::wait_evict_all(&*self.far)
    }
}

impl<A, B> AsyncCache for MixedPair<A, B>
where
    A: SyncCache + 'static,
    B: AsyncCache<Key = A::Key, Value = A::Value>,
{
    fn fetch(&self, key: Self::Key, completion: GetCompletion<Self::Key, Self::Value>) {
        if let Some(value) = self.near.get(&key) {
            completion(Ok(value));
            return;
        }
        let near = Arc::clone(&self.near);
        self.far.fetch(
            key.clone(),
            Box::new(move |result| {
                if let Ok(value) = &result {
                    debug!(?key, "Promoting far hit");
                    log_promotion(near.set(key, value.clone()));
                }
                completion(result);
            }),
        );
    }

    fn store(&self, key: Self::Key, value: Self::Value, completion: WriteCompletion<Self::Key>) {
        match self.near.set(key.clone(), value.clone()) {
            Ok(()) => self.far.store(key, value, completion),
            Err(e) => completion(Err(e)),
        }
    }

    fn evict(&self, key: Self::Key, completion: WriteCompletion<Self::Key>) {
        match self.near.remove(&key) {
            Ok(()) => self.far.evict(key, completion),
            Err(e) => completion(Err(e)),
        }
    }

    fn evict_all(&self, completion: WriteCompletion<Self::Key>) {
        match self.near.remove_all() {
            Ok(()) => self.far.evict_all(completion),
            Err(e) => completion(Err(e)),
        }
    }
}

// =============================================================================
// Async + Async
// =============================================================================

/// Two non-blocking tiers; only the non-blocking capability set exists
pub struct AsyncPair<A, B> {
    near: Arc<A>,
    far: Arc<B>,
}

impl<A, B> Clone for AsyncPair<A, B> {
    fn clone(&self) -> Self {
        Self {
            near: Arc::clone(&self.near),
            far: Arc::clone(&self.far),
        }
    }
}

impl<A, B> Tier for AsyncPair<A, B>
where
    A: AsyncCache,
    B: AsyncCache<Key = A::Key, Value = A::Value>,
{
    type Key = A::Key;
    type Value = A::Value;
}

impl<A, B> AsyncCache for AsyncPair<A, B>
where
    A: AsyncCache + 'static,
    B: AsyncCache<Key = A::Key, Value = A::Value> + 'static,
{
    fn fetch(&self, key: Self::Key, completion: GetCompletion<Self::Key, Self::Value>) {
        let near = Arc::clone(&self.near);
        let far = Arc::clone(&self.far);
        self.near.fetch(
            key.clone(),
            Box::new(move |result| match result {
                Ok(value) => completion(Ok(value)),
                Err(_) => far.fetch(
                    key.clone(),
                    Box::new(move |result| {
                        if let Ok(value) = &result {
                            debug!(?key, "Promoting far hit");
                            near.store(key, value.clone(), Box::new(log_promotion::<A::Key>));
                        }
                        completion(result);
                    }),
                ),
            }),
        );
    }

    fn store(&self, key: Self::Key, value: Self::Value, completion: WriteCompletion<Self::Key>) {
        let far = Arc::clone(&self.far);
        self.near.store(
            key.clone(),
            value.clone(),
            Box::new(move |result| match result {
                Ok(()) => far.store(key, value, completion),
                Err(e) => completion(Err(e)),
            }),
        );
    }

    fn evict(&self, key: Self::Key, completion: WriteCompletion<Self::Key>) {
        let far = Arc::clone(&self.far);
        self.near.evict(
            key.clone(),
            Box::new(move |result| match result {
                Ok(()) => far.evict(key, completion),
                Err(e) => completion(Err(e)),
            }),
        );
    }

    fn evict_all(&self, completion: WriteCompletion<Self::Key>) {
        let far = Arc::clone(&self.far);
        self.near.evict_all(Box::new(move |result| match result {
            Ok(()) => far.evict_all(completion),
            Err(e) => completion(Err(e)),
        }));
    }
}

// =============================================================================
// Type-erased cache
// =============================================================================

type SyncGetFn<K, V> = Arc<dyn Fn(&K) -> Option<V> + Send + Sync>;
type SyncSetFn<K, V> = Arc<dyn Fn(K, V) -> CacheResult<K> + Send + Sync>;
type SyncRemoveFn<K> = Arc<dyn Fn(&K) -> CacheResult<K> + Send + Sync>;
type SyncRemoveAllFn<K> = Arc<dyn Fn() -> CacheResult<K> + Send + Sync>;
type AsyncGetFn<K, V> = Arc<dyn Fn(K, GetCompletion<K, V>) + Send + Sync>;
type AsyncSetFn<K, V> = Arc<dyn Fn(K, V, WriteCompletion<K>) + Send + Sync>;
type AsyncRemoveFn<K> = Arc<dyn Fn(K, WriteCompletion<K>) + Send + Sync>;
type AsyncRemoveAllFn<K> = Arc<dyn Fn(WriteCompletion<K>) + Send + Sync>;

/// Cache assembled from optional operation slots.
///
/// Erases the concrete tier types of a composition. A slot that was never
/// wired fails with [`ComposeError::MissingSyncImpl`] or
/// [`ComposeError::MissingAsyncImpl`]; a blocking `get` on an unwired slot
/// is a miss.
pub struct ComposableCache<K, V> {
    sync_get: Option<SyncGetFn<K, V>>,
    sync_set: Option<SyncSetFn<K, V>>,
    sync_remove: Option<SyncRemoveFn<K>>,
    sync_remove_all: Option<SyncRemoveAllFn<K>>,
    async_get: Option<AsyncGetFn<K, V>>,
    async_set: Option<AsyncSetFn<K, V>>,
    async_remove: Option<AsyncRemoveFn<K>>,
    async_remove_all: Option<AsyncRemoveAllFn<K>>,
}

impl<K, V> ComposableCache<K, V>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    /// Cache with every slot unwired
    pub fn new() -> Self {
        Self {
            sync_get: None,
            sync_set: None,
            sync_remove: None,
            sync_remove_all: None,
            async_get: None,
            async_set: None,
            async_remove: None,
            async_remove_all: None,
        }
    }

    /// Wire the blocking slots to `cache`
    pub fn from_sync<C>(cache: C) -> Self
    where
        C: SyncCache<Key = K, Value = V> + 'static,
    {
        Self::new().with_sync(Arc::new(cache))
    }

    /// Wire the non-blocking slots to `cache`
    pub fn from_async<C>(cache: C) -> Self
    where
        C: AsyncCache<Key = K, Value = V> + 'static,
    {
        Self::new().with_async(Arc::new(cache))
    }

    /// Wire every slot to `cache`
    pub fn from_dual<C>(cache: C) -> Self
    where
        C: SyncCache<Key = K, Value = V> + AsyncCache<Key = K, Value = V> + 'static,
    {
        let cache = Arc::new(cache);
        Self::new().with_sync(Arc::clone(&cache)).with_async(cache)
    }

    fn with_sync<C>(self, cache: Arc<C>) -> Self
    where
        C: SyncCache<Key = K, Value = V> + 'static,
    {
        let get = Arc::clone(&cache);
        let set = Arc::clone(&cache);
        let remove = Arc::clone(&cache);
        self.with_sync_get(move |key| get.get(key))
            .with_sync_set(move |key, value| set.set(key, value))
            .with_sync_remove(move |key| remove.remove(key))
            .with_sync_remove_all(move || cache.remove_all())
    }

    fn with_async<C>(self, cache: Arc<C>) -> Self
    where
        C: AsyncCache<Key = K, Value = V> + 'static,
    {
        let get = Arc::clone(&cache);
        let set = Arc::clone(&cache);
        let remove = Arc::clone(&cache);
        self.with_async_get(move |key, completion| get.fetch(key, completion))
            .with_async_set(move |key, value, completion| set.store(key, value, completion))
            .with_async_remove(move |key, completion| remove.evict(key, completion))
            .with_async_remove_all(move |completion| cache.evict_all(completion))
    }

    pub fn with_sync_get(mut self, f: impl Fn(&K) -> Option<V> + Send + Sync + 'static) -> Self {
        self.sync_get = Some(Arc::new(f));
        self
    }

    pub fn with_sync_set(
        mut self,
        f: impl Fn(K, V) -> CacheResult<K> + Send + Sync + 'static,
    ) -> Self {
        self.sync_set = Some(Arc::new(f));
        self
    }

    pub fn with_sync_remove(
        mut self,
        f: impl Fn(&K) -> CacheResult<K> + Send + Sync + 'static,
    ) -> Self {
        self.sync_remove = Some(Arc::new(f));
        self
    }

    pub fn with_sync_remove_all(
        mut self,
        f: impl Fn() -> CacheResult<K> + Send + Sync + 'static,
    ) -> Self {
        self.sync_remove_all = Some(Arc::new(f));
        self
    }

    pub fn with_async_get(
        mut self,
        f: impl Fn(K, GetCompletion<K, V>) + Send + Sync + 'static,
    ) -> Self {
        self.async_get = Some(Arc::new(f));
        self
    }

    pub fn with_async_set(
        mut self,
        f: impl Fn(K, V, WriteCompletion<K>) + Send + Sync + 'static,
    ) -> Self {
        self.async_set = Some(Arc::new(f));
        self
    }

    pub fn with_async_remove(
        mut self,
        f: impl Fn(K, WriteCompletion<K>) + Send + Sync + 'static,
    ) -> Self {
        self.async_remove = Some(Arc::new(f));
        self
    }

    pub fn with_async_remove_all(
        mut self,
        f: impl Fn(WriteCompletion<K>) + Send + Sync + 'static,
    ) -> Self {
        self.async_remove_all = Some(Arc::new(f));
        self
    }

    pub fn has_sync(&self) -> bool {
        self.sync_get.is_some()
    }

    pub fn has_async(&self) -> bool {
        self.async_get.is_some()
    }
}

impl<K, V> Default for ComposableCache<K, V>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for ComposableCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            sync_get: self.sync_get.clone(),
            sync_set: self.sync_set.clone(),
            sync_remove: self.sync_remove.clone(),
            sync_remove_all: self.sync_remove_all.clone(),
            async_get: self.async_get.clone(),
            async_set: self.async_set.clone(),
            async_remove: self.async_remove.clone(),
            async_remove_all: self.async_remove_all.clone(),
        }
    }
}

impl<K, V> Tier for ComposableCache<K, V>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    type Key = K;
    type Value = V;
}

impl<K, V> SyncCache for ComposableCache<K, V>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        match &self.sync_get {
            Some(f) => f(key),
            None => {
                warn!(?key, "Blocking get on a cache without blocking slots");
                None
            }
        }
    }

    fn set(&self, key: K, value: V) -> CacheResult<K> {
        match &self.sync_set {
            Some(f) => f(key, value),
            None => Err(CacheError::set_failed(key, ComposeError::MissingSyncImpl)),
        }
    }

    fn remove(&self, key: &K) -> CacheResult<K> {
        match &self.sync_remove {
            Some(f) => f(key),
            None => Err(CacheError::remove_failed(key.clone(), ComposeError::MissingSyncImpl)),
        }
    }

    fn remove_all(&self) -> CacheResult<K> {
        match &self.sync_remove_all {
            Some(f) => f(),
            None => Err(CacheError::remove_all_failed(ComposeError::MissingSyncImpl)),
        }
    }
}

impl<K, V> AsyncCache for ComposableCache<K, V>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    fn fetch(&self, key: K, completion: GetCompletion<K, V>) {
        match &self.async_get {
            Some(f) => f(key, completion),
            None => completion(Err(CacheError::get_failed(key, ComposeError::MissingAsyncImpl))),
        }
    }

    fn store(&self, key: K, value: V, completion: WriteCompletion<K>) {
        match &self.async_set {
            Some(f) => f(key, value, completion),
            None => completion(Err(CacheError::set_failed(key, ComposeError::MissingAsyncImpl))),
        }
    }

    fn evict(&self, key: K, completion: WriteCompletion<K>) {
        match &self.async_remove {
            Some(f) => f(key, completion),
            None => completion(Err(CacheError::remove_failed(
                key,
                ComposeError::MissingAsyncImpl,
            ))),
        }
    }

    fn evict_all(&self, completion: WriteCompletion<K>) {
        match &self.async_remove_all {
            Some(f) => f(completion),
            None => completion(Err(CacheError::remove_all_failed(
                ComposeError::MissingAsyncImpl,
            ))),
        }
    }
}

impl<K, V> fmt::Debug for ComposableCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposableCache")
            .field("sync", &self.sync_get.is_some())
            .field("async", &self.async_get.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
