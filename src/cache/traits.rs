//! Cache capability sets
//!
//! A tier participates in composition through one or both of:
//!
//! - [`SyncCache`]: blocking calls that return immediately with a result
//! - [`AsyncCache`]: non-blocking calls that report through a completion
//!   invoked exactly once, possibly on another thread
//!
//! Both share their key/value types through [`Tier`], so a type that
//! implements both never has two competing `Key` types.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::error::{CacheError, CacheResult};

/// Boxed one-shot callback
pub type Completion<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Completion for a non-blocking read
pub type GetCompletion<K, V> = Completion<Result<V, CacheError<K>>>;

/// Completion for a non-blocking write, remove or clear
pub type WriteCompletion<K> = Completion<CacheResult<K>>;

/// Key and value types shared by both capability sets
pub trait Tier {
    type Key: Clone + fmt::Debug + Send + Sync + 'static;
    type Value: Clone + Send + 'static;
}

/// Blocking capability set
pub trait SyncCache: Tier + Send + Sync {
    /// Value for `key`, or `None` on a miss
    fn get(&self, key: &Self::Key) -> Option<Self::Value>;

    /// Store `value` under `key`
    fn set(&self, key: Self::Key, value: Self::Value) -> CacheResult<Self::Key>;

    /// Remove the value under `key`
    fn remove(&self, key: &Self::Key) -> CacheResult<Self::Key>;

    /// Remove every value
    fn remove_all(&self) -> CacheResult<Self::Key>;

    /// Subscript-style write: `Some` stores, `None` removes
    fn replace(&self, key: Self::Key, value: Option<Self::Value>) -> CacheResult<Self::Key> {
        match value {
            Some(value) => self.set(key, value),
            None => self.remove(&key),
        }
    }
}

/// Non-blocking capability set
///
/// Each call invokes its completion exactly once.
pub trait AsyncCache: Tier + Send + Sync {
    fn fetch(&self, key: Self::Key, completion: GetCompletion<Self::Key, Self::Value>);

    fn store(&self, key: Self::Key, value: Self::Value, completion: WriteCompletion<Self::Key>);

    fn evict(&self, key: Self::Key, completion: WriteCompletion<Self::Key>);

    fn evict_all(&self, completion: WriteCompletion<Self::Key>);
}

/// Keys that name a file inside a disk tier directory
pub trait StorageKey {
    fn storage_name(&self) -> Cow<'_, str>;
}

impl StorageKey for String {
    fn storage_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl StorageKey for &'static str {
    fn storage_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

// =============================================================================
// Shared handles
// =============================================================================

impl<C: Tier + ?Sized> Tier for Arc<C> {
    type Key = C::Key;
    type Value = C::Value;
}

impl<C: SyncCache + ?Sized> SyncCache for Arc<C> {
    fn get(&self, key: &Self::Key) -> Option<Self::Value> {
        (**self).get(key)
    }

    fn set(&self, key: Self::Key, value: Self::Value) -> CacheResult<Self::Key> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &Self::Key) -> CacheResult<Self::Key> {
        (**self).remove(key)
    }

    fn remove_all(&self) -> CacheResult<Self::Key> {
        (**self).remove_all()
    }
}

impl<C: AsyncCache + ?Sized> AsyncCache for Arc<C> {
    fn fetch(&self, key: Self::Key, completion: GetCompletion<Self::Key, Self::Value>) {
        (**self).fetch(key, completion)
    }

    fn store(&self, key: Self::Key, value: Self::Value, completion: WriteCompletion<Self::Key>) {
        (**self).store(key, value, completion)
    }

    fn evict(&self, key: Self::Key, completion: WriteCompletion<Self::Key>) {
        (**self).evict(key, completion)
    }

    fn evict_all(&self, completion: WriteCompletion<Self::Key>) {
        (**self).evict_all(completion)
    }
}
