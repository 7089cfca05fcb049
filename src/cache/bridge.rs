//! Bridges out of callback style
//!
//! - `wait_*` (crate-internal): block the calling thread until a
//!   non-blocking tier completes. Used by the blocking side of mixed
//!   compositions and by the central cache. Never call these from the
//!   tier's own serial queue.
//! - [`CacheFuturesExt`]: `async fn` wrappers for use inside tokio.

use async_trait::async_trait;
use crossbeam::channel;
use tokio::sync::oneshot;

use super::error::{CacheError, CacheResult, ComposeError};
use super::traits::AsyncCache;

pub(crate) fn wait_fetch<C>(cache: &C, key: C::Key) -> Result<C::Value, CacheError<C::Key>>
where
    C: AsyncCache + ?Sized,
{
    let (tx, rx) = channel::bounded(1);
    cache.fetch(
        key.clone(),
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    rx.recv()
        .unwrap_or_else(|_| Err(CacheError::get_failed(key, ComposeError::InternalError)))
}

pub(crate) fn wait_store<C>(cache: &C, key: C::Key, value: C::Value) -> CacheResult<C::Key>
where
    C: AsyncCache + ?Sized,
{
    let (tx, rx) = channel::bounded(1);
    cache.store(
        key.clone(),
        value,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    rx.recv()
        .unwrap_or_else(|_| Err(CacheError::set_failed(key, ComposeError::InternalError)))
}

pub(crate) fn wait_evict<C>(cache: &C, key: C::Key) -> CacheResult<C::Key>
where
    C: AsyncCache + ?Sized,
{
    let (tx, rx) = channel::bounded(1);
    cache.evict(
        key.clone(),
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    rx.recv()
        .unwrap_or_else(|_| Err(CacheError::remove_failed(key, ComposeError::InternalError)))
}

pub(crate) fn wait_evict_all<C>(cache: &C) -> CacheResult<C::Key>
where
    C: AsyncCache + ?Sized,
{
    let (tx, rx) = channel::bounded(1);
    cache.evict_all(Box::new(move |result| {
        let _ = tx.send(result);
    }));
    rx.recv()
        .unwrap_or_else(|_| Err(CacheError::remove_all_failed(ComposeError::InternalError)))
}

/// `async`/`await` access to any [`AsyncCache`]
///
/// A completion that is dropped without being called resolves to
/// [`ComposeError::InternalError`].
#[async_trait]
pub trait CacheFuturesExt: AsyncCache {
    async fn fetch_async(&self, key: Self::Key) -> Result<Self::Value, CacheError<Self::Key>>;

    async fn store_async(&self, key: Self::Key, value: Self::Value) -> CacheResult<Self::Key>;

    async fn evict_async(&self, key: Self::Key) -> CacheResult<Self::Key>;

    async fn evict_all_async(&self) -> CacheResult<Self::Key>;
}

#[async_trait]
impl<C: AsyncCache + ?Sized> CacheFuturesExt for C {
    async fn fetch_async(&self, key: Self::Key) -> Result<Self::Value, CacheError<Self::Key>> {
        let (tx, rx) = oneshot::channel();
        self.fetch(
            key.clone(),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.await
            .unwrap_or_else(|_| Err(CacheError::get_failed(key, ComposeError::InternalError)))
    }

    async fn store_async(&self, key: Self::Key, value: Self::Value) -> CacheResult<Self::Key> {
        let (tx, rx) = oneshot::channel();
        self.store(
            key.clone(),
            value,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.await
            .unwrap_or_else(|_| Err(CacheError::set_failed(key, ComposeError::InternalError)))
    }

    async fn evict_async(&self, key: Self::Key) -> CacheResult<Self::Key> {
        let (tx, rx) = oneshot::channel();
        self.evict(
            key.clone(),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.await
            .unwrap_or_else(|_| Err(CacheError::remove_failed(key, ComposeError::InternalError)))
    }

    async fn evict_all_async(&self) -> CacheResult<Self::Key> {
        let (tx, rx) = oneshot::channel();
        self.evict_all(Box::new(move |result| {
            let _ = tx.send(result);
        }));
        rx.await
            .unwrap_or_else(|_| Err(CacheError::remove_all_failed(ComposeError::InternalError)))
    }
}

// =============================================================================
// Tests
// =============================================================================
