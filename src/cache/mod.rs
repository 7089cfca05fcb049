//! Composable Cache Tiers
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              compose / compose_with_async / ...          │
//! │     SyncPair │ MixedPair │ AsyncPair │ ComposableCache   │
//! └───────┬──────────────────────────────────┬───────────────┘
//!         │ SyncCache                        │ AsyncCache
//!         ▼                                  ▼
//! ┌──────────────────┐            ┌──────────────────────────┐
//! │   MemoryCache    │            │        DiskCache         │
//! │  Mutex<HashMap>  │            │ file per key, SerialQueue│
//! └──────────────────┘            └──────────────────────────┘
//! ```
//!
//! Tiers are combined through their capability sets only, never through
//! concrete types.

mod bridge;
pub mod compose;
pub mod disk;
pub mod error;
pub mod memory;
pub mod queue;
pub mod traits;

#[cfg(test)]
mod proptest;

pub(crate) use bridge::{wait_fetch, wait_store};

pub use bridge::CacheFuturesExt;
pub use compose::{
    compose, compose_async, compose_with_async, AsyncPair, ComposableCache, MixedPair, SyncPair,
};
pub use disk::{DiskCache, DiskCacheConfig};
pub use error::{
    first_failure, CacheError, CacheResult, ComposeError, DiskCacheError, ErrorCause,
    CACHE_ERROR_DOMAIN,
};
pub use memory::MemoryCache;
pub use queue::SerialQueue;
pub use traits::{AsyncCache, Completion, GetCompletion, StorageKey, SyncCache, Tier, WriteCompletion};
