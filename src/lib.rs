//! tiercache - Composable Multi-Tier Key-Value Cache
//!
//! Memory and disk tiers that combine into new caches with read-through
//! promotion and write fan-out, a tagged JSON value model used as the
//! durable format, and a dirty-tracked settings store persisted as one
//! blob.
//!
//! # Architecture
//!
//! ```text
//! typed callers ─▶ TypeSafeStore ─▶ CentralCache ─┬─▶ MemoryCache (reads)
//!                                                 └─▶ DiskCache   (one blob)
//!
//! compose(near, far) ─▶ SyncPair | MixedPair | AsyncPair ─▶ any tiers
//! ```
//!
//! # Modules
//!
//! - [`json`] - `DynamicJson` tagged value model
//! - [`cache`] - capability traits, tiers and the composition algebra
//! - [`settings`] - typed accessors and the central settings cache
//! - [`provider`] - composition root owning the shared caches
//! - [`config`] - YAML configuration
//! - [`perf`] - timing helper
//! - [`error`] - Error types

pub mod cache;
pub mod config;
pub mod error;
pub mod json;
pub mod perf;
pub mod provider;
pub mod settings;

// Re-export commonly used types
pub use cache::{
    compose, compose_async, compose_with_async, AsyncCache, CacheError, CacheFuturesExt,
    ComposableCache, DiskCache, DiskCacheConfig, MemoryCache, SyncCache,
};
pub use config::TierCacheConfig;
pub use error::{Error, Result};
pub use json::{DynamicJson, JsonKind, Number};
pub use provider::CacheProvider;
pub use settings::{CentralCache, MemoryKey, SettingKey, TypeSafeStore, TypedWriteError};
