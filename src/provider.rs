//! Cache Provider
//!
//! Composition root owning the process-lifetime caches. Build one at
//! startup and pass it (or the `Arc`s it hands out) to whoever needs a
//! cache; there is no ambient global instance.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::MemoryCache;
use crate::config::TierCacheConfig;
use crate::error::Result;
use crate::json::DynamicJson;
use crate::settings::CentralCache;

/// Shared memory cache for ephemeral values keyed by name
pub type SharedMemory = MemoryCache<String, DynamicJson>;

/// Owner of the shared memory cache and the central settings cache
#[derive(Debug, Clone)]
pub struct CacheProvider {
    memory: Arc<SharedMemory>,
    central: Arc<CentralCache>,
}

impl CacheProvider {
    pub fn new(config: &TierCacheConfig) -> Result<Self> {
        config.validate()?;
        let central = CentralCache::with_blob_key(&config.disk_config(), config.blob_key.clone())?;
        info!(
            directory = %config.disk_config().path().display(),
            blob_key = %config.blob_key,
            "Cache provider ready"
        );
        Ok(Self {
            memory: Arc::new(MemoryCache::new("shared")),
            central: Arc::new(central),
        })
    }

    /// Ephemeral, never-persisted values
    pub fn memory(&self) -> &Arc<SharedMemory> {
        &self.memory
    }

    /// Persisted settings
    pub fn central(&self) -> &Arc<CentralCache> {
        &self.central
    }

    /// Load persisted settings into memory
    pub fn warmup(&self) -> DynamicJson {
        self.central.perform_warmup()
    }

    /// Schedule a flush of the central cache without waiting for it
    pub fn synchronize(&self, force: bool) {
        self.central.synchronize_async(force, |written| {
            if written {
                debug!("Background cache sync wrote settings");
            } else {
                warn!("Background cache sync did not write settings");
            }
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
