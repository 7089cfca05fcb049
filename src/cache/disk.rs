//! Disk Tier
//!
//! One JSON file per key inside a dedicated directory.
//!
//! # Design
//!
//! - Every operation of an instance runs on its own [`SerialQueue`], so two
//!   operations never touch the directory concurrently.
//! - Only the non-blocking capability set is exposed; completions run on
//!   the queue thread.
//! - Codec failures (`EncodingFailed`/`DecodingFailed`) are reported apart
//!   from storage failures (`WriteDataFailed`/`ReadDataFailed`).
//! - `evict_all` deletes entries one by one and stops at the first failure,
//!   leaving the remaining files in place.

use std::fmt;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::error::{CacheError, DiskCacheError, ErrorCause};
use super::queue::SerialQueue;
use super::traits::{AsyncCache, GetCompletion, StorageKey, Tier, WriteCompletion};

/// Default directory name under the cache root
pub const DEFAULT_DIRECTORY: &str = "tiercache";

/// Disk tier location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskCacheConfig {
    /// Parent directory, normally the platform cache directory
    pub root: PathBuf,
    /// Directory created under `root` for this tier
    pub directory: String,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            directory: DEFAULT_DIRECTORY.to_string(),
        }
    }
}

impl DiskCacheConfig {
    pub fn new(root: impl Into<PathBuf>, directory: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            directory: directory.into(),
        }
    }

    /// Full path of the tier directory
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.directory)
    }
}

/// Platform cache directory, or the temp dir when there is none
pub fn default_root() -> PathBuf {
    dirs::cache_dir().unwrap_or_else(std::env::temp_dir)
}

// =============================================================================
// File store
// =============================================================================

/// Deletes one directory entry during `clear`
type EntryRemover = fn(&Path) -> io::Result<()>;

fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

struct DiskStore {
    directory: PathBuf,
    remove_entry: EntryRemover,
}

impl DiskStore {
    fn file_for(&self, name: &str) -> Result<PathBuf, ErrorCause> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if invalid {
            error!(name, "Key is not a valid file name");
            return Err(DiskCacheError::FileUrlNotValid.with_detail(format!("({name:?})")));
        }
        Ok(self.directory.join(name))
    }

    fn read<V: DeserializeOwned>(&self, name: &str) -> Result<V, ErrorCause> {
        let path = self.file_for(name)?;
        let bytes = fs::read(&path).map_err(|e| DiskCacheError::ReadDataFailed.with_detail(e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Stored value could not be decoded");
            DiskCacheError::DecodingFailed.with_detail(e)
        })
    }

    fn write<V: Serialize>(&self, name: &str, value: &V) -> Result<(), ErrorCause> {
        let path = self.file_for(name)?;
        let bytes =
            serde_json::to_vec(value).map_err(|e| DiskCacheError::EncodingFailed.with_detail(e))?;
        fs::create_dir_all(&self.directory)
            .and_then(|()| fs::write(&path, bytes))
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "Write failed");
                DiskCacheError::WriteDataFailed.with_detail(e)
            })
    }

    fn remove(&self, name: &str) -> Result<(), ErrorCause> {
        let path = self.file_for(name)?;
        fs::remove_file(&path).map_err(|e| DiskCacheError::RemoveItemFailed.with_detail(e))
    }

    fn clear(&self) -> Result<(), ErrorCause> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                error!(directory = %self.directory.display(), error = %e, "Listing directory failed");
                return Err(DiskCacheError::ReadDataFailed.with_detail(e));
            }
        };

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| DiskCacheError::ReadDataFailed.with_detail(e))?;
        paths.sort();

        for path in paths {
            if let Err(e) = (self.remove_entry)(&path) {
                warn!(path = %path.display(), error = %e, "Stopping clear at first failure");
                return Err(DiskCacheError::RemoveItemFailed.with_detail(e));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Disk cache
// =============================================================================

/// Persistent tier storing one file per key
pub struct DiskCache<K, V> {
    store: Arc<DiskStore>,
    queue: SerialQueue,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V> {
    /// Open (and create if needed) the tier directory.
    ///
    /// A directory that cannot be created is logged, not fatal: every
    /// later operation reports its own failure.
    pub fn new(config: &DiskCacheConfig) -> crate::Result<Self> {
        Self::with_remover(config, remove_entry)
    }

    fn with_remover(config: &DiskCacheConfig, remove_entry: EntryRemover) -> crate::Result<Self> {
        let directory = config.path();
        if let Err(e) = fs::create_dir_all(&directory) {
            error!(directory = %directory.display(), error = %e, "Creating disk cache directory failed");
        }
        let queue = SerialQueue::new(format!("tiercache.disk.{}", config.directory))?;
        debug!(directory = %directory.display(), "Disk cache opened");

        Ok(Self {
            store: Arc::new(DiskStore {
                directory,
                remove_entry,
            }),
            queue,
            _types: PhantomData,
        })
    }

    /// Directory holding this tier's files
    pub fn directory(&self) -> &Path {
        &self.store.directory
    }
}

impl<K, V> Tier for DiskCache<K, V>
where
    K: StorageKey + Clone + fmt::Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    type Key = K;
    type Value = V;
}

impl<K, V> AsyncCache for DiskCache<K, V>
where
    K: StorageKey + Clone + fmt::Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    fn fetch(&self, key: K, completion: GetCompletion<K, V>) {
        let store = Arc::clone(&self.store);
        self.queue.dispatch(move || {
            let name = key.storage_name().into_owned();
            let result = store.read::<V>(&name).map_err(|cause| {
                debug!(?key, %cause, "Disk get failed");
                CacheError::get_failed(key, cause)
            });
            completion(result);
        });
    }

    fn store(&self, key: K, value: V, completion: WriteCompletion<K>) {
        let store = Arc::clone(&self.store);
        self.queue.dispatch(move || {
            let name = key.storage_name().into_owned();
            let result = store
                .write(&name, &value)
                .map_err(|cause| CacheError::set_failed(key, cause));
            completion(result);
        });
    }

    fn evict(&self, key: K, completion: WriteCompletion<K>) {
        let store = Arc::clone(&self.store);
        self.queue.dispatch(move || {
            let name = key.storage_name().into_owned();
            let result = store
                .remove(&name)
                .map_err(|cause| CacheError::remove_failed(key, cause));
            completion(result);
        });
    }

    fn evict_all(&self, completion: WriteCompletion<K>) {
        let store = Arc::clone(&self.store);
        self.queue.dispatch(move || {
            completion(store.clear().map_err(CacheError::remove_all_failed));
        });
    }
}

impl<K, V> fmt::Debug for DiskCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskCache")
            .field("directory", &self.store.directory)
            .field("queue", &self.queue)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
