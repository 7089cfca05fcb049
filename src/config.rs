//! Configuration
//!
//! ```yaml
//! cache_root: /var/cache/myapp
//! disk_directory: tiercache
//! blob_key: settings
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::disk::{default_root, DiskCacheConfig, DEFAULT_DIRECTORY};
use crate::error::{Error, Result};
use crate::settings::DEFAULT_BLOB_KEY;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierCacheConfig {
    /// Parent directory of the disk tier
    pub cache_root: PathBuf,
    /// Directory of the disk tier under `cache_root`
    pub disk_directory: String,
    /// File name of the central settings blob
    pub blob_key: String,
}

impl Default for TierCacheConfig {
    fn default() -> Self {
        Self {
            cache_root: default_root(),
            disk_directory: DEFAULT_DIRECTORY.to_string(),
            blob_key: DEFAULT_BLOB_KEY.to_string(),
        }
    }
}

impl TierCacheConfig {
    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject names that cannot be used as a single path component
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("disk_directory", &self.disk_directory),
            ("blob_key", &self.blob_key),
        ] {
            if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
                return Err(Error::Config(format!(
                    "{field} must be a plain file name, got {value:?}"
                )));
            }
        }
        Ok(())
    }

    /// Location of the disk tier
    pub fn disk_config(&self) -> DiskCacheConfig {
        DiskCacheConfig::new(&self.cache_root, &self.disk_directory)
    }
}

// =============================================================================
// Tests
// =============================================================================
