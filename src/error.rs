//! Error types for tiercache
//!
//! Cache operations report through [`crate::cache::CacheError`]; this type
//! covers everything around them (configuration, I/O, the CLI).

use thiserror::Error;

use crate::settings::TypedWriteError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the cache algebra
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key name is not a known setting
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// A typed cache write failed
    #[error(transparent)]
    Cache(#[from] TypedWriteError),
}
