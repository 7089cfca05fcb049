//! Cache Error Taxonomy
//!
//! Every capability call reports failure through [`CacheError`]; success is
//! plain `Ok`. Each failure carries a structured [`ErrorCause`] whose
//! equality ignores the human-readable description.

use std::fmt;

use thiserror::Error;

/// Error domain used for every cause raised by this crate
pub const CACHE_ERROR_DOMAIN: &str = "tiercache.cache";

/// Result of a blocking write/remove operation
pub type CacheResult<K> = Result<(), CacheError<K>>;

/// Structured cause: domain + numeric code + description
#[derive(Debug, Clone)]
pub struct ErrorCause {
    domain: String,
    code: i64,
    description: String,
}

impl ErrorCause {
    pub fn new(domain: impl Into<String>, code: i64, description: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            description: description.into(),
        }
    }

    /// Cause in [`CACHE_ERROR_DOMAIN`]
    pub fn generic(code: i64, description: impl Into<String>) -> Self {
        Self::new(CACHE_ERROR_DOMAIN, code, description)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// True if this cause was built from `kind`
    pub fn is<C: Into<ErrorCause>>(&self, kind: C) -> bool {
        *self == kind.into()
    }
}

impl PartialEq for ErrorCause {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.code == other.code
    }
}

impl Eq for ErrorCause {}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Code: {})", self.description, self.code)
    }
}

/// Per-operation cache failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError<K> {
    #[error("Failed to set value for key: {key}. Underlying error: {cause}")]
    FailToSet { key: K, cause: ErrorCause },

    #[error("Failed to get value for key: {key}. Underlying error: {cause}")]
    FailToGet { key: K, cause: ErrorCause },

    #[error("Failed to remove value for key: {key}. Underlying error: {cause}")]
    FailToRemove { key: K, cause: ErrorCause },

    #[error("Failed to remove all values. Underlying error: {cause}")]
    FailToRemoveAll { cause: ErrorCause },
}

impl<K> CacheError<K> {
    pub fn set_failed(key: K, cause: impl Into<ErrorCause>) -> Self {
        CacheError::FailToSet {
            key,
            cause: cause.into(),
        }
    }

    pub fn get_failed(key: K, cause: impl Into<ErrorCause>) -> Self {
        CacheError::FailToGet {
            key,
            cause: cause.into(),
        }
    }

    pub fn remove_failed(key: K, cause: impl Into<ErrorCause>) -> Self {
        CacheError::FailToRemove {
            key,
            cause: cause.into(),
        }
    }

    pub fn remove_all_failed(cause: impl Into<ErrorCause>) -> Self {
        CacheError::FailToRemoveAll {
            cause: cause.into(),
        }
    }

    /// Key the failure relates to, if any
    pub fn key(&self) -> Option<&K> {
        match self {
            CacheError::FailToSet { key, .. }
            | CacheError::FailToGet { key, .. }
            | CacheError::FailToRemove { key, .. } => Some(key),
            CacheError::FailToRemoveAll { .. } => None,
        }
    }

    pub fn cause(&self) -> &ErrorCause {
        match self {
            CacheError::FailToSet { cause, .. }
            | CacheError::FailToGet { cause, .. }
            | CacheError::FailToRemove { cause, .. }
            | CacheError::FailToRemoveAll { cause } => cause,
        }
    }

    /// Re-key the error, e.g. when a typed key wraps a string key
    pub fn map_key<K2>(self, f: impl FnOnce(K) -> K2) -> CacheError<K2> {
        match self {
            CacheError::FailToSet { key, cause } => CacheError::FailToSet { key: f(key), cause },
            CacheError::FailToGet { key, cause } => CacheError::FailToGet { key: f(key), cause },
            CacheError::FailToRemove { key, cause } => {
                CacheError::FailToRemove { key: f(key), cause }
            }
            CacheError::FailToRemoveAll { cause } => CacheError::FailToRemoveAll { cause },
        }
    }
}

/// Combine two tier results, nearest failure first.
///
/// Returns `near` if it failed, otherwise `far`.
pub fn first_failure<K>(near: CacheResult<K>, far: CacheResult<K>) -> CacheResult<K> {
    near.and(far)
}

// =============================================================================
// Disk tier causes
// =============================================================================

/// Causes raised by the disk tier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum DiskCacheError {
    #[error("Failed to encode data.")]
    EncodingFailed = 200,
    #[error("Failed to decode data.")]
    DecodingFailed = 201,
    #[error("File URL is not valid.")]
    FileUrlNotValid = 202,
    #[error("Failed to write data.")]
    WriteDataFailed = 203,
    #[error("Failed to read data.")]
    ReadDataFailed = 204,
    #[error("An internal error occurred.")]
    InternalError = 205,
    #[error("Failed to remove item.")]
    RemoveItemFailed = 206,
}

impl DiskCacheError {
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Cause with the underlying failure appended to the description
    pub fn with_detail(self, detail: impl fmt::Display) -> ErrorCause {
        ErrorCause::generic(self.code(), format!("{} {}", self, detail))
    }
}

impl From<DiskCacheError> for ErrorCause {
    fn from(kind: DiskCacheError) -> Self {
        ErrorCause::generic(kind.code(), kind.to_string())
    }
}

// =============================================================================
// Composition causes
// =============================================================================

/// Causes raised by a misconfigured combinator
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum ComposeError {
    #[error("Missing synchronous implementation.")]
    MissingSyncImpl = 500,
    #[error("Missing asynchronous implementation.")]
    MissingAsyncImpl = 501,
    #[error("An internal error occurred.")]
    InternalError = 502,
}

impl ComposeError {
    pub fn code(self) -> i64 {
        self as i64
    }
}

impl From<ComposeError> for ErrorCause {
    fn from(kind: ComposeError) -> Self {
        ErrorCause::generic(kind.code(), kind.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
