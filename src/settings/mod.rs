//! Settings Layer
//!
//! Typed access on top of the dynamic value model, and the central cache
//! that persists every setting as one blob.
//!
//! - [`typed`] - named primitive accessors ([`TypeSafeStore`])
//! - [`keys`] - well-known key names
//! - [`central`] - memory + disk settings store with dirty tracking

pub mod central;
pub mod keys;
pub mod typed;

pub use central::{CentralCache, DEFAULT_BLOB_KEY};
pub use keys::{MemoryKey, SettingKey};
pub use typed::{TypeSafeStore, TypedResult, TypedWriteError};
