//! Typed accessors over a dynamically-typed store
//!
//! Getters are checked downcasts: a stored value of another kind reads as
//! `None`, never as an error. Dates are stored as floating-point seconds
//! since the Unix epoch.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::{CacheError, MemoryCache, SyncCache};
use crate::json::{DynamicJson, FromDynamic};

/// Result of a typed write
pub type TypedResult = Result<(), TypedWriteError>;

/// Typed write failure
///
/// Equality compares the variant only.
#[derive(Error, Debug, Clone)]
pub enum TypedWriteError {
    /// The underlying tier failed
    #[error("Cache operation failed: {0}")]
    Internal(#[source] CacheError<String>),

    #[error("Key is missing")]
    KeyIsMissing,

    #[error("Type cast failed")]
    TypeCastFailed,
}

impl PartialEq for TypedWriteError {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<CacheError<String>> for TypedWriteError {
    fn from(e: CacheError<String>) -> Self {
        TypedWriteError::Internal(e)
    }
}

/// Named primitive accessors over a store of [`DynamicJson`] values
pub trait TypeSafeStore {
    type Key: ?Sized;

    /// Stored value of any kind
    fn raw_value(&self, key: &Self::Key) -> Option<DynamicJson>;

    fn store_value(&self, key: &Self::Key, value: DynamicJson) -> TypedResult;

    fn remove_object(&self, key: &Self::Key) -> TypedResult;

    fn remove_all_objects(&self) -> TypedResult;

    fn integer(&self, key: &Self::Key) -> Option<i64> {
        self.raw_value(key)?.as_i64()
    }

    /// Any stored number, widened to `f64`
    fn double(&self, key: &Self::Key) -> Option<f64> {
        self.raw_value(key)?.as_f64()
    }

    fn bool(&self, key: &Self::Key) -> Option<bool> {
        self.raw_value(key)?.as_bool()
    }

    fn string(&self, key: &Self::Key) -> Option<String> {
        match self.raw_value(key)? {
            DynamicJson::String(s) => Some(s),
            _ => None,
        }
    }

    fn json(&self, key: &Self::Key) -> Option<DynamicJson> {
        self.raw_value(key)
    }

    fn date(&self, key: &Self::Key) -> Option<DateTime<Utc>> {
        seconds_to_date(self.double(key)?)
    }

    /// Array whose every element converts to `T`
    fn array<T: FromDynamic>(&self, key: &Self::Key) -> Option<Vec<T>> {
        self.raw_value(key)?.extract()
    }

    /// Object whose every member converts to `T`
    fn dictionary<T: FromDynamic>(&self, key: &Self::Key) -> Option<BTreeMap<String, T>> {
        self.raw_value(key)?.extract()
    }

    fn set_int(&self, key: &Self::Key, value: i64) -> TypedResult {
        self.store_value(key, value.into())
    }

    fn set_double(&self, key: &Self::Key, value: f64) -> TypedResult {
        self.store_value(key, value.into())
    }

    fn set_bool(&self, key: &Self::Key, value: bool) -> TypedResult {
        self.store_value(key, value.into())
    }

    fn set_string(&self, key: &Self::Key, value: impl Into<String>) -> TypedResult {
        self.store_value(key, DynamicJson::String(value.into()))
    }

    fn set_json(&self, key: &Self::Key, value: DynamicJson) -> TypedResult {
        self.store_value(key, value)
    }

    fn set_date(&self, key: &Self::Key, value: DateTime<Utc>) -> TypedResult {
        self.set_double(key, date_to_seconds(value))
    }

    fn set_array<T: Into<DynamicJson>>(&self, key: &Self::Key, value: Vec<T>) -> TypedResult {
        self.store_value(key, value.into())
    }

    fn set_dictionary<T: Into<DynamicJson>>(
        &self,
        key: &Self::Key,
        value: BTreeMap<String, T>,
    ) -> TypedResult {
        self.store_value(key, value.into())
    }
}

fn date_to_seconds(date: DateTime<Utc>) -> f64 {
    date.timestamp() as f64 + f64::from(date.timestamp_subsec_nanos()) / 1e9
}

fn seconds_to_date(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

impl TypeSafeStore for MemoryCache<String, DynamicJson> {
    type Key = str;

    fn raw_value(&self, key: &str) -> Option<DynamicJson> {
        self.get(&key.to_owned())
    }

    fn store_value(&self, key: &str, value: DynamicJson) -> TypedResult {
        Ok(self.set(key.to_owned(), value)?)
    }

    fn remove_object(&self, key: &str) -> TypedResult {
        Ok(self.remove(&key.to_owned())?)
    }

    fn remove_all_objects(&self) -> TypedResult {
        Ok(self.remove_all()?)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DiskCacheError;
    use chrono::TimeZone;

    fn store() -> MemoryCache<String, DynamicJson> {
        MemoryCache::new("typed")
    }

    #[test]
    fn test_primitive_round_trips() {
        let store = store();
        store.set_int("i", 42).unwrap();
        store.set_double("d", 2.5).unwrap();
        store.set_bool("b", true).unwrap();
        store.set_string("s", "hello").unwrap();

        assert_eq!(store.integer("i"), Some(42));
        assert_eq!(store.double("d"), Some(2.5));
        assert_eq!(store.bool("b"), Some(true));
        assert_eq!(store.string("s").as_deref(), Some("hello"));
    }

    #[test]
    fn test_mismatch_reads_as_none() {
        let store = store();
        store.set_string("s", "12").unwrap();
        store.set_double("d", 1.5).unwrap();

        assert_eq!(store.integer("s"), None);
        assert_eq!(store.bool("s"), None);
        assert_eq!(store.integer("d"), None);
        assert_eq!(store.string("d"), None);
        assert_eq!(store.integer("missing"), None);
        // json returns whatever is stored
        assert_eq!(store.json("s"), Some(DynamicJson::from("12")));
    }

    #[test]
    fn test_double_widens_integers() {
        let store = store();
        store.set_int("i", 3).unwrap();
        assert_eq!(store.double("i"), Some(3.0));
    }

    #[test]
    fn test_date_stored_as_seconds() {
        let store = store();
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        store.set_date("when", date).unwrap();

        assert_eq!(store.double("when"), Some(date.timestamp() as f64));
        assert_eq!(store.date("when"), Some(date));

        store.set_string("text", "yesterday").unwrap();
        assert_eq!(store.date("text"), None);
    }

    #[test]
    fn test_date_keeps_subseconds() {
        let store = store();
        let date = DateTime::from_timestamp(1_700_000_000, 250_000_000).unwrap();
        store.set_date("when", date).unwrap();
        let read = store.date("when").unwrap();
        assert_eq!(read.timestamp(), date.timestamp());
        assert!((read.timestamp_subsec_millis() as i64 - 250).abs() <= 1);
    }

    #[test]
    fn test_collections() {
        let store = store();
        store.set_array("ids", vec![1, 2, 3]).unwrap();
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), "x");
        map.insert("b".to_string(), "y");
        store.set_dictionary("names", map).unwrap();

        assert_eq!(store.array::<i64>("ids"), Some(vec![1, 2, 3]));
        assert_eq!(store.array::<String>("ids"), None);
        let names = store.dictionary::<String>("names").unwrap();
        assert_eq!(names["b"], "y");
        assert_eq!(store.dictionary::<String>("ids"), None);
    }

    #[test]
    fn test_remove() {
        let store = store();
        store.set_int("a", 1).unwrap();
        store.set_int("b", 2).unwrap();

        store.remove_object("a").unwrap();
        assert_eq!(store.integer("a"), None);
        assert_eq!(store.integer("b"), Some(2));

        store.remove_all_objects().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_error_equality_by_variant() {
        let a = TypedWriteError::Internal(CacheError::set_failed(
            "a".into(),
            DiskCacheError::WriteDataFailed,
        ));
        let b = TypedWriteError::Internal(CacheError::remove_all_failed(
            DiskCacheError::RemoveItemFailed,
        ));
        assert_eq!(a, b);
        assert_ne!(a, TypedWriteError::KeyIsMissing);
        assert_ne!(TypedWriteError::KeyIsMissing, TypedWriteError::TypeCastFailed);
    }
}
