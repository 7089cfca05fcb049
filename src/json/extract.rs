//! Typed extraction out of [`DynamicJson`]
//!
//! [`FromDynamic`] is a checked downcast: it returns `None` on any tag
//! mismatch instead of coercing. Collections convert all-or-nothing; use
//! [`DynamicJson::unwrap_array`] / [`DynamicJson::unwrap_object`] to keep
//! only the elements that match.

use std::collections::{BTreeMap, HashMap};

use super::value::DynamicJson;

/// Types that can be read back out of a [`DynamicJson`] without coercion
pub trait FromDynamic: Sized {
    fn from_dynamic(value: &DynamicJson) -> Option<Self>;
}

impl FromDynamic for DynamicJson {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromDynamic for bool {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value.as_bool()
    }
}

impl FromDynamic for i64 {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value.as_i64()
    }
}

impl FromDynamic for i32 {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value.as_i64().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromDynamic for u64 {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value.as_i64().and_then(|i| u64::try_from(i).ok())
    }
}

impl FromDynamic for f64 {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value.as_f64()
    }
}

impl FromDynamic for String {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl<T: FromDynamic> FromDynamic for Vec<T> {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value.as_array()?.iter().map(T::from_dynamic).collect()
    }
}

impl<T: FromDynamic> FromDynamic for BTreeMap<String, T> {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value
            .as_object()?
            .iter()
            .map(|(k, v)| T::from_dynamic(v).map(|v| (k.clone(), v)))
            .collect()
    }
}

impl<T: FromDynamic> FromDynamic for HashMap<String, T> {
    fn from_dynamic(value: &DynamicJson) -> Option<Self> {
        value
            .as_object()?
            .iter()
            .map(|(k, v)| T::from_dynamic(v).map(|v| (k.clone(), v)))
            .collect()
    }
}

impl DynamicJson {
    /// Checked conversion into `T`
    pub fn extract<T: FromDynamic>(&self) -> Option<T> {
        T::from_dynamic(self)
    }

    /// Array elements that convert to `T`; others are skipped.
    /// `None` when the value is not an array.
    pub fn unwrap_array<T: FromDynamic>(&self) -> Option<Vec<T>> {
        self.as_array()
            .map(|items| items.iter().filter_map(T::from_dynamic).collect())
    }

    /// Object members that convert to `T`; others are skipped.
    /// `None` when the value is not an object.
    pub fn unwrap_object<T: FromDynamic>(&self) -> Option<BTreeMap<String, T>> {
        self.as_object().map(|map| {
            map.iter()
                .filter_map(|(k, v)| T::from_dynamic(v).map(|v| (k.clone(), v)))
                .collect()
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
