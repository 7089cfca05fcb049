//! DynamicJson - Tagged JSON Value
//!
//! The durable value model shared by every tier. The tag and payload can
//! never disagree because they are one enum variant.
//!
//! # Accessor families
//!
//! - Strict (`as_*`): `None` whenever the tag does not match.
//! - Coercive (`*_value`): best-effort conversion across tags, never fails.
//! - Indexing (`value["key"]`, `value[3]`): a missing key, an out-of-range
//!   index or a non-container yields [`DynamicJson::Null`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Index;

use tracing::warn;

use super::number::Number;

/// Object payload, ordered so persisted blobs are deterministic
pub type JsonObject = BTreeMap<String, DynamicJson>;

static NULL: DynamicJson = DynamicJson::Null;

/// Strings that coerce to boolean `true` (case-insensitive)
const TRUTHY: [&str; 5] = ["true", "y", "t", "yes", "1"];

/// Discriminant of a [`DynamicJson`] value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "bool",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Tagged-union JSON value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DynamicJson {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<DynamicJson>),
    Object(JsonObject),
}

impl DynamicJson {
    /// Empty object
    pub fn object() -> Self {
        DynamicJson::Object(JsonObject::new())
    }

    /// Parse JSON text. Invalid input is logged and yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        Self::from_slice(text.as_bytes())
    }

    /// Parse JSON bytes. Top-level scalars are accepted.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(len = bytes.len(), error = %e, "Data is not valid JSON");
                None
            }
        }
    }

    /// Compact JSON text, or `None` when the value holds a non-finite
    /// float anywhere inside it
    pub fn to_json_string(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// The tag of this value
    pub fn kind(&self) -> JsonKind {
        match self {
            DynamicJson::Null => JsonKind::Null,
            DynamicJson::Bool(_) => JsonKind::Bool,
            DynamicJson::Number(_) => JsonKind::Number,
            DynamicJson::String(_) => JsonKind::String,
            DynamicJson::Array(_) => JsonKind::Array,
            DynamicJson::Object(_) => JsonKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicJson::Null)
    }

    // =========================================================================
    // Strict accessors
    // =========================================================================

    pub fn as_null(&self) -> Option<()> {
        self.is_null().then_some(())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicJson::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            DynamicJson::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer payload; floats are not integers even when integral
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    /// Any number, widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::to_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicJson::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DynamicJson]> {
        match self {
            DynamicJson::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            DynamicJson::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut JsonObject> {
        match self {
            DynamicJson::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Consume into the object payload
    pub fn into_object(self) -> Option<JsonObject> {
        match self {
            DynamicJson::Object(map) => Some(map),
            _ => None,
        }
    }

    // =========================================================================
    // Coercive accessors
    // =========================================================================

    /// Booleans as-is, non-zero numbers, and the strings
    /// `true`/`y`/`t`/`yes`/`1` (any case) are `true`.
    pub fn bool_value(&self) -> bool {
        match self {
            DynamicJson::Bool(b) => *b,
            DynamicJson::Number(n) => !n.is_zero(),
            DynamicJson::String(s) => TRUTHY.iter().any(|t| s.eq_ignore_ascii_case(t)),
            _ => false,
        }
    }

    /// Numbers as-is, booleans as 1/0, numeric strings parsed, else zero
    pub fn number_value(&self) -> Number {
        match self {
            DynamicJson::Number(n) => *n,
            DynamicJson::Bool(b) => Number::Int(i64::from(*b)),
            DynamicJson::String(s) => Number::parse(s).unwrap_or_default(),
            _ => Number::Int(0),
        }
    }

    pub fn int_value(&self) -> i64 {
        self.number_value().to_i64()
    }

    pub fn double_value(&self) -> f64 {
        self.number_value().to_f64()
    }

    pub fn float_value(&self) -> f32 {
        self.double_value() as f32
    }

    /// Strings as-is, numbers and booleans formatted, else empty
    pub fn string_value(&self) -> String {
        match self {
            DynamicJson::String(s) => s.clone(),
            DynamicJson::Number(n) => n.to_string(),
            DynamicJson::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    pub fn array_value(&self) -> Vec<DynamicJson> {
        self.as_array().map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn object_value(&self) -> JsonObject {
        self.as_object().cloned().unwrap_or_default()
    }

    // =========================================================================
    // Collection helpers
    // =========================================================================

    /// Member lookup that never fails
    pub fn get(&self, key: &str) -> &DynamicJson {
        match self {
            DynamicJson::Object(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Element lookup that never fails
    pub fn at(&self, index: usize) -> &DynamicJson {
        match self {
            DynamicJson::Array(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Number of array elements (zero for every other tag)
    pub fn len(&self) -> usize {
        self.as_array().map_or(0, <[_]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate array elements; other tags iterate nothing
    pub fn iter(&self) -> std::slice::Iter<'_, DynamicJson> {
        self.as_array().unwrap_or(&[]).iter()
    }

    /// Insert a member, turning a non-object into an empty object first
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DynamicJson>) {
        if !matches!(self, DynamicJson::Object(_)) {
            *self = DynamicJson::object();
        }
        if let DynamicJson::Object(map) = self {
            map.insert(key.into(), value.into());
        }
    }
}

impl Index<&str> for DynamicJson {
    type Output = DynamicJson;

    fn index(&self, key: &str) -> &DynamicJson {
        self.get(key)
    }
}

impl Index<usize> for DynamicJson {
    type Output = DynamicJson;

    fn index(&self, index: usize) -> &DynamicJson {
        self.at(index)
    }
}

impl<'a> IntoIterator for &'a DynamicJson {
    type Item = &'a DynamicJson;
    type IntoIter = std::slice::Iter<'a, DynamicJson>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for DynamicJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_string() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{:?}", self),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for DynamicJson {
    fn from(value: bool) -> Self {
        DynamicJson::Bool(value)
    }
}

macro_rules! from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for DynamicJson {
                fn from(value: $t) -> Self {
                    DynamicJson::Number(Number::from(value))
                }
            }
        )*
    };
}

from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

impl From<Number> for DynamicJson {
    fn from(value: Number) -> Self {
        DynamicJson::Number(value)
    }
}

impl From<String> for DynamicJson {
    fn from(value: String) -> Self {
        DynamicJson::String(value)
    }
}

impl From<&str> for DynamicJson {
    fn from(value: &str) -> Self {
        DynamicJson::String(value.to_owned())
    }
}

impl<T: Into<DynamicJson>> From<Option<T>> for DynamicJson {
    fn from(value: Option<T>) -> Self {
        value.map_or(DynamicJson::Null, Into::into)
    }
}

impl<T: Into<DynamicJson>> From<Vec<T>> for DynamicJson {
    fn from(values: Vec<T>) -> Self {
        DynamicJson::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DynamicJson>> From<BTreeMap<String, T>> for DynamicJson {
    fn from(map: BTreeMap<String, T>) -> Self {
        DynamicJson::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<DynamicJson>> From<HashMap<String, T>> for DynamicJson {
    fn from(map: HashMap<String, T>) -> Self {
        DynamicJson::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<DynamicJson>> FromIterator<T> for DynamicJson {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        DynamicJson::Array(iter.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for DynamicJson {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => DynamicJson::Null,
            Value::Bool(b) => DynamicJson::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DynamicJson::Number(Number::Int(i)),
                None => DynamicJson::Number(Number::Float(n.as_f64().unwrap_or_default())),
            },
            Value::String(s) => DynamicJson::String(s),
            Value::Array(items) => DynamicJson::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                DynamicJson::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<DynamicJson> for serde_json::Value {
    fn from(value: DynamicJson) -> Self {
        use serde_json::Value;

        match value {
            DynamicJson::Null => Value::Null,
            DynamicJson::Bool(b) => Value::Bool(b),
            DynamicJson::Number(Number::Int(i)) => Value::from(i),
            DynamicJson::Number(Number::Float(f)) => {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            }
            DynamicJson::String(s) => Value::String(s),
            DynamicJson::Array(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            DynamicJson::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
