//! JSON Number
//!
//! Numeric payload of [`DynamicJson`](super::DynamicJson). Integers and floats
//! are kept apart so integral values survive a disk round-trip unchanged, but
//! they compare numerically (`1 == 1.0`).

use std::fmt;

/// A JSON number, either integral or floating point
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Signed 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
}

impl Number {
    /// Integral value, `None` for floats
    #[inline]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i),
            Number::Float(_) => None,
        }
    }

    /// Value widened to `f64`
    #[inline]
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Value truncated toward zero (saturating at the `i64` bounds)
    #[inline]
    pub fn to_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f as i64,
        }
    }

    /// True for `0` and `0.0`
    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    /// True if the number was stored as an integer
    pub fn is_integer(self) -> bool {
        matches!(self, Number::Int(_))
    }

    /// Parse a whole string as a number, integers first.
    ///
    /// Surrounding whitespace is ignored. Non-finite spellings such as
    /// `"inf"` or `"NaN"` are rejected.
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::Int(i));
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Some(Number::Float(f)),
            _ => None,
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Int(0)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => {
                float_is_exactly(f, i)
            }
        }
    }
}

/// 2^63, the first float above the i64 range
const I64_END: f64 = 9_223_372_036_854_775_808.0;

fn float_is_exactly(f: f64, i: i64) -> bool {
    f.fract() == 0.0 && (-I64_END..I64_END).contains(&f) && f as i64 == i
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(value: $t) -> Self {
                    Number::Int(i64::from(value))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Number::Int(i),
            Err(_) => Number::Float(value as f64),
        }
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number::from(value as u64)
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

// =============================================================================
// Tests
// =============================================================================
