//! Dynamic JSON Value Model
//!
//! [`DynamicJson`] is the tagged-union value stored by every settings tier
//! and written to disk as plain JSON.
//!
//! ```text
//! DynamicJson ─┬─ Null
//!              ├─ Bool(bool)
//!              ├─ Number(Int | Float)
//!              ├─ String(String)
//!              ├─ Array(Vec<DynamicJson>)
//!              └─ Object(BTreeMap<String, DynamicJson>)
//! ```

mod codec;
mod extract;
mod number;
mod value;

#[cfg(test)]
mod proptest;

pub use extract::FromDynamic;
pub use number::Number;
pub use value::{DynamicJson, JsonKind, JsonObject};
