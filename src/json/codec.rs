//! Serde Codec for [`DynamicJson`]
//!
//! The wire and disk form is plain JSON: no tag field is written, the
//! variant is recovered from the JSON token type on the way back in.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, SerializeMap, SerializeSeq, Serializer};

use super::number::Number;
use super::value::{DynamicJson, JsonObject};

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(i) => serializer.serialize_i64(i),
            Number::Float(f) if f.is_finite() => serializer.serialize_f64(f),
            Number::Float(f) => Err(<S::Error as ser::Error>::custom(format!(
                "non-finite number {f} has no JSON form"
            ))),
        }
    }
}

impl Serialize for DynamicJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DynamicJson::Null => serializer.serialize_unit(),
            DynamicJson::Bool(b) => serializer.serialize_bool(*b),
            DynamicJson::Number(n) => n.serialize(serializer),
            DynamicJson::String(s) => serializer.serialize_str(s),
            DynamicJson::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DynamicJson::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

struct DynamicJsonVisitor;

impl<'de> Visitor<'de> for DynamicJsonVisitor {
    type Value = DynamicJson;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<DynamicJson, E> {
        Ok(DynamicJson::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<DynamicJson, E> {
        Ok(DynamicJson::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<DynamicJson, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<DynamicJson, E> {
        Ok(DynamicJson::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DynamicJson, E> {
        Ok(DynamicJson::Number(Number::Int(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DynamicJson, E> {
        Ok(DynamicJson::Number(Number::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DynamicJson, E> {
        Ok(DynamicJson::Number(Number::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DynamicJson, E> {
        Ok(DynamicJson::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<DynamicJson, E> {
        Ok(DynamicJson::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<DynamicJson, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(DynamicJson::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<DynamicJson, A::Error> {
        let mut object = JsonObject::new();
        while let Some((key, value)) = map.next_entry::<String, DynamicJson>()? {
            object.insert(key, value);
        }
        Ok(DynamicJson::Object(object))
    }
}

impl<'de> Deserialize<'de> for DynamicJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DynamicJsonVisitor)
    }
}

// =============================================================================
// Tests
// =============================================================================
