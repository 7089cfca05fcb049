//! Property-Based Tests for the JSON value model
//!
//! # Test Properties
//!
//! 1. **Codec fidelity**: decode(encode(v)) == v for finite values
//! 2. **Tag sensitivity**: values of different kinds never compare equal
//! 3. **Total indexing**: lookups on any value never panic
//! 4. **Coercion totality**: coercive accessors accept every value

#![cfg(test)]

use proptest::prelude::*;

use super::{DynamicJson, JsonObject, Number};

// =============================================================================
// Property Strategies
// =============================================================================

fn leaf_strategy() -> impl Strategy<Value = DynamicJson> {
    prop_oneof![
        Just(DynamicJson::Null),
        any::<bool>().prop_map(DynamicJson::Bool),
        any::<i64>().prop_map(|i| DynamicJson::Number(Number::Int(i))),
        (-1.0e12f64..1.0e12).prop_map(|f| DynamicJson::Number(Number::Float(f))),
        "[a-zA-Z0-9 ]{0,12}".prop_map(DynamicJson::String),
    ]
}

fn value_strategy() -> impl Strategy<Value = DynamicJson> {
    leaf_strategy().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(DynamicJson::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m: JsonObject| DynamicJson::Object(m)),
        ]
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_codec_preserves_value(value in value_strategy()) {
        let bytes = serde_json::to_vec(&value).unwrap();
        let decoded: DynamicJson = serde_json::from_slice(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn prop_cross_kind_never_equal(a in leaf_strategy(), b in leaf_strategy()) {
        if a.kind() != b.kind() {
            prop_assert_ne!(a, b);
        }
    }

    #[test]
    fn prop_indexing_is_total(value in value_strategy(), key in "[a-z]{0,6}", index in 0usize..16) {
        let member = &value[key.as_str()];
        let element = &value[index];
        if value.as_object().map_or(true, |m| !m.contains_key(&key)) {
            prop_assert!(member.is_null());
        }
        if index >= value.len() {
            prop_assert!(element.is_null());
        }
    }

    #[test]
    fn prop_coercions_are_total(value in value_strategy()) {
        let _ = value.bool_value();
        let _ = value.int_value();
        let _ = value.double_value();
        let _ = value.string_value();
        if !matches!(value, DynamicJson::Bool(_) | DynamicJson::Number(_) | DynamicJson::String(_)) {
            prop_assert_eq!(value.int_value(), 0);
            prop_assert!(!value.bool_value());
        }
    }

    #[test]
    fn prop_integer_strings_coerce_exactly(i in any::<i64>()) {
        prop_assert_eq!(DynamicJson::String(i.to_string()).int_value(), i);
    }
}
