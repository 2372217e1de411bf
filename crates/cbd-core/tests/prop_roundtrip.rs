/// Property-based roundtrip tests for CBD.
///
/// Uses `proptest` to generate random value trees and verify that
/// `deserialize(serialize(v)) == v` for everything built from null, bools,
/// non-negative integers, strings, arrays and objects.
///
/// Strategies generate:
/// - Strings with edge cases (empty, unicode, control characters)
/// - Integers around the varint byte boundaries
/// - Objects with a small key pool, so dictionary sharing is exercised
/// - Nested structures up to 4 levels deep
///
/// Floats and negative numbers are excluded: they do not roundtrip
/// (truncation / rejection) and have dedicated properties below.
use cbd_core::{deserialize, serialize, CbdError, Value};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        // Small pool: keys repeat across objects
        prop::sample::select(vec!["id", "name", "value", "tags", "meta", "x"])
            .prop_map(str::to_string),
        "[a-zA-Z_][a-zA-Z0-9_]{0,12}",
        Just(String::new()),
        Just("\u{540d}\u{524d}".to_string()),
    ]
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,30}",
        any::<String>(),
        Just(String::new()),
        Just("line1\nline2".to_string()),
        Just("caf\u{e9}".to_string()),
    ]
}

fn arb_integer() -> impl Strategy<Value = u64> {
    prop_oneof![
        0u64..128,
        128u64..16_384,
        any::<u64>(),
        Just(u64::MAX),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        arb_integer().prop_map(Value::from),
        arb_string().prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf()
        .prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::vec((arb_key(), inner), 0..8)
                    .prop_map(|pairs| Value::object(pairs)),
            ]
        })
        .prop_filter("dictionary must fit in one byte", |v| {
            let mut seen = std::collections::HashSet::new();
            distinct_keys(v, &mut seen);
            seen.len() <= 255
        })
}

/// Count distinct keys in a value tree.
fn distinct_keys(value: &Value, seen: &mut std::collections::HashSet<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| distinct_keys(v, seen)),
        Value::Object(map) => {
            for (k, v) in map {
                seen.insert(k.clone());
                distinct_keys(v, seen);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_roundtrip(value in arb_value()) {
        let bytes = serialize(&value).unwrap();
        let back = deserialize(&bytes).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_serialize_is_deterministic(value in arb_value()) {
        prop_assert_eq!(serialize(&value).unwrap(), serialize(&value).unwrap());
    }

    #[test]
    fn prop_dictionary_holds_each_key_once(value in arb_value()) {
        let bytes = serialize(&value).unwrap();
        let info = cbd_core::inspect(&bytes).unwrap();
        let mut seen = std::collections::HashSet::new();
        distinct_keys(&value, &mut seen);
        prop_assert_eq!(info.keys.len(), seen.len());
        prop_assert_eq!(info.header.dict_size as usize, seen.len());
    }

    #[test]
    fn prop_truncation_is_malformed(value in arb_value(), cut in any::<prop::sample::Index>()) {
        let bytes = serialize(&value).unwrap();
        let len = cut.index(bytes.len());
        let is_malformed = matches!(
            deserialize(&bytes[..len]),
            Err(CbdError::MalformedBuffer { .. })
        );
        prop_assert!(is_malformed);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(tail in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut bytes = vec![0xCB, 0xD1, 0x01];
        bytes.extend_from_slice(&tail);
        let _ = deserialize(&bytes);
    }

    #[test]
    fn prop_floats_truncate(f in 0.0f64..1e15) {
        let back = deserialize(&serialize(&Value::from(f)).unwrap()).unwrap();
        prop_assert_eq!(back, Value::from(f.trunc() as u64));
    }

    #[test]
    fn prop_negative_integers_rejected(n in i64::MIN..0) {
        let value = Value::array([Value::from(1), Value::from(n)]);
        let is_negative = matches!(serialize(&value), Err(CbdError::NegativeValue(_)));
        prop_assert!(is_negative);
    }
}
