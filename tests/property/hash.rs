use super::strategies::arb_json;
use fieldrules::primitives::hash_value;
use proptest::prelude::*;
use serde_json::{Value, json};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Hashing is deterministic
    #[test]
    fn equal_values_hash_equal(value in arb_json(3)) {
        prop_assert_eq!(hash_value(&value), hash_value(&value.clone()));
    }

    // Object key insertion order does not change the hash
    #[test]
    fn key_order_is_irrelevant(pairs in prop::collection::btree_map("[a-z]{1,4}", arb_json(1), 0..6)) {
        let forward: serde_json::Map<String, Value> =
            pairs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let reverse: serde_json::Map<String, Value> =
            pairs.iter().rev().map(|(k, v)| (k.clone(), v.clone())).collect();
        prop_assert_eq!(
            hash_value(&Value::Object(forward)),
            hash_value(&Value::Object(reverse))
        );
    }

    // Integers and floats with the same value hash equally
    #[test]
    fn integral_float_matches_integer(i in -1_000_000i64..1_000_000) {
        prop_assert_eq!(hash_value(&json!(i)), hash_value(&json!(i as f64)));
    }

    // Equality holds past 2^53, where integers and floats stop sharing a form
    #[test]
    fn large_integral_float_matches_integer(i in -(1i64 << 62)..(1i64 << 62)) {
        let f = i as f64;
        prop_assert_eq!(hash_value(&json!(f as i64)), hash_value(&json!(f)));
    }

    #[test]
    fn large_unsigned_float_matches_integer(u in (1u64 << 53)..u64::MAX) {
        let f = u as f64;
        prop_assume!(f < 18_446_744_073_709_551_616.0);
        prop_assert_eq!(hash_value(&json!(f as u64)), hash_value(&json!(f)));
    }

    // A number never collides with its own text
    #[test]
    fn number_differs_from_string(i in any::<i64>()) {
        prop_assert_ne!(hash_value(&json!(i)), hash_value(&json!(i.to_string())));
    }

    // Distinct short strings hash differently
    #[test]
    fn distinct_strings_differ(a in "[a-z0-9]{0,8}", b in "[a-z0-9]{0,8}") {
        prop_assume!(a != b);
        prop_assert_ne!(hash_value(&json!(a)), hash_value(&json!(b)));
    }

    // Nesting is part of the encoding
    #[test]
    fn nesting_changes_hash(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_ne!(hash_value(&json!([[a], b])), hash_value(&json!([a, [b]])));
    }
}
