use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub fn fixtures_dir() -> PathBuf {
    std::env::var("FIELDRULES_FIXTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

/// Load a YAML fixture file from the fixtures directory.
pub fn load_fixture<T: DeserializeOwned>(name: &str) -> T {
    let path = fixtures_dir().join(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {:?}: {}", path, e));
    serde_saphyr::from_str(&content)
        .unwrap_or_else(|e| panic!("cannot parse fixture {:?}: {}", path, e))
}

/// Structural equality: ignore field ordering, compare values deeply.
/// Treat missing optional fields as equivalent to null.
pub fn values_structurally_equal(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    use serde_json::Value;
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            // Compare numerically
            if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
                (a - b).abs() < f64::EPSILON
            } else {
                a == b
            }
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(a, b)| values_structurally_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            for (key, val_b) in b {
                match a.get(key) {
                    Some(val_a) => {
                        if !values_structurally_equal(val_a, val_b) {
                            return false;
                        }
                    }
                    None => {
                        if !val_b.is_null() {
                            return false;
                        }
                    }
                }
            }
            for (key, val_a) in a {
                if !b.contains_key(key) && !val_a.is_null() {
                    return false;
                }
            }
            true
        }
        _ => false,
    }
}

/// Keys of an object in enumeration order.
pub fn keys_in_order(value: &serde_json::Value) -> Vec<String> {
    value
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default()
}
