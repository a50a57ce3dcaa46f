//! Shared utility operations used by the compiler, the engine and the
//! built-in rules.

use serde_json::{Number, Value};

// ─── resolve_path ───────────────────────────────────────────────────────────

/// Resolves a dotted path against a value tree.
///
/// Object segments index by key, array segments by a decimal position.
/// Returns `None` as soon as a segment fails to resolve. An empty path
/// returns the root value.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

// ─── hash_value ─────────────────────────────────────────────────────────────

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

struct Fnv1a(u64);

impl Fnv1a {
    fn new() -> Self {
        Fnv1a(FNV_OFFSET)
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    fn write_len(&mut self, len: usize) {
        self.write(&(len as u64).to_le_bytes());
    }
}

/// Deterministic 64-bit structural hash of a value (FNV-1a).
///
/// Structurally equal values hash equally: numbers compare by mathematical
/// value (`1` and `1.0` collide on purpose), arrays by element sequence and
/// objects by their key/value pairs regardless of key order. Every node is
/// type-tagged and length-prefixed so `"1"` and `1`, or `[[1],2]` and
/// `[1,[2]]`, encode differently.
pub fn hash_value(value: &Value) -> u64 {
    let mut h = Fnv1a::new();
    write_canonical(&mut h, value);
    h.0
}

fn write_canonical(h: &mut Fnv1a, value: &Value) {
    match value {
        Value::Null => h.write(b"z"),
        Value::Bool(b) => h.write(if *b { b"t" } else { b"f" }),
        Value::Number(n) => {
            h.write(b"n");
            h.write(canonical_number(n).as_bytes());
            h.write(b";");
        }
        Value::String(s) => {
            h.write(b"s");
            h.write_len(s.len());
            h.write(s.as_bytes());
        }
        Value::Array(arr) => {
            h.write(b"a");
            h.write_len(arr.len());
            for item in arr {
                write_canonical(h, item);
            }
        }
        Value::Object(obj) => {
            h.write(b"o");
            h.write_len(obj.len());
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            for key in keys {
                h.write_len(key.len());
                h.write(key.as_bytes());
                write_canonical(h, &obj[key.as_str()]);
            }
        }
    }
}

const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Textual form of a number that is identical for equal values.
pub(crate) fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    // An integral f64 below 2^127 converts to i128 exactly, so it prints the
    // same digits as the equal i64/u64. Larger magnitudes only exist as floats.
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < I128_LIMIT => (f as i128).to_string(),
        Some(f) => format!("{:e}", f),
        None => n.to_string(),
    }
}

// ─── numeric helpers ────────────────────────────────────────────────────────

/// Reads a rule parameter as a number.
///
/// Literal parameters arrive as strings; referenced parameters may already be
/// numbers. Anything else yields `None`.
pub fn param_as_f64(param: &Value) -> Option<f64> {
    match param {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Deep equality where numbers compare by value and object key order is
/// irrelevant.
pub fn values_deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(fa), Some(fb)) => fa == fb,
            _ => a == b,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| values_deep_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|bv| values_deep_equal(v, bv)))
        }
        _ => false,
    }
}
