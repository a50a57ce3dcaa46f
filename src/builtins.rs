//! The default rule table installed in every [`crate::RuleRegistry::new`].
//!
//! Each rule is a plain `fn(&Value, &[Value]) -> bool`. Literal parameters
//! arrive as strings and are read numerically where a rule needs a number.

use crate::primitives::{canonical_number, param_as_f64, values_deep_equal};
use crate::registry::{Predicate, RuleTable};
use regex::Regex;
use serde_json::Value;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, LazyLock};

/// Signature of a built-in rule.
pub type RuleFn = fn(&Value, &[Value]) -> bool;

/// Name → function pairs of the built-in rules.
pub static BUILTIN_RULES: &[(&str, RuleFn)] = &[
    // types
    ("string", is_string),
    ("string_ne", is_string_ne),
    ("number", is_number),
    ("integer", is_integer),
    ("boolean", is_boolean),
    ("true", is_true),
    ("false", is_false),
    ("null", is_null),
    ("array", is_array),
    ("array_ne", is_array_ne),
    ("object", is_object),
    ("object_ne", is_object_ne),
    // size and comparison
    ("min", min),
    ("max", max),
    ("size", size),
    ("between", between),
    ("greater_than", greater_than),
    ("gt", greater_than),
    ("greater_than_or_equal", greater_than_or_equal),
    ("gte", greater_than_or_equal),
    ("less_than", less_than),
    ("lt", less_than),
    ("less_than_or_equal", less_than_or_equal),
    ("lte", less_than_or_equal),
    ("equal_to", equal_to),
    ("literal", literal),
    ("in", is_in),
    // formats
    ("email", email),
    ("url", url),
    ("uuid", uuid),
    ("sys_ipv4", sys_ipv4),
    ("sys_ipv6", sys_ipv6),
    ("sys_port", sys_port),
    ("geo_latitude", geo_latitude),
    ("geo_longitude", geo_longitude),
    ("color_hex", color_hex),
    ("date_string", date_string),
    ("alpha_num_spaces", alpha_num_spaces),
];

/// A fresh table holding every built-in rule.
pub fn default_table() -> RuleTable {
    let mut table = RuleTable::default();
    for (name, f) in BUILTIN_RULES {
        table.insert(name, Arc::new(*f) as Arc<dyn Predicate>);
    }
    table
}

// ─── types ──────────────────────────────────────────────────────────────────

fn is_string(value: &Value, _: &[Value]) -> bool {
    value.is_string()
}

fn is_string_ne(value: &Value, _: &[Value]) -> bool {
    value.as_str().is_some_and(|s| !s.trim().is_empty())
}

fn is_number(value: &Value, _: &[Value]) -> bool {
    value.is_number()
}

fn is_integer(value: &Value, _: &[Value]) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    }
}

fn is_boolean(value: &Value, _: &[Value]) -> bool {
    value.is_boolean()
}

fn is_true(value: &Value, _: &[Value]) -> bool {
    value.as_bool() == Some(true)
}

fn is_false(value: &Value, _: &[Value]) -> bool {
    value.as_bool() == Some(false)
}

fn is_null(value: &Value, _: &[Value]) -> bool {
    value.is_null()
}

fn is_array(value: &Value, _: &[Value]) -> bool {
    value.is_array()
}

fn is_array_ne(value: &Value, _: &[Value]) -> bool {
    value.as_array().is_some_and(|a| !a.is_empty())
}

fn is_object(value: &Value, _: &[Value]) -> bool {
    value.is_object()
}

fn is_object_ne(value: &Value, _: &[Value]) -> bool {
    value.as_object().is_some_and(|o| !o.is_empty())
}

// ─── size and comparison ────────────────────────────────────────────────────

/// Numbers measure as themselves; strings by character count; arrays and
/// objects by element count.
fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(a) => Some(a.len() as f64),
        Value::Object(o) => Some(o.len() as f64),
        _ => None,
    }
}

fn nth_number(params: &[Value], n: usize) -> Option<f64> {
    params.get(n).and_then(param_as_f64)
}

fn min(value: &Value, params: &[Value]) -> bool {
    matches!((measure(value), nth_number(params, 0)), (Some(m), Some(p)) if m >= p)
}

fn max(value: &Value, params: &[Value]) -> bool {
    matches!((measure(value), nth_number(params, 0)), (Some(m), Some(p)) if m <= p)
}

fn size(value: &Value, params: &[Value]) -> bool {
    matches!((measure(value), nth_number(params, 0)), (Some(m), Some(p)) if m == p)
}

fn between(value: &Value, params: &[Value]) -> bool {
    match (measure(value), nth_number(params, 0), nth_number(params, 1)) {
        (Some(m), Some(lo), Some(hi)) => lo <= m && m <= hi,
        _ => false,
    }
}

fn compare_number(value: &Value, params: &[Value], cmp: fn(f64, f64) -> bool) -> bool {
    match (value.as_f64(), nth_number(params, 0)) {
        (Some(v), Some(p)) => cmp(v, p),
        _ => false,
    }
}

fn greater_than(value: &Value, params: &[Value]) -> bool {
    compare_number(value, params, |v, p| v > p)
}

fn greater_than_or_equal(value: &Value, params: &[Value]) -> bool {
    compare_number(value, params, |v, p| v >= p)
}

fn less_than(value: &Value, params: &[Value]) -> bool {
    compare_number(value, params, |v, p| v < p)
}

fn less_than_or_equal(value: &Value, params: &[Value]) -> bool {
    compare_number(value, params, |v, p| v <= p)
}

/// Deep equality, with a scalar also matching the literal text of itself
/// (`3` equals the literal parameter `"3"`).
fn loosely_equal(value: &Value, param: &Value) -> bool {
    if values_deep_equal(value, param) {
        return true;
    }
    let Value::String(text) = param else {
        return false;
    };
    match value {
        Value::Number(n) => param_as_f64(param).is_some_and(|p| n.as_f64() == Some(p))
            || canonical_number(n) == *text,
        Value::Bool(b) => b.to_string() == *text,
        _ => false,
    }
}

fn equal_to(value: &Value, params: &[Value]) -> bool {
    params.first().is_some_and(|p| loosely_equal(value, p))
}

fn literal(value: &Value, params: &[Value]) -> bool {
    !value.is_array() && !value.is_object() && equal_to(value, params)
}

fn is_in(value: &Value, params: &[Value]) -> bool {
    match params {
        [Value::Array(list)] => list.iter().any(|p| loosely_equal(value, p)),
        _ => params.iter().any(|p| loosely_equal(value, p)),
    }
}

// ─── formats ────────────────────────────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$").unwrap()
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#@]+(?::[0-9]{1,5})?(?:[/?#][^\s]*)?$").unwrap()
});

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static COLOR_HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?(?:Z|[+-]\d{2}:\d{2})?)?$",
    )
    .unwrap()
});

static ALPHA_NUM_SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 ]+$").unwrap());

fn matches_str(value: &Value, re: &Regex) -> bool {
    value.as_str().is_some_and(|s| re.is_match(s))
}

fn email(value: &Value, _: &[Value]) -> bool {
    value.as_str().is_some_and(|s| s.len() <= 254) && matches_str(value, &EMAIL_RE)
}

fn url(value: &Value, _: &[Value]) -> bool {
    matches_str(value, &URL_RE)
}

fn uuid(value: &Value, _: &[Value]) -> bool {
    matches_str(value, &UUID_RE)
}

fn sys_ipv4(value: &Value, _: &[Value]) -> bool {
    value.as_str().is_some_and(|s| s.parse::<Ipv4Addr>().is_ok())
}

fn sys_ipv6(value: &Value, _: &[Value]) -> bool {
    value.as_str().is_some_and(|s| s.parse::<Ipv6Addr>().is_ok())
}

fn sys_port(value: &Value, _: &[Value]) -> bool {
    value.as_u64().is_some_and(|p| (1..=65535).contains(&p))
}

fn coordinate(value: &Value, limit: f64) -> bool {
    value.as_f64().is_some_and(|c| (-limit..=limit).contains(&c))
}

fn geo_latitude(value: &Value, _: &[Value]) -> bool {
    coordinate(value, 90.0)
}

fn geo_longitude(value: &Value, _: &[Value]) -> bool {
    coordinate(value, 180.0)
}

fn color_hex(value: &Value, _: &[Value]) -> bool {
    matches_str(value, &COLOR_HEX_RE)
}

fn date_string(value: &Value, _: &[Value]) -> bool {
    let Some(caps) = value.as_str().and_then(|s| DATE_RE.captures(s)) else {
        return false;
    };
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let (Some(year), Some(month), Some(day)) = (field(1), field(2), field(3)) else {
        return false;
    };
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return false;
    }
    field(4).is_none_or(|h| h < 24)
        && field(5).is_none_or(|m| m < 60)
        && field(6).is_none_or(|s| s < 60)
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn alpha_num_spaces(value: &Value, _: &[Value]) -> bool {
    matches_str(value, &ALPHA_NUM_SPACES_RE)
}
