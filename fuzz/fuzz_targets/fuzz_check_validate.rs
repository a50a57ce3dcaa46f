#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use fieldrules::Validator;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

/// Rule fragments assembled into rule strings by the fuzzer.
const FRAGMENTS: &[&str] = &[
    "string", "string_ne", "integer", "number", "null", "boolean", "array", "object",
    "min:1", "max:3", "between:0,5", "in:a,b,1", "equal_to:<b>", "!null", "no_such_rule",
];
const PREFIXES: &[&str] = &["", "?", "[]", "[unique]", "?[min:1|max:2]", "{}", "{unique}"];
const KEYS: &[&str] = &["a", "b", "c"];

fn arbitrary_rule(u: &mut Unstructured<'_>) -> arbitrary::Result<String> {
    let mut rule = u.choose(PREFIXES)?.to_string();
    let len = u.int_in_range(1..=3)?;
    for i in 0..len {
        if i > 0 {
            rule.push('|');
        }
        rule.push_str(u.choose(FRAGMENTS)?);
    }
    Ok(rule)
}

/// Generate a small arbitrary JSON value from fuzzer bytes.
fn arbitrary_value(u: &mut Unstructured<'_>, depth: u32) -> arbitrary::Result<Value> {
    let top = if depth == 0 { 3 } else { 5 };
    match u.int_in_range(0..=top)? {
        0 => Ok(Value::Null),
        1 => Ok(Value::Bool(bool::arbitrary(u)?)),
        2 => Ok(Value::from(i32::arbitrary(u)?)),
        3 => Ok(Value::String(String::arbitrary(u)?)),
        4 => {
            let len = u.int_in_range(0..=4)?;
            (0..len)
                .map(|_| arbitrary_value(u, depth - 1))
                .collect::<arbitrary::Result<Vec<_>>>()
                .map(Value::Array)
        }
        _ => {
            let mut obj = Map::new();
            for key in KEYS {
                if bool::arbitrary(u)? {
                    obj.insert(key.to_string(), arbitrary_value(u, depth - 1)?);
                }
            }
            Ok(Value::Object(obj))
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let mut rules = Map::new();
    for key in KEYS {
        match arbitrary_rule(&mut u) {
            Ok(rule) => rules.insert(key.to_string(), Value::String(rule)),
            Err(_) => return,
        };
    }
    let Ok(value) = arbitrary_value(&mut u, 3) else {
        return;
    };

    let Ok(validator) = Validator::new(&Value::Object(rules)) else {
        return;
    };

    let report = validator.validate(&value);
    assert_eq!(validator.check(&value), report.is_valid);
    assert_eq!(report.is_valid, report.count == 0);
});
