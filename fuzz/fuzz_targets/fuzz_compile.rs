#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &str| {
    // Any rule string either compiles or yields a CompileError; never a panic.
    let rules = json!({"field": data});
    if let Ok(plan) = fieldrules::compile(&rules) {
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.groups[0].key, "field");
        assert!(!plan.groups[0].alternatives.is_empty());
    }

    // Whole JSON documents as rule objects.
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(data) {
        let _ = fieldrules::compile(&value);
    }
});
