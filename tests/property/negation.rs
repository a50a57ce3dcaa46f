use super::strategies::arb_json;
use fieldrules::Validator;
use proptest::prelude::*;
use serde_json::json;

fn arb_registered_rule() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("string"),
        Just("string_ne"),
        Just("number"),
        Just("integer"),
        Just("boolean"),
        Just("null"),
        Just("array_ne"),
        Just("object"),
        Just("min:2"),
        Just("max:1"),
        Just("between:-5,5"),
        Just("in:a,b,3"),
        Just("equal_to:<other>"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    // For a registered rule, exactly one of `rule` and `!rule` accepts a value
    #[test]
    fn negation_flips_result(rule in arb_registered_rule(), value in arb_json(2), other in arb_json(1)) {
        let plain = Validator::new(&json!({"f": rule})).unwrap();
        let negated = Validator::new(&json!({"f": format!("!{}", rule)})).unwrap();
        let data = json!({"f": value, "other": other});

        prop_assert_ne!(plain.check(&data), negated.check(&data));
    }

    // A failing negated rule reports not_<name> with the same parameters
    #[test]
    fn negated_failure_message(rule in arb_registered_rule(), value in arb_json(2)) {
        let negated = Validator::new(&json!({"f": format!("!{}", rule)})).unwrap();
        let report = negated.validate(&json!({"f": value}));
        if let Some(errors) = report.errors.get("f") {
            let entries = errors.entries();
            prop_assert_eq!(entries.len(), 1);
            let name = rule.split(':').next().unwrap();
            prop_assert_eq!(entries[0].msg.clone(), format!("not_{}", name));
        }
    }
}
