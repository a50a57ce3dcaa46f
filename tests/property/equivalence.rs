use super::strategies::{arb_data, arb_json, arb_rule_string, arb_rules};
use fieldrules::{ReportErrors, Validator, compile};
use proptest::prelude::*;
use serde_json::{Value, json};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Every generated rule string is accepted by the compiler
    #[test]
    fn generated_rule_strings_compile(rule in arb_rule_string()) {
        prop_assert!(compile(&json!({"f": rule})).is_ok(), "rejected: {}", rule);
    }

    // check(P, D) == validate(P, D).is_valid
    #[test]
    fn check_agrees_with_validate(rules in arb_rules(), data in arb_data()) {
        let v = Validator::new(&rules).unwrap();
        prop_assert_eq!(v.check(&data), v.validate(&data).is_valid);
    }

    // Agreement also holds for input that is not an object at all
    #[test]
    fn check_agrees_with_validate_on_any_input(rules in arb_rules(), data in arb_json(2)) {
        let v = Validator::new(&rules).unwrap();
        prop_assert_eq!(v.check(&data), v.validate(&data).is_valid);
    }

    // validate is idempotent on the same input
    #[test]
    fn validate_is_idempotent(rules in arb_rules(), data in arb_data()) {
        let v = Validator::new(&rules).unwrap();
        prop_assert_eq!(v.validate(&data), v.validate(&data));
    }

    // validate({}) reports not_found for exactly the required groups
    #[test]
    fn empty_object_counts_required_groups(rules in arb_rules()) {
        let v = Validator::new(&rules).unwrap();
        let report = v.validate(&json!({}));
        let required = v.plan().required_count();

        prop_assert_eq!(report.count, required);
        prop_assert_eq!(report.is_valid, required == 0);
        if let ReportErrors::Fields(map) = &report.errors {
            for errors in map.values() {
                let entries = errors.entries();
                prop_assert_eq!(entries.len(), 1);
                prop_assert_eq!(entries[0].msg.as_str(), "not_found");
            }
        }
    }

    // count always equals the number of reported fields
    #[test]
    fn count_matches_error_map(rules in arb_rules(), data in arb_data()) {
        let v = Validator::new(&rules).unwrap();
        let report = v.validate(&data);
        match &report.errors {
            ReportErrors::Fields(map) => prop_assert_eq!(report.count, map.len()),
            ReportErrors::NoData => prop_assert!(false, "object input produced NO_DATA"),
        }
    }

    // Non-object input against a non-empty plan is NO_DATA with every group counted
    #[test]
    fn non_object_input_is_no_data(rules in arb_rules(), n in any::<i64>()) {
        let v = Validator::new(&rules).unwrap();
        let report = v.validate(&Value::from(n));
        prop_assert_eq!(report.errors, ReportErrors::NoData);
        prop_assert_eq!(report.count, v.plan().len());
        prop_assert!(!v.check(&Value::from(n)));
    }
}
