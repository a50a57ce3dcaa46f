use super::common::{keys_in_order, load_fixture, values_structurally_equal};
use fieldrules::Validator;
use serde_json::Value;

#[derive(Debug, serde::Deserialize)]
struct ValidateCase {
    id: String,
    name: String,
    rules: Value,
    data: Value,
    expected: Value,
}

#[test]
fn validate_suite() {
    let cases: Vec<ValidateCase> = load_fixture("validate.yaml");
    assert!(!cases.is_empty(), "validate.yaml has no cases");

    let mut failed = Vec::new();

    for case in &cases {
        let validator = Validator::new(&case.rules)
            .unwrap_or_else(|e| panic!("{}: rules failed to compile: {}", case.id, e));
        let report = validator.validate(&case.data);
        let actual = serde_json::to_value(&report).unwrap();

        if !values_structurally_equal(&actual, &case.expected) {
            failed.push(format!(
                "{} ({}): expected {}, got {}",
                case.id, case.name, case.expected, actual
            ));
            continue;
        }

        // Error map order must follow plan order, not just contain the same keys.
        if let Some(expected_errors) = case.expected.get("errors") {
            assert_eq!(
                keys_in_order(&actual["errors"]),
                keys_in_order(expected_errors),
                "{}: error key order",
                case.id
            );
        }

        assert_eq!(
            validator.check(&case.data),
            report.is_valid,
            "{}: check disagrees with validate",
            case.id
        );
    }

    assert!(failed.is_empty(), "validate failures:\n{}", failed.join("\n"));
}
