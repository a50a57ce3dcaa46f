use super::common::load_fixture;
use fieldrules::Validator;
use serde_json::Value;

#[derive(Debug, serde::Deserialize)]
struct CheckCase {
    id: String,
    name: String,
    rules: Value,
    data: Value,
    expected: bool,
}

#[test]
fn check_suite() {
    let cases: Vec<CheckCase> = load_fixture("check.yaml");
    assert!(!cases.is_empty(), "check.yaml has no cases");

    let mut failed = Vec::new();

    for case in &cases {
        let validator = Validator::new(&case.rules)
            .unwrap_or_else(|e| panic!("{}: rules failed to compile: {}", case.id, e));
        let result = validator.check(&case.data);
        if result != case.expected {
            failed.push(format!(
                "{} ({}): expected {}, got {}",
                case.id, case.name, case.expected, result
            ));
        }
        assert_eq!(
            result,
            validator.validate(&case.data).is_valid,
            "{}: check disagrees with validate",
            case.id
        );
    }

    assert!(failed.is_empty(), "check failures:\n{}", failed.join("\n"));
}
