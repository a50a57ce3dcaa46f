use super::common::{load_fixture, values_structurally_equal};
use fieldrules::compile;
use serde_json::Value;

#[derive(Debug, serde::Deserialize)]
struct CompileSuite {
    plans: Vec<PlanCase>,
    errors: Vec<ErrorCase>,
}

#[derive(Debug, serde::Deserialize)]
struct PlanCase {
    id: String,
    name: String,
    rules: Value,
    plan: Value,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorCase {
    id: String,
    rules: Value,
    kind: String,
}

#[test]
fn compile_plan_suite() {
    let suite: CompileSuite = load_fixture("compile.yaml");
    assert!(!suite.plans.is_empty());

    for case in &suite.plans {
        let plan = compile(&case.rules)
            .unwrap_or_else(|e| panic!("{} ({}): unexpected error: {}", case.id, case.name, e));
        let actual = serde_json::to_value(&plan).unwrap();
        assert!(
            values_structurally_equal(&actual, &case.plan),
            "{} ({}): expected {}, got {}",
            case.id,
            case.name,
            case.plan,
            actual
        );
    }
}

#[test]
fn compile_error_suite() {
    let suite: CompileSuite = load_fixture("compile.yaml");
    assert!(!suite.errors.is_empty());

    for case in &suite.errors {
        match compile(&case.rules) {
            Ok(plan) => panic!("{}: expected {} error, got plan {:?}", case.id, case.kind, plan),
            Err(err) => {
                let kind = serde_json::to_value(&err.kind).unwrap();
                assert_eq!(
                    kind,
                    Value::String(case.kind.clone()),
                    "{}: wrong error kind ({})",
                    case.id,
                    err
                );
            }
        }
    }
}
