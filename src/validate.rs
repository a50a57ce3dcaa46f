//! Exhaustive evaluation of a plan.
//!
//! Visits **every** field group and records every failure instead of
//! stopping at the first one. Never fails on malformed input data.

use crate::evaluate::{iterable_items, resolve_params, size_violation};
use crate::primitives::{hash_value, resolve_path};
use crate::registry::RuleTable;
use crate::types::*;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Validates `data` against `plan` and reports all failures.
///
/// For non-object input the report is valid with no errors when the plan is
/// empty; otherwise `errors` is [`ReportErrors::NoData`] and every field group
/// counts as invalid.
pub fn validate(plan: &ValidationPlan, rules: &RuleTable, data: &Value) -> ValidationReport {
    if !data.is_object() {
        if plan.is_empty() {
            return ValidationReport {
                is_valid: true,
                count: 0,
                errors: ReportErrors::Fields(IndexMap::new()),
            };
        }
        return ValidationReport {
            is_valid: false,
            count: plan.len(),
            errors: ReportErrors::NoData,
        };
    }

    let mut errors = IndexMap::new();
    let mut count = 0;

    for group in &plan.groups {
        let failed = match resolve_path(data, &group.key) {
            None if group.sometimes => None,
            None => Some(FieldErrors::Single(vec![ErrorEntry::new(
                MSG_NOT_FOUND,
                Vec::new(),
            )])),
            Some(value) => validate_group(group, rules, value, data),
        };

        if let Some(field_errors) = failed {
            count += 1;
            errors.insert(group.key.clone(), field_errors);
        }
    }

    ValidationReport {
        is_valid: count == 0,
        count,
        errors: ReportErrors::Fields(errors),
    }
}

/// `None` when some alternative passes; otherwise the recorded errors.
fn validate_group(
    group: &FieldGroup,
    rules: &RuleTable,
    value: &Value,
    root: &Value,
) -> Option<FieldErrors> {
    let mut failures = Vec::with_capacity(group.alternatives.len());

    for set in &group.alternatives {
        let errs = validate_rule_set(set, rules, value, root);
        if errs.is_empty() {
            return None;
        }
        failures.push(errs);
    }

    if failures.len() == 1 {
        failures.pop().map(FieldErrors::Single)
    } else {
        Some(FieldErrors::Alternatives(failures))
    }
}

fn validate_rule_set(
    set: &RuleSet,
    rules: &RuleTable,
    value: &Value,
    root: &Value,
) -> Vec<ErrorEntry> {
    let Some(spec) = &set.iterable else {
        return set
            .rules
            .iter()
            .filter_map(|rule| {
                let params = resolve_params(&rule.params, root);
                rule_failure(rules, rule, value, params)
            })
            .collect();
    };

    let Some(items) = iterable_items(spec.kind, value) else {
        return vec![ErrorEntry::new(MSG_ITERABLE, Vec::new())];
    };
    if let Some(violation) = size_violation(spec, items.len()) {
        return vec![violation];
    }

    let params: Vec<Vec<Value>> = set
        .rules
        .iter()
        .map(|rule| resolve_params(&rule.params, root))
        .collect();
    let mut errs = Vec::new();
    let mut seen = HashSet::new();
    let mut check_unique = spec.unique;

    for (idx, item) in items.into_iter().enumerate() {
        if check_unique && !seen.insert(hash_value(item)) {
            errs.insert(0, ErrorEntry::new(MSG_ITERABLE_UNIQUE, Vec::new()));
            check_unique = false;
        }
        for (rule, p) in set.rules.iter().zip(&params) {
            if let Some(mut entry) = rule_failure(rules, rule, item, p.clone()) {
                entry.idx = Some(idx);
                errs.push(entry);
            }
        }
    }

    errs
}

/// The error a single invocation produces against `value`, if it fails.
fn rule_failure(
    rules: &RuleTable,
    rule: &RuleInvocation,
    value: &Value,
    params: Vec<Value>,
) -> Option<ErrorEntry> {
    let Some(predicate) = rules.get(&rule.name) else {
        warn!(rule = %rule.name, "no predicate registered for rule");
        return Some(ErrorEntry::new(
            MSG_RULE_NOT_FOUND,
            vec![Value::String(rule.name.clone())],
        ));
    };

    if predicate.test_with(rules, value, &params) != rule.negate {
        return None;
    }

    let msg = if rule.negate {
        format!("not_{}", rule.name)
    } else {
        rule.name.clone()
    };
    Some(ErrorEntry::new(msg, params))
}
