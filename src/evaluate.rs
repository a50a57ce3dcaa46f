//! Boolean evaluation of a plan (`check`) and the pieces it shares with the
//! diagnostic walker in [`crate::validate`].

use crate::primitives::{hash_value, resolve_path};
use crate::registry::RuleTable;
use crate::types::*;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{trace, warn};

/// Checks `data` against `plan`, stopping at the first failing field group.
///
/// Non-object input passes only an empty plan. Unknown rule names fail the
/// rule instead of raising.
pub fn check(plan: &ValidationPlan, rules: &RuleTable, data: &Value) -> bool {
    if !data.is_object() {
        return plan.is_empty();
    }

    for group in &plan.groups {
        let Some(value) = resolve_path(data, &group.key) else {
            if group.sometimes {
                continue;
            }
            trace!(field = %group.key, "required field missing");
            return false;
        };

        if !group
            .alternatives
            .iter()
            .any(|set| check_rule_set(set, rules, value, data))
        {
            trace!(field = %group.key, "field failed every alternative");
            return false;
        }
    }

    true
}

fn check_rule_set(set: &RuleSet, rules: &RuleTable, value: &Value, root: &Value) -> bool {
    let Some(spec) = &set.iterable else {
        return set.rules.iter().all(|rule| {
            let params = resolve_params(&rule.params, root);
            passes(rules, rule, value, &params)
        });
    };

    let Some(items) = iterable_items(spec.kind, value) else {
        return false;
    };
    if size_violation(spec, items.len()).is_some() {
        return false;
    }

    let params: Vec<Vec<Value>> = set
        .rules
        .iter()
        .map(|rule| resolve_params(&rule.params, root))
        .collect();
    let mut seen = HashSet::with_capacity(if spec.unique { items.len() } else { 0 });

    for item in items {
        if spec.unique && !seen.insert(hash_value(item)) {
            return false;
        }
        if !set
            .rules
            .iter()
            .zip(&params)
            .all(|(rule, p)| passes(rules, rule, item, p))
        {
            return false;
        }
    }

    true
}

/// Whether a single invocation accepts `value`.
fn passes(rules: &RuleTable, rule: &RuleInvocation, value: &Value, params: &[Value]) -> bool {
    match rules.get(&rule.name) {
        Some(predicate) => predicate.test_with(rules, value, params) != rule.negate,
        None => {
            warn!(rule = %rule.name, "no predicate registered for rule");
            false
        }
    }
}

// ─── shared helpers ─────────────────────────────────────────────────────────

/// Resolves invocation parameters against the root input.
///
/// Literals pass through; `<path>` references that resolve to nothing become
/// `null`.
pub(crate) fn resolve_params(params: &[Param], root: &Value) -> Vec<Value> {
    params
        .iter()
        .map(|param| match param {
            Param::Literal(v) => v.clone(),
            Param::Path(path) => resolve_path(root, path).cloned().unwrap_or(Value::Null),
        })
        .collect()
}

/// The elements an iterable rule set runs over, or `None` when the value is
/// not the required container.
pub(crate) fn iterable_items(kind: ContainerKind, value: &Value) -> Option<Vec<&Value>> {
    match (kind, value) {
        (ContainerKind::Array, Value::Array(arr)) => Some(arr.iter().collect()),
        (ContainerKind::Dict, Value::Object(obj)) => Some(obj.values().collect()),
        _ => None,
    }
}

/// The error an out-of-bounds container size produces, if any.
pub(crate) fn size_violation(spec: &IterableSpec, len: usize) -> Option<ErrorEntry> {
    if let Some(min) = spec.min
        && len < min
    {
        return Some(ErrorEntry::new(MSG_ITERABLE_MIN, vec![Value::from(min)]));
    }
    if let Some(max) = spec.max
        && len > max
    {
        return Some(ErrorEntry::new(MSG_ITERABLE_MAX, vec![Value::from(max)]));
    }
    None
}
