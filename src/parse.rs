//! Rule compiler: raw rules object → [`ValidationPlan`].
//!
//! ```text
//! rulestring      := ["?"] [iterable-prefix] alternatives
//! alternatives    := rulelist | "(" rulelist ")" {"(" rulelist ")"}
//! rulelist        := rule {"|" rule}
//! rule            := ["!"] name [":" paramlist]
//! paramlist       := param {"," param}
//! param           := "<" path ">" | literal
//! iterable-prefix := "[" flags "]" | "{" flags "}"
//! flags           := ["unique"] ["|min:" int] ["|max:" int]
//! ```
//!
//! Every production returns a `Result`; the first failure aborts the whole
//! compilation so no partially built plan ever escapes.

use crate::error::{CompileError, CompileErrorKind};
use crate::registry::is_valid_rule_name;
use crate::types::*;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Compile a raw rules object into a validation plan.
///
/// Field groups follow the key enumeration order of `raw`, depth-first into
/// nested objects (keys joined with `.`). An array value is an OR-group: each
/// element is one alternative rule string.
pub fn compile(raw: &Value) -> Result<ValidationPlan, CompileError> {
    let obj = raw.as_object().ok_or_else(|| {
        CompileError::new(
            CompileErrorKind::InvalidRuleValue,
            "",
            &render(raw),
            "rules must be an object",
        )
    })?;

    let mut groups = Vec::new();
    compile_object(obj, "", &mut groups, &mut HashSet::new())?;
    debug!(groups = groups.len(), "compiled validation plan");

    Ok(ValidationPlan { groups })
}

fn compile_object(
    obj: &Map<String, Value>,
    prefix: &str,
    groups: &mut Vec<FieldGroup>,
    seen: &mut HashSet<String>,
) -> Result<(), CompileError> {
    for (name, node) in obj {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        // `"a.b"` and `{a: {b}}` flatten to the same key
        if !node.is_object() && !seen.insert(key.clone()) {
            return Err(CompileError::new(
                CompileErrorKind::DuplicateKey,
                &key,
                &node.as_str().map_or_else(|| render(node), str::to_string),
                "field key is already defined",
            ));
        }

        match node {
            Value::String(source) => groups.push(parse_rule_string(&key, source)?),
            Value::Object(inner) => compile_object(inner, &key, groups, seen)?,
            Value::Array(items) => groups.push(parse_or_group(&key, items)?),
            other => {
                return Err(CompileError::new(
                    CompileErrorKind::InvalidRuleValue,
                    &key,
                    &render(other),
                    "invalid rule value",
                ));
            }
        }
    }
    Ok(())
}

fn parse_or_group(key: &str, items: &[Value]) -> Result<FieldGroup, CompileError> {
    if items.is_empty() {
        return Err(CompileError::new(
            CompileErrorKind::InvalidRuleValue,
            key,
            "[]",
            "OR-group has no alternatives",
        ));
    }

    let mut group = FieldGroup {
        key: key.to_string(),
        sometimes: false,
        alternatives: Vec::with_capacity(items.len()),
    };

    for item in items {
        let source = item.as_str().ok_or_else(|| {
            CompileError::new(
                CompileErrorKind::InvalidRuleValue,
                key,
                &render(item),
                "OR-group alternatives must be rule strings",
            )
        })?;
        let parsed = parse_rule_string(key, source)?;
        group.sometimes |= parsed.sometimes;
        group.alternatives.extend(parsed.alternatives);
    }

    Ok(group)
}

// ─── rulestring ─────────────────────────────────────────────────────────────

/// Parse one rule string into a field group keyed by `key`.
pub fn parse_rule_string(key: &str, source: &str) -> Result<FieldGroup, CompileError> {
    let cx = Cx { key, source };

    let mut rest = source.trim();
    let sometimes = match rest.strip_prefix('?') {
        Some(stripped) => {
            rest = stripped.trim_start();
            true
        }
        None => false,
    };
    if rest.is_empty() {
        return Err(cx.error(CompileErrorKind::EmptyRule, "empty rule string"));
    }

    let (iterable, rest) = parse_iterable_prefix(&cx, rest)?;
    let alternatives = parse_alternatives(&cx, rest, iterable)?;

    Ok(FieldGroup {
        key: key.to_string(),
        sometimes,
        alternatives,
    })
}

/// Location of the rule string being parsed, for error reporting.
struct Cx<'a> {
    key: &'a str,
    source: &'a str,
}

impl Cx<'_> {
    fn error(&self, kind: CompileErrorKind, message: impl Into<String>) -> CompileError {
        CompileError::new(kind, self.key, self.source, message)
    }
}

// ─── iterable-prefix ────────────────────────────────────────────────────────

fn parse_iterable_prefix<'s>(
    cx: &Cx<'_>,
    rest: &'s str,
) -> Result<(Option<IterableSpec>, &'s str), CompileError> {
    let (kind, close) = match rest.chars().next() {
        Some('[') => (ContainerKind::Array, ']'),
        Some('{') => (ContainerKind::Dict, '}'),
        Some(']') | Some('}') => {
            return Err(cx.error(
                CompileErrorKind::IterableBrackets,
                "closing bracket without opening bracket",
            ));
        }
        _ => return Ok((None, rest)),
    };

    let end = rest.find(close).ok_or_else(|| {
        cx.error(
            CompileErrorKind::IterableBrackets,
            format!("unterminated iterable prefix, expected '{}'", close),
        )
    })?;
    let body = &rest[1..end];
    if body.contains(['[', ']', '{', '}']) {
        return Err(cx.error(
            CompileErrorKind::IterableBrackets,
            "mismatched brackets in iterable prefix",
        ));
    }

    let spec = parse_iterable_flags(cx, kind, body)?;
    Ok((Some(spec), rest[end + 1..].trim_start()))
}

fn parse_iterable_flags(
    cx: &Cx<'_>,
    kind: ContainerKind,
    body: &str,
) -> Result<IterableSpec, CompileError> {
    let mut spec = IterableSpec::new(kind);
    let mut seen_unique = false;

    for flag in body.split('|').map(str::trim).filter(|f| !f.is_empty()) {
        if flag == "unique" {
            if seen_unique {
                return Err(cx.error(CompileErrorKind::IterableFlag, "duplicate 'unique' flag"));
            }
            seen_unique = true;
            spec.unique = true;
            continue;
        }

        let (name, bound) = flag
            .split_once(':')
            .map(|(n, b)| (n.trim(), b.trim()))
            .ok_or_else(|| {
                cx.error(
                    CompileErrorKind::IterableFlag,
                    format!("unknown iterable flag '{}'", flag),
                )
            })?;
        let bound: usize = bound.parse().map_err(|_| {
            cx.error(
                CompileErrorKind::IterableFlag,
                format!("iterable bound '{}' is not a non-negative integer", flag),
            )
        })?;

        let slot = match name {
            "min" => &mut spec.min,
            "max" => &mut spec.max,
            _ => {
                return Err(cx.error(
                    CompileErrorKind::IterableFlag,
                    format!("unknown iterable flag '{}'", flag),
                ));
            }
        };
        if slot.is_some() {
            return Err(cx.error(
                CompileErrorKind::IterableFlag,
                format!("duplicate '{}' flag", name),
            ));
        }
        *slot = Some(bound);
    }

    if let (Some(min), Some(max)) = (spec.min, spec.max)
        && min > max
    {
        return Err(cx.error(
            CompileErrorKind::IterableFlag,
            format!("iterable min {} exceeds max {}", min, max),
        ));
    }

    Ok(spec)
}

// ─── alternatives ───────────────────────────────────────────────────────────

fn parse_alternatives(
    cx: &Cx<'_>,
    rest: &str,
    outer: Option<IterableSpec>,
) -> Result<Vec<RuleSet>, CompileError> {
    if rest.is_empty() {
        return Err(cx.error(
            CompileErrorKind::EmptyRule,
            "iterable prefix is not followed by any rule",
        ));
    }

    if !rest.starts_with('(') {
        return Ok(vec![RuleSet {
            iterable: outer,
            rules: parse_rule_list(cx, rest)?,
        }]);
    }

    let mut alternatives = Vec::new();
    let mut remaining = rest;

    while !remaining.is_empty() {
        let opened = remaining.strip_prefix('(').ok_or_else(|| {
            cx.error(
                CompileErrorKind::Alternatives,
                "expected '(' to start the next alternative",
            )
        })?;
        let close = opened.find(')').ok_or_else(|| {
            cx.error(CompileErrorKind::Alternatives, "unbalanced parentheses")
        })?;
        let body = opened[..close].trim();
        if body.contains('(') {
            return Err(cx.error(
                CompileErrorKind::Alternatives,
                "nested parentheses are not allowed",
            ));
        }

        let (inner, body) = parse_iterable_prefix(cx, body)?;
        let iterable = match (&outer, inner) {
            (Some(_), Some(_)) => {
                return Err(cx.error(
                    CompileErrorKind::IterableBrackets,
                    "alternative repeats the outer iterable prefix",
                ));
            }
            (Some(spec), None) => Some(spec.clone()),
            (None, inner) => inner,
        };
        if body.is_empty() {
            return Err(cx.error(CompileErrorKind::Alternatives, "empty alternative"));
        }

        alternatives.push(RuleSet {
            iterable,
            rules: parse_rule_list(cx, body)?,
        });
        remaining = opened[close + 1..].trim_start();
    }

    Ok(alternatives)
}

// ─── rulelist / rule / param ────────────────────────────────────────────────

fn parse_rule_list(cx: &Cx<'_>, text: &str) -> Result<Vec<RuleInvocation>, CompileError> {
    text.split('|').map(|rule| parse_rule(cx, rule)).collect()
}

fn parse_rule(cx: &Cx<'_>, text: &str) -> Result<RuleInvocation, CompileError> {
    let text = text.trim();
    let (negate, text) = match text.strip_prefix('!') {
        Some(stripped) => (true, stripped.trim_start()),
        None => (false, text),
    };

    let (name, params) = match text.split_once(':') {
        Some((name, params)) => (name.trim(), Some(params)),
        None => (text, None),
    };

    if name.is_empty() {
        return Err(cx.error(CompileErrorKind::RuleName, "empty rule name"));
    }
    if !is_valid_rule_name(name) {
        return Err(cx.error(
            CompileErrorKind::RuleName,
            format!("invalid rule name '{}'", name),
        ));
    }

    let params = match params {
        Some(list) if !list.trim().is_empty() => list
            .split(',')
            .map(|p| parse_param(cx, p))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(RuleInvocation {
        name: name.to_string(),
        negate,
        params,
    })
}

fn parse_param(cx: &Cx<'_>, text: &str) -> Result<Param, CompileError> {
    let text = text.trim();
    let Some(opened) = text.strip_prefix('<') else {
        return Ok(Param::Literal(Value::String(text.to_string())));
    };

    let path = opened.strip_suffix('>').ok_or_else(|| {
        cx.error(
            CompileErrorKind::PathParam,
            format!("path parameter '{}' is missing '>'", text),
        )
    })?;
    if path.is_empty()
        || path.contains(['<', '>'])
        || path.chars().any(char::is_whitespace)
        || path.starts_with('.')
        || path.ends_with('.')
    {
        return Err(cx.error(
            CompileErrorKind::PathParam,
            format!("malformed path parameter '{}'", text),
        ));
    }

    Ok(Param::Path(path.to_string()))
}

fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
