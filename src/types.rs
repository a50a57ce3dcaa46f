use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Validation Plan ────────────────────────────────────────────────────────

/// Compiled, immutable form of a rule set.
///
/// Field groups are kept in the enumeration order of the raw rules object,
/// which is also the short-circuit order of `check` and the key order of the
/// `validate` error map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationPlan {
    pub groups: Vec<FieldGroup>,
}

impl ValidationPlan {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups that report `not_found` when their field is absent.
    pub fn required_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.sometimes).count()
    }
}

/// One compiled rule string, keyed by the dotted path of its field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub key: String,
    /// Field is optional: absence skips the group instead of failing it.
    pub sometimes: bool,
    /// One entry for a plain rule string; several for an OR-group.
    pub alternatives: Vec<RuleSet>,
}

/// A conjunction of rule invocations, optionally applied per element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterable: Option<IterableSpec>,
    pub rules: Vec<RuleInvocation>,
}

/// A single `[!]name[:params]` occurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleInvocation {
    pub name: String,
    pub negate: bool,
    pub params: Vec<Param>,
}

/// A rule parameter: either the literal text or a reference into the input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    Literal(Value),
    /// Dotted path resolved against the root input at evaluation time.
    Path(String),
}

/// Container shape required by an iterable prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// `[...]`: a JSON array.
    Array,
    /// `{...}`: a JSON object, validated over its values.
    Dict,
}

/// Per-element application of a rule set, with size bounds and uniqueness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterableSpec {
    pub kind: ContainerKind,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl IterableSpec {
    pub fn new(kind: ContainerKind) -> Self {
        IterableSpec {
            kind,
            unique: false,
            min: None,
            max: None,
        }
    }
}

// ─── Evaluation Result ──────────────────────────────────────────────────────

/// Message recorded when a required field is absent.
pub const MSG_NOT_FOUND: &str = "not_found";
/// Message recorded when a rule name has no registered predicate.
pub const MSG_RULE_NOT_FOUND: &str = "rule_not_found";
/// Message recorded when an iterable value has the wrong container type.
pub const MSG_ITERABLE: &str = "iterable";
pub const MSG_ITERABLE_MIN: &str = "iterable_min";
pub const MSG_ITERABLE_MAX: &str = "iterable_max";
pub const MSG_ITERABLE_UNIQUE: &str = "iterable_unique";

/// Full diagnostic result of `validate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Number of invalid field groups.
    pub count: usize,
    pub errors: ReportErrors,
}

/// Either the `NO_DATA` sentinel or the per-field error map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReportErrors {
    #[serde(rename = "NO_DATA")]
    NoData,
    #[serde(untagged)]
    Fields(IndexMap<String, FieldErrors>),
}

impl ReportErrors {
    /// Errors recorded for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&FieldErrors> {
        match self {
            ReportErrors::NoData => None,
            ReportErrors::Fields(map) => map.get(key),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ReportErrors::NoData)
    }
}

/// Errors for one field group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldErrors {
    /// The group had a single alternative (or the field was missing).
    Single(Vec<ErrorEntry>),
    /// One error list per failed OR-group alternative, in plan order.
    Alternatives(Vec<Vec<ErrorEntry>>),
}

impl FieldErrors {
    /// All entries, flattened across alternatives.
    pub fn entries(&self) -> Vec<&ErrorEntry> {
        match self {
            FieldErrors::Single(list) => list.iter().collect(),
            FieldErrors::Alternatives(lists) => lists.iter().flatten().collect(),
        }
    }
}

/// One reported failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Element position, only for failures inside an iterable.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub idx: Option<usize>,
    pub msg: String,
    pub params: Vec<Value>,
}

impl ErrorEntry {
    pub fn new(msg: impl Into<String>, params: Vec<Value>) -> Self {
        ErrorEntry {
            idx: None,
            msg: msg.into(),
            params,
        }
    }

    pub fn at(idx: usize, msg: impl Into<String>, params: Vec<Value>) -> Self {
        ErrorEntry {
            idx: Some(idx),
            msg: msg.into(),
            params,
        }
    }
}
