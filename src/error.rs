use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of rule-grammar failure detected while compiling a rule set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileErrorKind {
    /// Rule string is empty (or only `?`).
    EmptyRule,
    /// Iterable prefix brackets are unbalanced or mismatched.
    IterableBrackets,
    /// Iterable prefix contains an unknown flag or a bad bound.
    IterableFlag,
    /// OR-group parentheses are unbalanced or an alternative is empty.
    Alternatives,
    /// Rule name is empty or does not match `[A-Za-z_0-9-]+`.
    RuleName,
    /// A `<path>` parameter is malformed.
    PathParam,
    /// A rules node is neither a string, an object, nor an array of strings.
    InvalidRuleValue,
    /// Two rule entries flatten to the same dotted field key.
    DuplicateKey,
}

/// Produced by the rule compiler when a rule set cannot be turned into a plan.
///
/// Compilation is all-or-nothing: when this is returned no plan exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} at '{key}' (rule: '{rule}')")]
pub struct CompileError {
    pub kind: CompileErrorKind,
    /// Dotted field key the failing rule belongs to (empty for the root).
    pub key: String,
    /// The offending rule string, or a JSON rendering of the offending value.
    pub rule: String,
    pub message: String,
}

impl CompileError {
    pub(crate) fn new(
        kind: CompileErrorKind,
        key: &str,
        rule: &str,
        message: impl Into<String>,
    ) -> Self {
        CompileError {
            kind,
            key: key.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Produced by the extension API when a registration is rejected.
///
/// A rejected registration never mutates the registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid rule name '{0}': must match [A-Za-z_0-9-]+")]
    InvalidName(String),
    #[error("invalid enum '{name}': {message}")]
    InvalidEnum { name: String, message: String },
    #[error("invalid schema '{name}': {source}")]
    Schema {
        name: String,
        #[source]
        source: CompileError,
    },
}

/// Combined error type for the text-based constructors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("invalid JSON rules: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "yaml")]
    #[error("invalid YAML rules: {0}")]
    Yaml(String),
}
