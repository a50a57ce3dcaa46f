//! [`Validator`]: a compiled plan bound to a rule registry.

use crate::error::{CompileError, Error, RegistryError};
use crate::evaluate;
use crate::parse;
use crate::registry::{Predicate, RuleRegistry, RuleTable};
use crate::types::{ValidationPlan, ValidationReport};
use crate::validate;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Compile once, check many.
///
/// Cloning is cheap: the plan and the registry are shared.
///
/// ```rust
/// use fieldrules::Validator;
/// use serde_json::json;
///
/// let v = Validator::new(&json!({
///     "name": "string_ne|min:3",
///     "age": "?integer|between:0,150",
/// }))
/// .expect("valid rules");
///
/// assert!(v.check(&json!({"name": "Alice", "age": 30})));
/// assert!(!v.check(&json!({"name": "Al"})));
///
/// let report = v.validate(&json!({"name": "Al"}));
/// assert_eq!(report.count, 1);
/// ```
#[derive(Clone)]
pub struct Validator {
    plan: Arc<ValidationPlan>,
    registry: Arc<RuleRegistry>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Compile `rules` against the global registry.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] for malformed rule strings or rule values.
    pub fn new(rules: &Value) -> Result<Self, CompileError> {
        Self::with_registry(rules, Arc::clone(RuleRegistry::global()))
    }

    /// Compile `rules` against an explicit registry.
    pub fn with_registry(rules: &Value, registry: Arc<RuleRegistry>) -> Result<Self, CompileError> {
        let plan = parse::compile(rules)?;
        Ok(Validator {
            plan: Arc::new(plan),
            registry,
        })
    }

    /// Compile rules given as JSON text.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let rules: Value = serde_json::from_str(input)?;
        Ok(Self::new(&rules)?)
    }

    /// Compile rules given as YAML text.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(input: &str) -> Result<Self, Error> {
        let rules: Value = serde_saphyr::from_str(input).map_err(|e| Error::Yaml(e.to_string()))?;
        Ok(Self::new(&rules)?)
    }

    pub fn plan(&self) -> &ValidationPlan {
        &self.plan
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// `true` iff `data` satisfies every field group.
    pub fn check(&self, data: &Value) -> bool {
        evaluate::check(&self.plan, &self.registry.snapshot(), data)
    }

    /// Full per-field report for `data`.
    pub fn validate(&self, data: &Value) -> ValidationReport {
        validate::validate(&self.plan, &self.registry.snapshot(), data)
    }

    /// [`check`](Self::check) on any serializable value. A value that fails
    /// to convert is treated as unusable input.
    pub fn check_serialize<T: Serialize + ?Sized>(&self, data: &T) -> bool {
        self.check(&to_input(data))
    }

    /// [`validate`](Self::validate) on any serializable value.
    pub fn validate_serialize<T: Serialize + ?Sized>(&self, data: &T) -> ValidationReport {
        self.validate(&to_input(data))
    }

    // ─── global extension API ──────────────────────────────────────────────

    /// Snapshot of the global registry.
    pub fn rules() -> Arc<RuleTable> {
        RuleRegistry::global().snapshot()
    }

    pub fn extend<P>(name: &str, predicate: P) -> Result<(), RegistryError>
    where
        P: Predicate + 'static,
    {
        RuleRegistry::global().extend(name, predicate)
    }

    pub fn extend_multi<I, K>(rules: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (K, Arc<dyn Predicate>)>,
        K: AsRef<str>,
    {
        RuleRegistry::global().extend_multi(rules)
    }

    pub fn extend_regex<I, K>(rules: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (K, Regex)>,
        K: AsRef<str>,
    {
        RuleRegistry::global().extend_regex(rules)
    }

    pub fn extend_enum<I, K>(rules: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (K, Vec<Value>)>,
        K: AsRef<str>,
    {
        RuleRegistry::global().extend_enum(rules)
    }

    pub fn extend_schema(name: &str, rules: &Value) -> Result<(), RegistryError> {
        RuleRegistry::global().extend_schema(name, rules)
    }
}

fn to_input<T: Serialize + ?Sized>(data: &T) -> Value {
    serde_json::to_value(data).unwrap_or(Value::Null)
}
