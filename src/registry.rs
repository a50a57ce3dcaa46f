//! Predicate registry: the name → predicate table consulted during
//! evaluation, and the extension API that mutates it.
//!
//! The live table sits behind an [`ArcSwap`]. Every mutation copies the
//! current table, applies the whole batch and publishes the copy with a single
//! store, so a reader sees either none or all of a batch. Writers serialize on
//! a mutex; readers never block.

use crate::builtins;
use crate::error::RegistryError;
use crate::evaluate;
use crate::parse;
use crate::primitives::canonical_number;
use crate::types::ValidationPlan;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, LazyLock, Weak};
use tracing::debug;

static RULE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_0-9-]+$").expect("static rule name pattern"));

/// Whether `name` is usable as a rule name (`[A-Za-z_0-9-]+`).
pub fn is_valid_rule_name(name: &str) -> bool {
    RULE_NAME_RE.is_match(name)
}

// ─── Predicate ──────────────────────────────────────────────────────────────

/// A named check applied to a field value.
///
/// `params` are the rule parameters: literal text as JSON strings, resolved
/// `<path>` references as whatever the input holds there (`null` when
/// absent). Implementations must be pure.
pub trait Predicate: Send + Sync {
    fn test(&self, value: &Value, params: &[Value]) -> bool;

    /// [`test`](Self::test) inside an evaluation that already holds `rules`.
    ///
    /// The engine always calls this form. Predicates that look up other
    /// rules must resolve them in `rules` so one `check` or `validate` call
    /// sees a single registry version.
    fn test_with(&self, _rules: &RuleTable, value: &Value, params: &[Value]) -> bool {
        self.test(value, params)
    }
}

impl<F> Predicate for F
where
    F: Fn(&Value, &[Value]) -> bool + Send + Sync,
{
    fn test(&self, value: &Value, params: &[Value]) -> bool {
        self(value, params)
    }
}

/// Wrap a closure as a shareable predicate.
///
/// Spelling the bound out here lets closures passed to
/// [`RuleRegistry::extend_multi`] infer their argument types.
pub fn rule<F>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Passes for strings matched by a pattern compiled once at registration.
pub struct RegexRule {
    pattern: Regex,
}

impl Predicate for RegexRule {
    fn test(&self, value: &Value, _params: &[Value]) -> bool {
        value.as_str().is_some_and(|s| self.pattern.is_match(s))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EnumMember {
    Str(String),
    Num(String),
}

/// Passes for strings or numbers contained in a fixed set.
pub struct EnumRule {
    members: HashSet<EnumMember>,
}

impl EnumRule {
    fn member(value: &Value) -> Option<EnumMember> {
        match value {
            Value::String(s) => Some(EnumMember::Str(s.clone())),
            Value::Number(n) => Some(EnumMember::Num(canonical_number(n))),
            _ => None,
        }
    }
}

impl Predicate for EnumRule {
    fn test(&self, value: &Value, _params: &[Value]) -> bool {
        EnumRule::member(value).is_some_and(|m| self.members.contains(&m))
    }
}

/// Runs a nested plan's `check` against the value.
///
/// Inside an evaluation the nested plan uses the caller's table. Called
/// directly it takes a snapshot of the registry it was registered into,
/// held weakly since the registry owns this rule.
pub struct SchemaRule {
    plan: Arc<ValidationPlan>,
    registry: Weak<RuleRegistry>,
}

impl Predicate for SchemaRule {
    fn test(&self, value: &Value, _params: &[Value]) -> bool {
        match self.registry.upgrade() {
            Some(registry) => evaluate::check(&self.plan, &registry.snapshot(), value),
            None => false,
        }
    }

    fn test_with(&self, rules: &RuleTable, value: &Value, _params: &[Value]) -> bool {
        evaluate::check(&self.plan, rules, value)
    }
}

// ─── RuleTable ──────────────────────────────────────────────────────────────

/// An immutable view of the registered rules.
#[derive(Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, Arc<dyn Predicate>>,
}

impl RuleTable {
    pub fn get(&self, name: &str) -> Option<&dyn Predicate> {
        self.rules.get(name).map(|p| p.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &str, predicate: Arc<dyn Predicate>) {
        self.rules.insert(name.to_string(), predicate);
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

// ─── RuleRegistry ───────────────────────────────────────────────────────────

static GLOBAL: LazyLock<Arc<RuleRegistry>> = LazyLock::new(|| Arc::new(RuleRegistry::new()));

/// Mutable, shareable rule registry.
pub struct RuleRegistry {
    live: ArcSwap<RuleTable>,
    write: Mutex<()>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.live.load().len())
            .finish()
    }
}

impl RuleRegistry {
    /// A registry holding the built-in rules.
    pub fn new() -> Self {
        Self::from_table(builtins::default_table())
    }

    /// A registry holding no rules at all.
    pub fn empty() -> Self {
        Self::from_table(RuleTable::default())
    }

    fn from_table(table: RuleTable) -> Self {
        RuleRegistry {
            live: ArcSwap::from_pointee(table),
            write: Mutex::new(()),
        }
    }

    /// The process-wide registry used by [`crate::Validator::new`].
    pub fn global() -> &'static Arc<RuleRegistry> {
        &GLOBAL
    }

    /// The current table. Later mutations never alter a returned snapshot.
    pub fn snapshot(&self) -> Arc<RuleTable> {
        self.live.load_full()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.live.load().contains(name)
    }

    /// Register a single predicate, replacing any rule of the same name.
    pub fn extend<P>(&self, name: &str, predicate: P) -> Result<(), RegistryError>
    where
        P: Predicate + 'static,
    {
        let name = checked_name(name)?;
        self.install(vec![(name, Arc::new(predicate) as Arc<dyn Predicate>)]);
        Ok(())
    }

    /// Register several predicates at once. Nothing is registered when any
    /// name is invalid.
    pub fn extend_multi<I, K>(&self, rules: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (K, Arc<dyn Predicate>)>,
        K: AsRef<str>,
    {
        let batch = rules
            .into_iter()
            .map(|(name, predicate)| -> Result<_, RegistryError> {
                Ok((checked_name(name.as_ref())?, predicate))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.install(batch);
        Ok(())
    }

    /// Register one string-matching rule per `(name, regex)` pair.
    pub fn extend_regex<I, K>(&self, rules: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (K, Regex)>,
        K: AsRef<str>,
    {
        let batch = rules
            .into_iter()
            .map(|(name, pattern)| -> Result<_, RegistryError> {
                let name = checked_name(name.as_ref())?;
                Ok((name, Arc::new(RegexRule { pattern }) as Arc<dyn Predicate>))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.install(batch);
        Ok(())
    }

    /// Register one membership rule per `(name, values)` pair.
    ///
    /// Each value list must be non-empty and hold only strings or numbers.
    pub fn extend_enum<I, K>(&self, rules: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (K, Vec<Value>)>,
        K: AsRef<str>,
    {
        let batch = rules
            .into_iter()
            .map(|(name, values)| -> Result<_, RegistryError> {
                let name = checked_name(name.as_ref())?;
                let predicate = enum_rule(&name, &values)?;
                Ok((name, Arc::new(predicate) as Arc<dyn Predicate>))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.install(batch);
        Ok(())
    }

    /// Compile `rules` into a nested plan and register a rule that checks a
    /// value against it.
    pub fn extend_schema(self: &Arc<Self>, name: &str, rules: &Value) -> Result<(), RegistryError> {
        let name = checked_name(name)?;
        let plan = parse::compile(rules).map_err(|source| RegistryError::Schema {
            name: name.clone(),
            source,
        })?;
        let predicate = SchemaRule {
            plan: Arc::new(plan),
            registry: Arc::downgrade(self),
        };
        self.install(vec![(name, Arc::new(predicate) as Arc<dyn Predicate>)]);
        Ok(())
    }

    fn install(&self, batch: Vec<(String, Arc<dyn Predicate>)>) {
        if batch.is_empty() {
            return;
        }

        let _guard = self.write.lock();
        let mut next = RuleTable::clone(&self.live.load());
        let names: Vec<&str> = batch.iter().map(|(name, _)| name.as_str()).collect();
        debug!(rules = ?names, "registering rules");
        for (name, predicate) in &batch {
            next.insert(name, Arc::clone(predicate));
        }
        let size = next.len();
        self.live.store(Arc::new(next));
        debug!(size, "rule registry updated");
    }
}

fn checked_name(name: &str) -> Result<String, RegistryError> {
    if is_valid_rule_name(name) {
        Ok(name.to_string())
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}

fn enum_rule(name: &str, values: &[Value]) -> Result<EnumRule, RegistryError> {
    if values.is_empty() {
        return Err(RegistryError::InvalidEnum {
            name: name.to_string(),
            message: "value list is empty".to_string(),
        });
    }

    let members = values
        .iter()
        .map(|v| {
            EnumRule::member(v).ok_or_else(|| RegistryError::InvalidEnum {
                name: name.to_string(),
                message: format!("only strings and numbers are allowed, got {}", v),
            })
        })
        .collect::<Result<HashSet<_>, _>>()?;

    Ok(EnumRule { members })
}
