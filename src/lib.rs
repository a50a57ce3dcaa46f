//! Runtime validation of JSON objects against a compact rule-string grammar.
//!
//! Rules are written per field, compiled once into an immutable
//! [`ValidationPlan`], and evaluated any number of times:
//!
//! ```text
//! rules (Value) → compile → ValidationPlan → check(data)    → bool
//!                                          → validate(data) → ValidationReport
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use fieldrules::{FieldErrors, Validator};
//! use serde_json::json;
//!
//! let v = Validator::new(&json!({
//!     "username": "string_ne|min:3|max:20",
//!     "password": "string_ne|min:8",
//!     "confirm": "equal_to:<password>",
//!     "tags": "?[unique|max:5]string_ne",
//!     "address": {
//!         "city": "string_ne",
//!         "zip": "(integer)(string_ne|size:5)",
//!     },
//! }))
//! .expect("valid rules");
//!
//! let report = v.validate(&json!({
//!     "username": "al",
//!     "password": "hunter22",
//!     "confirm": "hunter22",
//!     "address": {"city": "Ghent", "zip": 9000},
//! }));
//! assert!(!report.is_valid);
//! assert_eq!(report.count, 1);
//! assert!(matches!(report.errors.get("username"), Some(FieldErrors::Single(_))));
//! ```
//!
//! # Rule strings
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `?rule` | field is optional |
//! | `a\|b` | both `a` and `b` must pass |
//! | `(a)(b)` | either alternative may pass |
//! | `!rule` | negate one rule |
//! | `rule:p1,p2` | literal parameters |
//! | `rule:<other.path>` | parameter read from the input at check time |
//! | `[unique\|min:1\|max:9]rule` | apply to each array element |
//! | `{min:1}rule` | apply to each object value |
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `yaml`  | yes     | [`Validator::from_yaml_str`] via serde-saphyr. |

pub mod builtins;
pub mod error;
pub mod evaluate;
pub mod parse;
pub mod primitives;
pub mod registry;
pub mod types;
pub mod validate;
pub mod validator;

pub use error::*;
pub use registry::{Predicate, RuleRegistry, RuleTable};
pub use types::*;
pub use validator::Validator;

// Re-export entry-point functions at the crate root for convenience.
pub use evaluate::check;
pub use parse::compile;
pub use validate::validate;
