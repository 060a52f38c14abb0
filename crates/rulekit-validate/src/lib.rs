//! # Rulekit Validation
//!
//! Declarative validation of nested data with compact rule strings such as
//! `"required|email|max:100"`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rulekit_validate::prelude::*;
//! use serde_json::json;
//!
//! let rules = RuleMap::from([
//!     ("name|Name", "required|max:25"),
//!     ("email", "required|email"),
//!     ("password", "required|length:6,32"),
//!     ("password_confirmation", "same:password"),
//!     ("items.*", "required|string|max:5"),
//!     ("status", "default:active|in:active,banned"),
//! ]);
//!
//! let mut validator = Validator::new(rules).batch(true);
//! let data = Value::from(json!({"name": "kit", "email": "kit@example.com"}));
//! if !validator.check(&data) {
//!     for failure in validator.failures() {
//!         println!("{}: {}", failure.field, failure.message);
//!     }
//! }
//! ```
//!
//! ## Rule Strings
//!
//! - Tokens are separated by `|`; a token is `name` or `name:param`.
//! - Field keys are dotted (`user.name`) or bracketed (`user[name]`), may
//!   carry a display title (`user.name|User name`) and may expand over a
//!   list (`items.*.sku`).
//! - Empty fields skip every rule unless the chain holds `required`.
//! - Unknown rule names resolve to custom rules registered with
//!   [`RuleRegistry::extend`], then to named patterns, then to the name
//!   read as a regular expression.
//!
//! ## Error Format
//!
//! Fail-fast sessions record one message; batch sessions map each failed
//! field to its message. [`ValidateException`] serializes to:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "email must be a valid email address",
//!     "fields": [
//!       {"field": "email", "code": "email", "message": "email must be a valid email address"}
//!     ]
//!   }
//! }
//! ```

mod config;
mod defaults;
mod error;
mod evaluator;
mod file;
mod messages;
mod path;
mod predicates;
mod registry;
mod rule;
mod rules;
mod scene;
mod validator;
mod value;
mod wildcard;


pub use config::{ConfigError, ValidatorConfig};
pub use defaults::{apply_defaults, coerce_default};
pub use error::{ErrorState, FieldError, RuleSyntaxError, ValidateException};
pub use file::{ImageInfo, ImageKind, UploadedFile};
pub use messages::{default_message, render, Locale};
pub use path::{exists, get_value, lookup, normalize_path, set_value, FieldKey};
pub use predicates::date::parse_date;
pub use registry::{CustomRule, RuleRegistry};
pub use rule::{tokenize, ClosureRule, Condition, FieldRules, RuleKind, RuleOutcome, RuleToken};
pub use rules::{RuleInput, RuleMap};
pub use scene::Scene;
pub use validator::Validator;
pub use value::{is_numeric_str, Value};
pub use wildcard::{expand_wildcards, ExpandedField};

/// Prelude module for validation
pub mod prelude {
    pub use crate::config::ValidatorConfig;
    pub use crate::error::{ErrorState, FieldError, RuleSyntaxError, ValidateException};
    pub use crate::file::UploadedFile;
    pub use crate::messages::Locale;
    pub use crate::registry::{CustomRule, RuleRegistry};
    pub use crate::rule::{FieldRules, RuleOutcome, RuleToken};
    pub use crate::rules::RuleMap;
    pub use crate::scene::Scene;
    pub use crate::validator::Validator;
    pub use crate::value::Value;
}
