//! Registry of user-defined rules, their messages and named conditions.
//!
//! Sessions hold an `Arc<RuleRegistry>`. By default they all share
//! [`RuleRegistry::global`]; pass a private registry with
//! `Validator::with_registry` to keep extensions scoped (tests, tenants).
//!
//! ```rust,ignore
//! use rulekit_validate::prelude::*;
//!
//! let registry = RuleRegistry::global();
//! registry.extend("even", |value: &Value, _param: Option<&str>, _data: &Value, _field: &str| {
//!     value.as_number().map_or(false, |n| n % 2.0 == 0.0)
//! });
//! registry.set_type_msg("even", ":attribute must be even");
//! ```

use crate::rule::{canonical_name, Condition, RuleOutcome};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A user-defined rule.
pub trait CustomRule: Send + Sync {
    /// Evaluate the rule for one field.
    ///
    /// * `value` - the field value (`Null` when absent)
    /// * `param` - text after the first `:` in the rule token
    /// * `data` - the whole data tree
    /// * `field` - canonical dotted path of the field
    fn check(&self, value: &Value, param: Option<&str>, data: &Value, field: &str) -> RuleOutcome;
}

struct FnRule<F, R> {
    f: F,
    _result: PhantomData<fn() -> R>,
}

impl<F, R> CustomRule for FnRule<F, R>
where
    F: Fn(&Value, Option<&str>, &Value, &str) -> R + Send + Sync,
    R: Into<RuleOutcome>,
{
    fn check(&self, value: &Value, param: Option<&str>, data: &Value, field: &str) -> RuleOutcome {
        (self.f)(value, param, data, field).into()
    }
}

static GLOBAL: OnceLock<Arc<RuleRegistry>> = OnceLock::new();

/// Process-wide or injected store of custom rules.
#[derive(Default)]
pub struct RuleRegistry {
    rules: RwLock<HashMap<String, Arc<dyn CustomRule>>>,
    messages: RwLock<HashMap<String, String>>,
    conditions: RwLock<HashMap<String, Condition>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry used by sessions that were not given their own.
    pub fn global() -> Arc<RuleRegistry> {
        GLOBAL.get_or_init(|| Arc::new(RuleRegistry::new())).clone()
    }

    /// Register a closure rule. Names are normalized like rule tokens, so
    /// `is_even` and `isEven` are the same rule.
    pub fn extend<F, R>(&self, name: &str, rule: F)
    where
        F: Fn(&Value, Option<&str>, &Value, &str) -> R + Send + Sync + 'static,
        R: Into<RuleOutcome> + 'static,
    {
        self.extend_rule(
            name,
            Arc::new(FnRule {
                f: rule,
                _result: PhantomData,
            }),
        );
    }

    /// Register a rule implemented as a type.
    pub fn extend_rule(&self, name: &str, rule: Arc<dyn CustomRule>) {
        let name = canonical_name(name);
        tracing::debug!(rule = %name, "registering custom rule");
        write(&self.rules).insert(name, rule);
    }

    /// Default message template for a rule.
    pub fn set_type_msg(&self, name: &str, message: impl Into<String>) {
        write(&self.messages).insert(canonical_name(name), message.into());
    }

    /// Named condition for `requireCallback:<name>`.
    pub fn register_condition<F>(&self, name: &str, condition: F)
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        write(&self.conditions).insert(name.to_string(), Arc::new(condition));
    }

    pub fn rule(&self, name: &str) -> Option<Arc<dyn CustomRule>> {
        read(&self.rules).get(name).cloned()
    }

    pub fn has_rule(&self, name: &str) -> bool {
        read(&self.rules).contains_key(name)
    }

    pub fn type_msg(&self, name: &str) -> Option<String> {
        read(&self.messages).get(name).cloned()
    }

    pub fn condition(&self, name: &str) -> Option<Condition> {
        read(&self.conditions).get(name).cloned()
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<_> = read(&self.rules).keys().cloned().collect();
        rules.sort();
        let mut conditions: Vec<_> = read(&self.conditions).keys().cloned().collect();
        conditions.sort();
        f.debug_struct("RuleRegistry")
            .field("rules", &rules)
            .field("conditions", &conditions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Even;

    impl CustomRule for Even {
        fn check(&self, value: &Value, _: Option<&str>, _: &Value, _: &str) -> RuleOutcome {
            value.as_number().map_or(false, |n| n % 2.0 == 0.0).into()
        }
    }

    #[test]
    fn closure_rules() {
        let registry = RuleRegistry::new();
        registry.extend("starts_with", |value: &Value, param: Option<&str>, _: &Value, _: &str| {
            value
                .as_str()
                .zip(param)
                .map_or(false, |(s, prefix)| s.starts_with(prefix))
        });

        let rule = registry.rule("startsWith").unwrap();
        assert!(rule
            .check(&Value::from("abc"), Some("ab"), &Value::Null, "f")
            .is_passed());
        assert!(!rule
            .check(&Value::from("abc"), Some("x"), &Value::Null, "f")
            .is_passed());
    }

    #[test]
    fn trait_rules_and_messages() {
        let registry = RuleRegistry::new();
        registry.extend_rule("even", Arc::new(Even));
        registry.set_type_msg("even", ":attribute must be even");

        assert!(registry.has_rule("even"));
        assert_eq!(
            registry.type_msg("even").as_deref(),
            Some(":attribute must be even")
        );
        assert!(registry
            .rule("even")
            .unwrap()
            .check(&Value::Int(4), None, &Value::Null, "n")
            .is_passed());
    }

    #[test]
    fn closures_may_return_messages() {
        let registry = RuleRegistry::new();
        registry.extend("never", |_: &Value, _: Option<&str>, _: &Value, field: &str| {
            format!("{} is never valid", field)
        });
        let outcome = registry
            .rule("never")
            .unwrap()
            .check(&Value::Null, None, &Value::Null, "code");
        assert_eq!(outcome.message(), Some("code is never valid"));
    }

    #[test]
    fn global_is_shared() {
        let a = RuleRegistry::global();
        let b = RuleRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn conditions() {
        let registry = RuleRegistry::new();
        registry.register_condition("is_company", |_, data| {
            data.child("type").and_then(Value::as_str) == Some("company")
        });
        let condition = registry.condition("is_company").unwrap();
        let data = Value::object([("type", "company")]);
        assert!(condition(&Value::Null, &data));
    }
}
