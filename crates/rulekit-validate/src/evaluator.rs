//! Per-field evaluation and the field loop shared by sessions and nested
//! rule sets.
//!
//! A rule chain is evaluated in four steps:
//!
//! 1. `sometimes` with an absent field, or `nullable` with a null/empty
//!    value, passes at once.
//! 2. Conditional tokens (`requireIf`, `requireWith`, `requireWithout`,
//!    `requireCallback`) run first wherever they appear. When a condition
//!    holds the value must be present; when it does not and the value is
//!    empty the field passes.
//! 3. Without a `required` token an empty value passes.
//! 4. The remaining tokens run in order; the first failure ends the field.

use crate::defaults::apply_defaults;
use crate::error::{FieldError, RuleSyntaxError};
use crate::messages::{render, Locale, MessageResolver};
use crate::path::lookup;
use crate::predicates::{conditional, dispatch, types, RuleContext};
use crate::registry::RuleRegistry;
use crate::rule::{FieldRules, RuleKind, RuleOutcome, RuleToken};
use crate::rules::RuleMap;
use crate::value::{Value, NULL};
use crate::wildcard::{expand_wildcards, ExpandedField};
use indexmap::IndexMap;

/// Everything a field needs besides its own rules and value.
pub(crate) struct Evaluator<'a> {
    pub registry: &'a RuleRegistry,
    pub messages: &'a IndexMap<String, String>,
    pub attributes: &'a IndexMap<String, String>,
    pub locale: Locale,
    pub batch: bool,
}

impl Evaluator<'_> {
    /// Evaluate every entry of `rules` against `data`, pushing failures in
    /// rule-map order. Stops after the first failure unless in batch mode.
    pub fn run(
        &self,
        rules: &RuleMap,
        data: &Value,
        failures: &mut Vec<FieldError>,
    ) -> Result<(), RuleSyntaxError> {
        let fields = expand_wildcards(rules, data);
        tracing::debug!(
            rules = rules.len(),
            fields = fields.len(),
            batch = self.batch,
            "evaluating fields"
        );

        for field in &fields {
            let before = failures.len();
            self.field(field, data, failures)?;
            if !self.batch && failures.len() > before {
                break;
            }
        }
        Ok(())
    }

    fn field(
        &self,
        field: &ExpandedField<'_>,
        data: &Value,
        failures: &mut Vec<FieldError>,
    ) -> Result<(), RuleSyntaxError> {
        let path = field.key.path();
        let value = lookup(data, path);

        match field.rules {
            FieldRules::Chain(tokens) => {
                if let Some(failure) = self.chain(field, tokens, value, data)? {
                    failures.push(failure);
                }
            }
            FieldRules::Closure(check) => {
                let outcome = check(value.unwrap_or(&NULL), data);
                let token = RuleToken::new(RuleKind::Closure, None)?;
                if let Some(failure) = self.failure(field, &token, outcome) {
                    failures.push(failure);
                }
            }
            FieldRules::Nested(sub) => self.nested(field, sub, value, failures)?,
        }
        Ok(())
    }

    /// Run a token chain. `value` is `None` when the field is absent.
    fn chain(
        &self,
        field: &ExpandedField<'_>,
        tokens: &[RuleToken],
        value: Option<&Value>,
        data: &Value,
    ) -> Result<Option<FieldError>, RuleSyntaxError> {
        let has = |kind: RuleKind| tokens.iter().any(|t| *t.kind() == kind);

        if value.is_none() && has(RuleKind::Sometimes) {
            return Ok(None);
        }
        let value = value.unwrap_or(&NULL);
        if has(RuleKind::Nullable) && value.is_blank() {
            return Ok(None);
        }

        let ctx = RuleContext {
            field: field.key.path(),
            data,
            registry: self.registry,
        };

        for token in tokens.iter().filter(|t| t.kind().is_conditional()) {
            let holds = conditional::condition(token, value, &ctx)?;
            if holds && !types::required(value) {
                return Ok(self.failure(field, token, RuleOutcome::Failed));
            }
            if !holds && value.is_blank() {
                return Ok(None);
            }
        }

        if !has(RuleKind::Required) && value.is_blank() {
            return Ok(None);
        }

        for token in tokens {
            let kind = token.kind();
            if kind.is_modifier() || kind.is_conditional() {
                continue;
            }
            let outcome = dispatch(token, value, &ctx)?;
            tracing::trace!(
                field = %ctx.field,
                rule = %token,
                passed = outcome.is_passed(),
                "rule evaluated"
            );
            if let Some(failure) = self.failure(field, token, outcome) {
                return Ok(Some(failure));
            }
        }
        Ok(None)
    }

    /// Validate every element of a list of objects with `sub`. Failures are
    /// keyed `field.index.subfield`.
    fn nested(
        &self,
        field: &ExpandedField<'_>,
        sub: &RuleMap,
        value: Option<&Value>,
        failures: &mut Vec<FieldError>,
    ) -> Result<(), RuleSyntaxError> {
        let path = field.key.path();
        let items = match value {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                failures.push(self.nested_shape_failure(field));
                return Ok(());
            }
        };

        let sub: RuleMap = sub
            .iter()
            .map(|(key, rules)| (key.replace("*.", ""), rules.clone()))
            .collect();

        for (index, item) in items.iter().enumerate() {
            if !matches!(item, Value::Object(_)) {
                failures.push(self.nested_shape_failure(field));
                return Ok(());
            }
            let item = apply_defaults(item, &sub);
            let mut inner = Vec::new();
            self.run(&sub, &item, &mut inner)?;
            let failed = !inner.is_empty();
            failures.extend(inner.into_iter().map(|mut failure| {
                failure.field = format!("{}.{}.{}", path, index, failure.field);
                failure
            }));
            if failed && !self.batch {
                break;
            }
        }
        Ok(())
    }

    fn nested_shape_failure(&self, field: &ExpandedField<'_>) -> FieldError {
        let message = render(self.locale.nested_message(), &self.title(field), None);
        FieldError::new(field.key.path(), "nested", message)
    }

    /// Turn a failed outcome into a field error with its rendered message.
    fn failure(
        &self,
        field: &ExpandedField<'_>,
        token: &RuleToken,
        outcome: RuleOutcome,
    ) -> Option<FieldError> {
        let message = match outcome {
            RuleOutcome::Passed => return None,
            RuleOutcome::FailedWith(message) => message,
            RuleOutcome::Failed => {
                let resolver = MessageResolver {
                    messages: self.messages,
                    registry: self.registry,
                    locale: self.locale,
                };
                resolver.resolve(&lookup_keys(field), &self.title(field), token)
            }
        };
        tracing::trace!(field = %field.key.path(), rule = %token.name(), "field failed");
        Some(FieldError::new(field.key.path(), token.kind().name(), message))
    }

    /// Display name: custom attribute (concrete path, then pattern), then
    /// the title embedded in the key, then the path itself.
    fn title(&self, field: &ExpandedField<'_>) -> String {
        lookup_keys(field)
            .iter()
            .find_map(|key| self.attributes.get(*key))
            .cloned()
            .or_else(|| field.key.title().map(str::to_string))
            .unwrap_or_else(|| field.key.path().to_string())
    }
}

fn lookup_keys<'f>(field: &'f ExpandedField<'_>) -> Vec<&'f str> {
    let mut keys = vec![field.key.path()];
    if field.pattern.path() != field.key.path() {
        keys.push(field.pattern.path());
    }
    keys
}

/// Run a rule chain against a single value with no surrounding data.
pub(crate) fn check_value(
    value: &Value,
    rules: &FieldRules,
    registry: &RuleRegistry,
) -> Result<RuleOutcome, RuleSyntaxError> {
    match rules {
        FieldRules::Closure(check) => Ok(check(value, &NULL)),
        FieldRules::Nested(_) => Ok(RuleOutcome::Passed),
        FieldRules::Chain(tokens) => {
            let ctx = RuleContext {
                field: "",
                data: &NULL,
                registry,
            };
            for token in tokens {
                if token.kind().is_modifier() || token.kind().is_conditional() {
                    continue;
                }
                let outcome = dispatch(token, value, &ctx)?;
                if !outcome.is_passed() {
                    return Ok(outcome);
                }
            }
            Ok(RuleOutcome::Passed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixture {
        registry: RuleRegistry,
        messages: IndexMap<String, String>,
        attributes: IndexMap<String, String>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: RuleRegistry::new(),
                messages: IndexMap::new(),
                attributes: IndexMap::new(),
            }
        }

        fn run(&self, rules: &RuleMap, data: serde_json::Value, batch: bool) -> Vec<FieldError> {
            let evaluator = Evaluator {
                registry: &self.registry,
                messages: &self.messages,
                attributes: &self.attributes,
                locale: Locale::En,
                batch,
            };
            let mut failures = Vec::new();
            evaluator
                .run(rules, &Value::from(data), &mut failures)
                .unwrap();
            failures
        }
    }

    #[test]
    fn required_gate_skips_empty_optional_fields() {
        let fx = Fixture::new();
        let rules = RuleMap::from([("nick", "min:3|alpha"), ("bio", "max:2")]);
        assert!(fx.run(&rules, json!({"bio": ""}), true).is_empty());
    }

    #[test]
    fn must_does_not_open_the_gate() {
        let fx = Fixture::new();
        let rules = RuleMap::from([("flag", "must")]);
        assert!(fx.run(&rules, json!({}), false).is_empty());
        let failures = fx.run(&rules, json!({"flag": []}), false);
        assert_eq!(failures[0].code, "must");
    }

    #[test]
    fn nullable_and_sometimes() {
        let fx = Fixture::new();
        let rules = RuleMap::from([("age", "nullable|required|integer")]);
        assert!(fx.run(&rules, json!({"age": null}), false).is_empty());
        assert_eq!(fx.run(&rules, json!({"age": "x"}), false).len(), 1);

        let rules = RuleMap::from([("code", "sometimes|required|zip")]);
        assert!(fx.run(&rules, json!({}), false).is_empty());
        assert_eq!(fx.run(&rules, json!({"code": ""}), false)[0].code, "required");
    }

    #[test]
    fn conditional_prepass_runs_first() {
        let fx = Fixture::new();
        let rules = RuleMap::from([("company", "max:5|requireIf:type,business")]);

        assert!(fx.run(&rules, json!({"type": "personal"}), false).is_empty());
        let failures = fx.run(&rules, json!({"type": "business"}), false);
        assert_eq!(failures[0].code, "requireIf");
        assert_eq!(failures[0].message, "company is required");

        // Condition holds and value present: the rest of the chain runs.
        let failures = fx.run(&rules, json!({"type": "business", "company": "toolong"}), false);
        assert_eq!(failures[0].code, "max");
    }

    #[test]
    fn fail_fast_stops_at_first_field() {
        let fx = Fixture::new();
        let rules = RuleMap::from([("a", "required"), ("b", "required"), ("c", "required")]);
        assert_eq!(fx.run(&rules, json!({}), false).len(), 1);
        assert_eq!(fx.run(&rules, json!({}), true).len(), 3);
    }

    #[test]
    fn messages_titles_and_verbatim_failures() {
        let mut fx = Fixture::new();
        fx.attributes.insert("email".into(), "E-mail".into());
        fx.messages.insert("age.between".into(), ":attribute out of :1-:2".into());
        fx.registry
            .extend("odd", |v: &Value, _: Option<&str>, _: &Value, _: &str| {
                if v.as_number().map_or(false, |n| n % 2.0 != 0.0) {
                    RuleOutcome::Passed
                } else {
                    RuleOutcome::from("need an odd number")
                }
            });

        let rules = RuleMap::from([
            ("email", "email"),
            ("age|Your age", "between:18,65"),
            ("lucky", "odd"),
        ]);
        let failures = fx.run(&rules, json!({"email": "nope", "age": 7, "lucky": 4}), true);
        let messages: Vec<_> = failures.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages[0], "E-mail must be a valid email address");
        assert_eq!(messages[1], "Your age out of 18-65");
        assert_eq!(messages[2], "need an odd number");
    }

    #[test]
    fn wildcard_failures_are_keyed_by_index() {
        let fx = Fixture::new();
        let rules = RuleMap::from([("items.*", "required|string|max:5")]);
        let failures = fx.run(&rules, json!({"items": ["ok", "toolongvalue"]}), true);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "items.1");
    }

    #[test]
    fn nested_rule_sets() {
        let fx = Fixture::new();
        let sub = RuleMap::from([("*.sku", "required|alphaDash"), ("*.qty", "required|integer|gt:0")]);
        let rules = RuleMap::new().field("lines", sub);

        let ok = json!({"lines": [{"sku": "a-1", "qty": 2}]});
        assert!(fx.run(&rules, ok, true).is_empty());

        let bad = json!({"lines": [{"sku": "a-1", "qty": 2}, {"sku": "b 2", "qty": 0}]});
        let failures = fx.run(&rules, bad, true);
        let fields: Vec<_> = failures.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["lines.1.sku", "lines.1.qty"]);

        let failures = fx.run(&rules, json!({"lines": "nope"}), true);
        assert_eq!(failures[0].code, "nested");
        assert_eq!(failures[0].message, "lines must be a list of objects");
    }

    #[test]
    fn closure_field_rules() {
        let fx = Fixture::new();
        let rules = RuleMap::new().field(
            "total",
            FieldRules::closure(|value: &Value, data: &Value| {
                let sum = data.child("a").and_then(Value::as_number).unwrap_or(0.0)
                    + data.child("b").and_then(Value::as_number).unwrap_or(0.0);
                value.as_number() == Some(sum)
            }),
        );
        assert!(fx.run(&rules, json!({"a": 1, "b": 2, "total": 3}), false).is_empty());
        let failures = fx.run(&rules, json!({"a": 1, "b": 2, "total": 4}), false);
        assert_eq!(failures[0].code, "closure");
    }

    #[test]
    fn single_value_checks() {
        let registry = RuleRegistry::new();
        let rules = FieldRules::parse("integer|between:1,10").unwrap();
        assert!(check_value(&Value::Int(5), &rules, &registry).unwrap().is_passed());
        assert!(!check_value(&Value::Int(50), &rules, &registry).unwrap().is_passed());
    }
}
