//! The validation session.
//!
//! A [`Validator`] owns rules, message overrides, attributes and scenes.
//! Configuration methods consume and return the session; [`Validator::check`]
//! records the outcome in the session so it can be inspected afterwards.
//!
//! ```rust,ignore
//! use rulekit_validate::prelude::*;
//! use serde_json::json;
//!
//! let mut v = Validator::new(RuleMap::from([
//!     ("name|Name", "required|max:25"),
//!     ("email", "required|email"),
//!     ("age", "integer|between:1,120"),
//! ]))
//! .batch(true)
//! .message([("age.between", "Age must be between :1 and :2")]);
//!
//! if !v.check(&json!({"name": "kit", "email": "x"}).into()) {
//!     println!("{}", v.error());
//! }
//! ```

use crate::config::ValidatorConfig;
use crate::defaults::apply_defaults;
use crate::error::{ErrorState, FieldError, RuleSyntaxError, ValidateException};
use crate::evaluator::{self, Evaluator};
use crate::messages::Locale;
use crate::registry::RuleRegistry;
use crate::rule::RuleOutcome;
use crate::rules::{RuleInput, RuleMap};
use crate::scene::Scene;
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// A validation session.
#[derive(Debug, Clone)]
pub struct Validator {
    rules: RuleMap,
    messages: IndexMap<String, String>,
    attributes: IndexMap<String, String>,
    scenes: IndexMap<String, Scene>,
    current_scene: Option<String>,
    adhoc: Scene,
    batch: bool,
    locale: Locale,
    registry: Arc<RuleRegistry>,
    error: ErrorState,
    failures: Vec<FieldError>,
    data: Option<Value>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(RuleMap::new())
    }
}

impl Validator {
    /// A session over `rules` backed by the process-wide registry.
    pub fn new(rules: RuleMap) -> Self {
        Self::with_registry(rules, RuleRegistry::global())
    }

    /// A session with its own registry.
    pub fn with_registry(rules: RuleMap, registry: Arc<RuleRegistry>) -> Self {
        Self {
            rules,
            messages: IndexMap::new(),
            attributes: IndexMap::new(),
            scenes: IndexMap::new(),
            current_scene: None,
            adhoc: Scene::default(),
            batch: false,
            locale: Locale::default(),
            registry,
            error: ErrorState::None,
            failures: Vec::new(),
            data: None,
        }
    }

    /// Rules, message overrides and display names in one call.
    pub fn make<M, A, K, V>(rules: RuleMap, messages: M, attributes: A) -> Self
    where
        M: IntoIterator<Item = (K, V)>,
        A: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(rules).message(messages).set_attributes(attributes)
    }

    pub fn from_config(rules: RuleMap, config: ValidatorConfig) -> Self {
        Self::new(rules).config(config)
    }

    /// Apply a configuration on top of the current settings.
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.batch = config.batch;
        self.locale = config.locale;
        self.messages.extend(config.messages);
        self.attributes.extend(config.attributes);
        self.scenes.extend(config.scenes);
        self
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Register a custom rule in this session's registry (shared by every
    /// session using the same registry).
    pub fn extend<F, R>(&self, name: &str, rule: F) -> &Self
    where
        F: Fn(&Value, Option<&str>, &Value, &str) -> R + Send + Sync + 'static,
        R: Into<RuleOutcome> + 'static,
    {
        self.registry.extend(name, rule);
        self
    }

    pub fn set_type_msg(&self, name: &str, message: impl Into<String>) -> &Self {
        self.registry.set_type_msg(name, message);
        self
    }

    /// Add or replace the rules for one field.
    pub fn rule(mut self, field: impl Into<String>, rules: impl Into<RuleInput>) -> Self {
        self.rules = self.rules.field(field, rules);
        self
    }

    pub fn rules(&self) -> &RuleMap {
        &self.rules
    }

    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Merge message overrides keyed `field.rule`, `field` or `rule`.
    pub fn message<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Merge field display names.
    pub fn set_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn define_scene(mut self, name: impl Into<String>, scene: impl Into<Scene>) -> Self {
        self.scenes.insert(name.into(), scene.into());
        self
    }

    pub fn has_scene(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// Select a named scene for subsequent checks. An undefined name is
    /// reported when the check runs and otherwise ignored.
    pub fn scene(mut self, name: impl Into<String>) -> Self {
        self.current_scene = Some(name.into());
        self
    }

    /// The rules a named scene selects, or `None` if it is not defined.
    pub fn scene_rules(&self, name: &str) -> Option<RuleMap> {
        self.scenes.get(name).map(|scene| scene.apply(&self.rules))
    }

    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adhoc = self.adhoc.only(fields);
        self
    }

    /// Drop rules (`"max|min"`) from a field for subsequent checks.
    pub fn remove(mut self, field: impl Into<String>, rules: &str) -> Self {
        self.adhoc = self.adhoc.remove(field, rules);
        self
    }

    pub fn remove_field(mut self, field: impl Into<String>) -> Self {
        self.adhoc = self.adhoc.remove_field(field);
        self
    }

    /// Add rules to a field for subsequent checks.
    pub fn append(mut self, field: impl Into<String>, rules: &str) -> Self {
        self.adhoc = self.adhoc.append(field, rules);
        self
    }

    /// Validate `data` with the session rules.
    ///
    /// Returns `false` when a field fails or a rule cannot be parsed; the
    /// messages are available from [`Validator::error`].
    pub fn check(&mut self, data: &Value) -> bool {
        self.check_inner(data, None)
    }

    /// Validate `data` with `rules` instead of the session rules.
    pub fn check_with(&mut self, data: &Value, rules: &RuleMap) -> bool {
        self.check_inner(data, Some(rules))
    }

    /// Like [`Validator::check`] but returns a rule-syntax problem as an
    /// error instead of a failed check.
    pub fn try_check(&mut self, data: &Value) -> Result<bool, RuleSyntaxError> {
        self.run(data, None)
    }

    pub fn try_check_with(&mut self, data: &Value, rules: &RuleMap) -> Result<bool, RuleSyntaxError> {
        self.run(data, Some(rules))
    }

    /// Validate a single value without field context. Conditional and
    /// modifier rules are ignored.
    pub fn check_value(&self, value: &Value, rules: impl Into<RuleInput>) -> RuleOutcome {
        let result = rules
            .into()
            .into_rules()
            .and_then(|rules| evaluator::check_value(value, &rules, &self.registry));
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "invalid rule in single value check");
                RuleOutcome::FailedWith(err.to_string())
            }
        }
    }

    /// Errors from the last check.
    pub fn error(&self) -> &ErrorState {
        &self.error
    }

    /// Structured failures from the last check, in evaluation order.
    pub fn failures(&self) -> &[FieldError] {
        &self.failures
    }

    /// The data of the last check after defaults were applied.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// The last check's failures as an exception, if it failed.
    pub fn exception(&self) -> Option<ValidateException> {
        if self.error.is_empty() {
            return None;
        }
        Some(ValidateException::from_failures(
            self.error.clone(),
            self.failures.clone(),
        ))
    }

    fn check_inner(&mut self, data: &Value, rules: Option<&RuleMap>) -> bool {
        match self.run(data, rules) {
            Ok(passed) => passed,
            Err(err) => {
                tracing::error!(error = %err, "validation aborted by invalid rule");
                let message = format!("invalid rule: {}", err);
                self.failures = vec![FieldError::new("", "syntax", message.clone())];
                self.error = ErrorState::Single(message);
                false
            }
        }
    }

    /// The rules the next [`Validator::check`] will evaluate, after the
    /// selected scene and ad-hoc adjustments.
    pub fn active_rules(&self) -> RuleMap {
        self.select(&self.rules)
    }

    fn select(&self, rules: &RuleMap) -> RuleMap {
        let scene = self.effective_scene();
        if scene.is_empty() {
            rules.clone()
        } else {
            scene.apply(rules)
        }
    }

    fn effective_scene(&self) -> Scene {
        let named = match &self.current_scene {
            Some(name) => match self.scenes.get(name) {
                Some(scene) => scene.clone(),
                None => {
                    tracing::warn!(scene = %name, "scene is not defined, ignoring");
                    Scene::default()
                }
            },
            None => Scene::default(),
        };
        named.merge(&self.adhoc)
    }

    fn run(&mut self, data: &Value, rules: Option<&RuleMap>) -> Result<bool, RuleSyntaxError> {
        self.error = ErrorState::None;
        self.failures.clear();
        self.data = None;

        let rules = self.select(rules.unwrap_or(&self.rules));
        if let Some(err) = rules.syntax_error() {
            return Err(err.clone());
        }

        let data = apply_defaults(data, &rules);
        tracing::debug!(scene = ?self.current_scene, "defaults applied");

        let mut failures = Vec::new();
        let evaluator = Evaluator {
            registry: &self.registry,
            messages: &self.messages,
            attributes: &self.attributes,
            locale: self.locale,
            batch: self.batch,
        };
        let result = evaluator.run(&rules, &data, &mut failures);
        self.data = Some(data);
        result?;

        self.record(failures);
        Ok(self.error.is_empty())
    }

    fn record(&mut self, failures: Vec<FieldError>) {
        self.error = if failures.is_empty() {
            ErrorState::None
        } else if self.batch {
            let mut map = IndexMap::new();
            for failure in &failures {
                map.entry(failure.field.clone())
                    .or_insert_with(|| failure.message.clone());
            }
            ErrorState::Batch(map)
        } else {
            ErrorState::Single(failures[0].message.clone())
        };
        tracing::debug!(failed = failures.len(), "check finished");
        self.failures = failures;
    }
}
