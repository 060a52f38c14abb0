//! Scenes: named or ad-hoc views over a rule map.
//!
//! A scene restricts checking to a subset of fields (`only`), drops fields
//! or single rules (`remove`) and adds fields the map lacks (`append`). Scenes never
//! modify the rule map they are applied to; [`Scene::apply`] returns a new
//! one.
//!
//! ```rust,ignore
//! use rulekit_validate::prelude::*;
//!
//! let edit = Scene::new()
//!     .only(["name", "email", "nickname"])
//!     .remove("email", "unique")
//!     .append("nickname", "max:50");
//! ```

use crate::path::FieldKey;
use crate::rule::{FieldRules, RuleKind};
use crate::rules::RuleMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A set of adjustments applied to a rule map before checking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    #[serde(skip_serializing_if = "Option::is_none")]
    only: Option<Vec<String>>,
    /// Field to rule names; an empty list drops the whole field
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    remove: IndexMap<String, Vec<String>>,
    /// Fields to add, with their rule tokens
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    append: IndexMap<String, Vec<String>>,
}

fn split_names(spec: &str) -> Vec<String> {
    spec.split(['|', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check only these fields.
    pub fn only<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Drop the named rules (`"max|min"`) from a field.
    pub fn remove(mut self, field: impl Into<String>, rules: &str) -> Self {
        self.remove
            .entry(field.into())
            .or_default()
            .extend(split_names(rules));
        self
    }

    /// Drop a field entirely.
    pub fn remove_field(mut self, field: impl Into<String>) -> Self {
        self.remove.insert(field.into(), Vec::new());
        self
    }

    /// Add a field with these rules (`"required|max:20"`). Ignored when the
    /// rule map already has the field.
    pub fn append(mut self, field: impl Into<String>, rules: &str) -> Self {
        let tokens = rules
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.append.entry(field.into()).or_default().extend(tokens);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.only.is_none() && self.remove.is_empty() && self.append.is_empty()
    }

    pub fn only_fields(&self) -> Option<&[String]> {
        self.only.as_deref()
    }

    /// Combine with `other`; its `only` list wins when set, removals and
    /// appends accumulate.
    pub fn merge(&self, other: &Scene) -> Scene {
        let mut merged = self.clone();
        if other.only.is_some() {
            merged.only = other.only.clone();
        }
        for (field, names) in &other.remove {
            if names.is_empty() {
                merged.remove.insert(field.clone(), Vec::new());
            } else {
                merged
                    .remove
                    .entry(field.clone())
                    .or_default()
                    .extend(names.iter().cloned());
            }
        }
        for (field, tokens) in &other.append {
            merged
                .append
                .entry(field.clone())
                .or_default()
                .extend(tokens.iter().cloned());
        }
        merged
    }

    /// Produce the rule map this scene selects from `rules`.
    pub fn apply(&self, rules: &RuleMap) -> RuleMap {
        let mut out = rules.clone();

        for (field, tokens) in &self.append {
            if let Some(key) = find_key(&out, field) {
                tracing::trace!(field = %key, "append skipped, field already has rules");
                continue;
            }
            // Malformed appends are reported by the map like any other rule.
            out = out.field(field.clone(), tokens.clone());
        }

        if let Some(only) = &self.only {
            out.retain(|key, _| {
                let path = FieldKey::parse(key);
                only.iter()
                    .any(|f| f == key || FieldKey::parse(f).path() == path.path())
            });
        }

        for (field, names) in &self.remove {
            let Some(key) = find_key(&out, field) else {
                continue;
            };
            if names.is_empty() {
                out.remove(&key);
                continue;
            }
            let kinds: Vec<RuleKind> = names.iter().map(|n| RuleKind::from_name(n)).collect();
            if let Some(FieldRules::Chain(tokens)) = out.get_mut(&key) {
                tokens.retain(|t| !kinds.contains(t.kind()));
            }
        }

        out
    }
}

/// Rule-map key addressing `field`, by exact key or by canonical path.
fn find_key(rules: &RuleMap, field: &str) -> Option<String> {
    if rules.contains_key(field) {
        return Some(field.to_string());
    }
    let wanted = FieldKey::parse(field);
    rules
        .keys()
        .find(|key| FieldKey::parse(key).path() == wanted.path())
        .map(str::to_string)
}

impl From<&str> for Scene {
    /// `"name,email"` restricts to those fields.
    fn from(fields: &str) -> Self {
        Scene::new().only(split_names(fields))
    }
}

impl<S: Into<String>> From<Vec<S>> for Scene {
    fn from(fields: Vec<S>) -> Self {
        Scene::new().only(fields)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Scene {
    fn from(fields: [S; N]) -> Self {
        Scene::new().only(fields)
    }
}
