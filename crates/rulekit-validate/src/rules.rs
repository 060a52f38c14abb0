//! Ordered mapping from field keys to their rules.

use crate::error::RuleSyntaxError;
use crate::rule::{FieldRules, RuleToken};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Anything that can be turned into the rules of one field.
pub enum RuleInput {
    /// `required|string|max:20`
    Text(String),
    /// `["required", "string", "max:20"]`
    List(Vec<String>),
    /// Pre-built rules (closures, nested sets, token chains).
    Rules(FieldRules),
}

impl RuleInput {
    pub fn into_rules(self) -> Result<FieldRules, RuleSyntaxError> {
        match self {
            RuleInput::Text(spec) => FieldRules::parse(&spec),
            RuleInput::List(items) => FieldRules::from_list(items),
            RuleInput::Rules(rules) => Ok(rules),
        }
    }
}

impl From<&str> for RuleInput {
    fn from(spec: &str) -> Self {
        RuleInput::Text(spec.to_string())
    }
}

impl From<String> for RuleInput {
    fn from(spec: String) -> Self {
        RuleInput::Text(spec)
    }
}

impl From<Vec<&str>> for RuleInput {
    fn from(items: Vec<&str>) -> Self {
        RuleInput::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for RuleInput {
    fn from(items: Vec<String>) -> Self {
        RuleInput::List(items)
    }
}

impl<const N: usize> From<[&str; N]> for RuleInput {
    fn from(items: [&str; N]) -> Self {
        RuleInput::List(items.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<RuleToken>> for RuleInput {
    fn from(tokens: Vec<RuleToken>) -> Self {
        RuleInput::Rules(FieldRules::from_tokens(tokens))
    }
}

impl From<FieldRules> for RuleInput {
    fn from(rules: FieldRules) -> Self {
        RuleInput::Rules(rules)
    }
}

impl From<RuleMap> for RuleInput {
    fn from(rules: RuleMap) -> Self {
        RuleInput::Rules(FieldRules::Nested(rules))
    }
}

/// Field key (`path` or `path|Title`) to rules, in definition order.
///
/// Rule strings are parsed on insertion. A malformed definition does not
/// abort the builder chain; it is kept and reported by the first check.
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    entries: IndexMap<String, FieldRules>,
    invalid: Vec<(String, RuleSyntaxError)>,
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rules for a field.
    pub fn field(mut self, key: impl Into<String>, rules: impl Into<RuleInput>) -> Self {
        let key = key.into();
        match rules.into().into_rules() {
            Ok(rules) => {
                self.entries.insert(key, rules);
            }
            Err(err) => {
                tracing::warn!(field = %key, error = %err, "ignoring malformed rule definition");
                self.invalid.push((key, err));
            }
        }
        self
    }

    /// Like [`RuleMap::field`] but surfaces a malformed definition at once.
    pub fn try_field(
        mut self,
        key: impl Into<String>,
        rules: impl Into<RuleInput>,
    ) -> Result<Self, RuleSyntaxError> {
        let rules = rules.into().into_rules()?;
        self.entries.insert(key.into(), rules);
        Ok(self)
    }

    pub fn insert(&mut self, key: impl Into<String>, rules: FieldRules) {
        self.entries.insert(key.into(), rules);
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldRules> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FieldRules> {
        self.entries.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut FieldRules> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRules)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First malformed definition recorded by [`RuleMap::field`].
    pub fn syntax_error(&self) -> Option<&RuleSyntaxError> {
        self.invalid.first().map(|(_, err)| err)
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str, &FieldRules) -> bool) {
        self.entries.retain(|k, v| keep(k, v));
    }

    /// Build from a JSON object whose values are rule strings, lists of
    /// rule strings, or nested objects.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, RuleSyntaxError> {
        let serde_json::Value::Object(map) = value else {
            return Err(RuleSyntaxError::invalid_param(
                "rules",
                value.to_string(),
                "expected an object of field rules",
            ));
        };
        let mut rules = RuleMap::new();
        for (key, spec) in map {
            let input = match spec {
                serde_json::Value::String(s) => RuleInput::Text(s.clone()),
                serde_json::Value::Array(items) => RuleInput::List(
                    items
                        .iter()
                        .map(|item| match item {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                ),
                nested @ serde_json::Value::Object(_) => {
                    RuleInput::Rules(FieldRules::Nested(RuleMap::from_json(nested)?))
                }
                other => {
                    return Err(RuleSyntaxError::invalid_param(
                        key.as_str(),
                        other.to_string(),
                        "expected a rule string, list or object",
                    ))
                }
            };
            rules.insert(key.clone(), input.into_rules()?);
        }
        Ok(rules)
    }
}

impl<K, V> FromIterator<(K, V)> for RuleMap
where
    K: Into<String>,
    V: Into<RuleInput>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RuleMap::new(), |map, (key, rules)| map.field(key, rules))
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for RuleMap
where
    K: Into<String>,
    V: Into<RuleInput>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<'de> Deserialize<'de> for RuleMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        RuleMap::from_json(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleKind;
    use serde_json::json;

    #[test]
    fn keeps_definition_order() {
        let rules = RuleMap::from([
            ("name", "required"),
            ("email", "required|email"),
            ("age", "integer"),
        ]);
        assert_eq!(rules.keys().collect::<Vec<_>>(), vec!["name", "email", "age"]);
        assert!(rules.get("email").unwrap().has(&RuleKind::Email));
    }

    #[test]
    fn malformed_rule_is_deferred() {
        let rules = RuleMap::new().field("age", "min").field("name", "required");
        assert_eq!(rules.len(), 1);
        assert!(matches!(
            rules.syntax_error(),
            Some(RuleSyntaxError::MissingParam { .. })
        ));
        assert!(RuleMap::new().try_field("age", "min").is_err());
    }

    #[test]
    fn from_json_object() {
        let rules: RuleMap = serde_json::from_value(json!({
            "name": "required|string",
            "tags": ["array", "max:3"],
            "users": {"*.email": "required|email"}
        }))
        .unwrap();

        assert_eq!(rules.len(), 3);
        assert!(matches!(rules.get("users"), Some(FieldRules::Nested(_))));
        assert_eq!(rules.get("tags").unwrap().tokens().len(), 2);
    }

    #[test]
    fn from_json_rejects_bad_shape() {
        assert!(RuleMap::from_json(&json!({"age": 5})).is_err());
        assert!(RuleMap::from_json(&json!(["required"])).is_err());
    }
}
