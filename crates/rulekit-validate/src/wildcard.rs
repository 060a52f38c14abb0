//! Expansion of `prefix.*.rest` keys against the data.

use crate::path::{lookup, FieldKey};
use crate::rule::FieldRules;
use crate::rules::RuleMap;
use crate::value::Value;

/// A rule-map entry after wildcard expansion.
#[derive(Debug, Clone)]
pub struct ExpandedField<'a> {
    /// Concrete key (`items.0.name`)
    pub key: FieldKey,
    /// Key as written in the rule map, used as a message/attribute fallback
    pub pattern: FieldKey,
    pub rules: &'a FieldRules,
}

/// Expand every key containing `.*`: the part before the first `.*` must
/// resolve to an array or object, and the key is repeated once per element
/// with that first `.*` replaced by the element index. Keys whose prefix is
/// not a container are kept as written.
pub fn expand_wildcards<'a>(rules: &'a RuleMap, data: &Value) -> Vec<ExpandedField<'a>> {
    let mut out = Vec::with_capacity(rules.len());
    for (raw_key, field_rules) in rules.iter() {
        let pattern = FieldKey::parse(raw_key);
        let indices = wildcard_indices(&pattern, data);
        match indices {
            Some(indices) => {
                for index in indices {
                    let marker = format!(".{}", index);
                    let key = FieldKey::from_parts(
                        pattern.path().replacen(".*", &marker, 1),
                        pattern.title().map(|t| t.replacen(".*", &marker, 1)),
                    );
                    out.push(ExpandedField {
                        key,
                        pattern: pattern.clone(),
                        rules: field_rules,
                    });
                }
            }
            None => out.push(ExpandedField {
                key: pattern.clone(),
                pattern,
                rules: field_rules,
            }),
        }
    }
    out
}

fn wildcard_indices(key: &FieldKey, data: &Value) -> Option<Vec<String>> {
    let (prefix, _) = key.path().split_once(".*")?;
    match lookup(data, prefix)? {
        Value::Array(items) => Some((0..items.len()).map(|i| i.to_string()).collect()),
        Value::Object(map) => Some(map.keys().cloned().collect()),
        _ => None,
    }
}
