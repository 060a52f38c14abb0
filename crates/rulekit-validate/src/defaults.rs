//! `default:<v>` injection.

use crate::path::{lookup, set_value, FieldKey};
use crate::rules::RuleMap;
use crate::value::{is_numeric_str, Value};

/// Read a default parameter: `true`/`false` become booleans, numbers
/// become ints (or floats when they contain a `.`), `null` means "no
/// default", anything else stays text.
pub fn coerce_default(raw: &str) -> Option<Value> {
    let value = match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => return None,
        numeric if is_numeric_str(numeric) => {
            let trimmed = numeric.trim();
            match trimmed.parse::<i64>() {
                Ok(i) if !trimmed.contains('.') => Value::Int(i),
                _ => trimmed
                    .parse::<f64>()
                    .map(Value::Float)
                    .unwrap_or_else(|_| Value::from(raw)),
            }
        }
        text => Value::from(text),
    };
    Some(value)
}

/// Return a copy of `data` with every `default` applied.
///
/// A default is written when its field is absent, `null` or `""`, creating
/// intermediate objects along a dotted path. Wildcard keys are skipped.
pub fn apply_defaults(data: &Value, rules: &RuleMap) -> Value {
    let mut out = data.clone();
    for (raw_key, field_rules) in rules.iter() {
        let Some(raw) = field_rules.default_param() else {
            continue;
        };
        let key = FieldKey::parse(raw_key);
        if key.has_wildcard() {
            continue;
        }
        let missing = lookup(&out, key.path()).map_or(true, Value::is_blank);
        if !missing {
            continue;
        }
        let Some(value) = coerce_default(raw) else {
            continue;
        };
        if set_value(&mut out, key.path(), value) {
            tracing::trace!(field = %key.path(), "applied default");
        } else {
            tracing::debug!(field = %key.path(), "default not applied, path blocked by a scalar");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coercion() {
        assert_eq!(coerce_default("true"), Some(Value::Bool(true)));
        assert_eq!(coerce_default("false"), Some(Value::Bool(false)));
        assert_eq!(coerce_default("null"), None);
        assert_eq!(coerce_default("42"), Some(Value::Int(42)));
        assert_eq!(coerce_default("1.5"), Some(Value::Float(1.5)));
        assert_eq!(coerce_default("active"), Some(Value::from("active")));
    }

    #[test]
    fn fills_absent_null_and_empty() {
        let rules = RuleMap::from([
            ("status", "default:active|string"),
            ("page", "default:1|integer"),
            ("lang", "default:en"),
            ("name", "default:anon"),
        ]);
        let data = Value::from(json!({"page": null, "lang": "", "name": "bob"}));

        let out = apply_defaults(&data, &rules);
        assert_eq!(
            serde_json::Value::from(out),
            json!({"page": 1, "lang": "en", "name": "bob", "status": "active"})
        );
    }

    #[test]
    fn nested_and_wildcard_keys() {
        let rules = RuleMap::from([
            ("settings.theme|Theme", "default:dark"),
            ("items.*.qty", "default:1"),
        ]);
        let data = Value::from(json!({"items": [{}]}));

        let out = apply_defaults(&data, &rules);
        assert_eq!(
            serde_json::Value::from(out),
            json!({"items": [{}], "settings": {"theme": "dark"}})
        );
    }

    #[test]
    fn leaves_input_untouched() {
        let rules = RuleMap::from([("a", "default:1")]);
        let data = Value::from(json!({}));
        let _ = apply_defaults(&data, &rules);
        assert_eq!(data, Value::from(json!({})));
    }
}
