//! Field addressing: `key|Title` parsing, bracket normalization and nested
//! lookups into the data tree.

use crate::value::{is_numeric_str, Value};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

fn bracket_regex() -> &'static Regex {
    static BRACKET: OnceLock<Regex> = OnceLock::new();
    BRACKET.get_or_init(|| Regex::new(r"\[([^\]]+)\]").expect("bracket regex is valid"))
}

/// Rewrite bracket segments to dotted ones: `user[address][city]` becomes
/// `user.address.city`.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    bracket_regex().replace_all(path, ".$1")
}

/// A rule-map key split into its canonical path and optional display title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    path: String,
    title: Option<String>,
}

impl FieldKey {
    /// Parse `path` or `path|Title`. Only a separator after the first
    /// character splits the key.
    pub fn parse(raw: &str) -> Self {
        let (path, title) = match raw.find('|') {
            Some(pos) if pos > 0 => {
                let title = raw[pos + 1..].trim();
                (
                    &raw[..pos],
                    (!title.is_empty()).then(|| title.to_string()),
                )
            }
            _ => (raw, None),
        };
        Self {
            path: normalize_path(path.trim()).into_owned(),
            title,
        }
    }

    pub(crate) fn from_parts(path: String, title: Option<String>) -> Self {
        Self { path, title }
    }

    /// Canonical dotted path; errors are keyed by it.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn has_wildcard(&self) -> bool {
        self.path.contains(".*")
    }
}

/// Resolve a field reference against `data`.
///
/// Purely numeric references resolve to themselves as literal text, so a
/// rule such as `gt:18` compares against the constant. Otherwise the dotted
/// (or bracketed) path is walked; any missing segment yields `None`.
pub fn get_value<'a>(data: &'a Value, reference: &str) -> Option<Cow<'a, Value>> {
    if is_numeric_str(reference) {
        return Some(Cow::Owned(Value::String(reference.to_string())));
    }
    lookup(data, &normalize_path(reference)).map(Cow::Borrowed)
}

/// Walk an already-normalized dotted path.
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |node, segment| node.child(segment))
}

/// Whether the path exists, even when it holds `null`.
pub fn exists(data: &Value, path: &str) -> bool {
    lookup(data, path).is_some()
}

/// Write `value` at a dotted path, creating intermediate objects for missing
/// segments. Returns `false` when a segment runs into a scalar or past the
/// end of an array.
pub fn set_value(data: &mut Value, path: &str, value: Value) -> bool {
    let mut segments = path.split('.').peekable();
    let mut node = data;
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        if node.is_null() {
            *node = Value::Object(Default::default());
        }
        if last {
            return match node {
                Value::Object(map) => {
                    map.insert(segment.to_string(), value);
                    true
                }
                Value::Array(items) => match segment.parse::<usize>() {
                    Ok(i) if i < items.len() => {
                        items[i] = value;
                        true
                    }
                    _ => false,
                },
                _ => false,
            };
        }
        if let Value::Object(map) = node {
            map.entry(segment.to_string()).or_insert(Value::Null);
        }
        node = match node.child_mut(segment) {
            Some(next) => next,
            None => return false,
        };
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_with_title() {
        let key = FieldKey::parse("username|User name");
        assert_eq!(key.path(), "username");
        assert_eq!(key.title(), Some("User name"));

        let plain = FieldKey::parse("user[address][city]");
        assert_eq!(plain.path(), "user.address.city");
        assert_eq!(plain.title(), None);

        // A leading separator does not split.
        assert_eq!(FieldKey::parse("|x").path(), "|x");
    }

    #[test]
    fn nested_lookup() {
        let data = Value::from(json!({"user": {"address": {"city": "Oslo"}}, "tags": ["a", "b"]}));

        assert_eq!(
            get_value(&data, "user.address.city").as_deref(),
            Some(&Value::from("Oslo"))
        );
        assert_eq!(
            get_value(&data, "user[address][city]").as_deref(),
            Some(&Value::from("Oslo"))
        );
        assert_eq!(get_value(&data, "tags.1").as_deref(), Some(&Value::from("b")));
        assert!(get_value(&data, "user.phone").is_none());
        assert!(get_value(&data, "user.address.city.zip").is_none());
    }

    #[test]
    fn numeric_reference_is_literal() {
        let data = Value::Null;
        assert_eq!(get_value(&data, "18").as_deref(), Some(&Value::from("18")));
    }

    #[test]
    fn null_is_present() {
        let data = Value::from(json!({"a": null}));
        assert!(exists(&data, "a"));
        assert!(!exists(&data, "b"));
    }

    #[test]
    fn set_creates_intermediates() {
        let mut data = Value::from(json!({"user": {}}));
        assert!(set_value(&mut data, "user.profile.lang", Value::from("en")));
        assert_eq!(
            serde_json::Value::from(data.clone()),
            json!({"user": {"profile": {"lang": "en"}}})
        );

        assert!(!set_value(&mut data, "user.profile.lang.x", Value::Int(1)));
    }

    #[test]
    fn set_into_array_slot() {
        let mut data = Value::from(json!({"items": [1, 2]}));
        assert!(set_value(&mut data, "items.1", Value::Int(5)));
        assert!(!set_value(&mut data, "items.4", Value::Int(5)));
        assert_eq!(serde_json::Value::from(data), json!({"items": [1, 5]}));
    }
}
