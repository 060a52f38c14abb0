//! Presence and type rules.

use crate::value::Value;
use regex::Regex;
use std::sync::OnceLock;

fn integer_regex() -> &'static Regex {
    static INTEGER: OnceLock<Regex> = OnceLock::new();
    INTEGER.get_or_init(|| Regex::new(r"^[+-]?(0|[1-9]\d*)$").unwrap())
}

fn float_regex() -> &'static Regex {
    static FLOAT: OnceLock<Regex> = OnceLock::new();
    FLOAT.get_or_init(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap())
}

/// Present and non-empty. Anything loosely equal to `"0"` (`0`, `false`)
/// counts as present.
pub(crate) fn required(value: &Value) -> bool {
    !value.is_empty_like() || value.loose_eq(&Value::from("0"))
}

/// Checkbox-style acceptance: `1`, `"1"`, `"on"`, `"yes"` or `true`.
pub(crate) fn accepted(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(i) => *i == 1,
        Value::String(s) => matches!(s.as_str(), "1" | "on" | "yes"),
        _ => false,
    }
}

pub(crate) fn string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

/// Integers, integral floats and integer-looking strings (surrounding
/// whitespace tolerated, no leading zeros).
pub(crate) fn integer(value: &Value) -> bool {
    match value {
        Value::Int(_) => true,
        Value::Float(f) => f.is_finite() && f.fract() == 0.0,
        Value::String(s) => {
            let s = s.trim();
            integer_regex().is_match(s) && s.parse::<i64>().is_ok()
        }
        _ => false,
    }
}

pub(crate) fn float(value: &Value) -> bool {
    match value {
        Value::Int(_) => true,
        Value::Float(f) => f.is_finite(),
        Value::String(s) => float_regex().is_match(s.trim()),
        _ => false,
    }
}

pub(crate) fn numeric(value: &Value) -> bool {
    value.is_numeric_like()
}

/// `true`, `false`, `0`, `1`, `"0"` or `"1"`.
pub(crate) fn boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Int(i) => *i == 0 || *i == 1,
        Value::String(s) => s == "0" || s == "1",
        _ => false,
    }
}

pub(crate) fn array(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}
