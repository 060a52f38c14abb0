//! Length and range rules.

use crate::rule::parse_byte_size;
use crate::value::Value;
use std::cmp::Ordering;

/// Size of a value for the length rules: element count for containers,
/// byte size for files, character count of the text form otherwise.
pub(crate) fn measure(value: &Value) -> f64 {
    match value {
        Value::Array(items) => items.len() as f64,
        Value::Object(map) => map.len() as f64,
        Value::File(file) => file.size() as f64,
        scalar => scalar.to_text().map_or(0, |t| t.chars().count()) as f64,
    }
}

fn number(param: &str) -> f64 {
    param.trim().parse().unwrap_or(f64::NAN)
}

pub(crate) fn min(value: &Value, param: &str) -> bool {
    measure(value) >= number(param)
}

pub(crate) fn max(value: &Value, param: &str) -> bool {
    measure(value) <= number(param)
}

/// `N` for an exact length, `min,max` for an inclusive range.
pub(crate) fn length(value: &Value, param: &str) -> bool {
    let len = measure(value);
    match param.split_once(',') {
        Some((lo, hi)) => len >= number(lo) && len <= number(hi),
        None => len == number(param),
    }
}

/// Operand used by `between`: containers and files by size, scalars as
/// themselves.
fn range_operand(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) | Value::File(_) => Value::Float(measure(value)),
        scalar => scalar.clone(),
    }
}

fn bounds(param: &str) -> (Value, Option<Value>) {
    match param.split_once(',') {
        Some((lo, hi)) => (Value::from(lo.trim()), Some(Value::from(hi.trim()))),
        None => (Value::from(param.trim()), None),
    }
}

/// Inclusive range check; a single bound is a lower bound.
pub(crate) fn between(value: &Value, param: &str) -> bool {
    let operand = range_operand(value);
    let (lo, hi) = bounds(param);
    let above = matches!(
        operand.loose_cmp(&lo),
        Some(Ordering::Greater | Ordering::Equal)
    );
    let below = hi.map_or(true, |hi| {
        matches!(operand.loose_cmp(&hi), Some(Ordering::Less | Ordering::Equal))
    });
    above && below
}

/// Outside the inclusive range; a single bound means "below it".
pub(crate) fn not_between(value: &Value, param: &str) -> bool {
    let operand = range_operand(value);
    let (lo, hi) = bounds(param);
    let below = operand.loose_cmp(&lo) == Some(Ordering::Less);
    let above = hi.map_or(false, |hi| {
        operand.loose_cmp(&hi) == Some(Ordering::Greater)
    });
    below || above
}

/// Uploaded file no larger than the limit (`2048`, `10kb`, `2M`).
pub(crate) fn file_size(value: &Value, param: &str) -> bool {
    match (value.as_file(), parse_byte_size(param)) {
        (Some(file), Some(limit)) => file.size() <= limit,
        _ => false,
    }
}
