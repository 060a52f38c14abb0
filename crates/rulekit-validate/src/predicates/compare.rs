//! Cross-field and list comparison rules.

use crate::path::get_value;
use crate::value::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Loose ordering against another field (or a numeric literal). A missing
/// operand fails the comparison.
fn ordered(value: &Value, data: &Value, param: &str, accept: &[Ordering]) -> bool {
    get_value(data, param)
        .and_then(|operand| value.loose_cmp(&operand))
        .map_or(false, |ord| accept.contains(&ord))
}

pub(crate) fn gt(value: &Value, data: &Value, param: &str) -> bool {
    ordered(value, data, param, &[Ordering::Greater])
}

pub(crate) fn egt(value: &Value, data: &Value, param: &str) -> bool {
    ordered(value, data, param, &[Ordering::Greater, Ordering::Equal])
}

pub(crate) fn lt(value: &Value, data: &Value, param: &str) -> bool {
    ordered(value, data, param, &[Ordering::Less])
}

pub(crate) fn elt(value: &Value, data: &Value, param: &str) -> bool {
    ordered(value, data, param, &[Ordering::Less, Ordering::Equal])
}

/// Loose equality with the literal parameter.
pub(crate) fn eq(value: &Value, _data: &Value, param: &str) -> bool {
    value.loose_eq(&Value::from(param))
}

/// Strict equality with another field.
pub(crate) fn same(value: &Value, data: &Value, param: &str) -> bool {
    get_value(data, param).map_or(false, |other| *other == *value)
}

/// Loose inequality with another field; a missing field counts as null.
pub(crate) fn different(value: &Value, data: &Value, param: &str) -> bool {
    let other = get_value(data, param).unwrap_or(Cow::Owned(Value::Null));
    !value.loose_eq(&other)
}

/// Conventional partner of a confirmation field: `password_confirm`
/// pairs with `password`, anything else with `<field>_confirm`.
fn confirm_partner(field: &str) -> String {
    match field.find("_confirm") {
        Some(pos) => field[..pos].to_string(),
        None => format!("{}_confirm", field),
    }
}

/// Strict equality with the named field, or with the conventional partner.
pub(crate) fn confirm(value: &Value, data: &Value, field: &str, param: Option<&str>) -> bool {
    let target = param.map_or_else(|| confirm_partner(field), str::to_string);
    same(value, data, &target)
}

/// Like [`confirm`], additionally accepting a matching `<field>_confirmation`.
pub(crate) fn confirmed(value: &Value, data: &Value, field: &str, param: Option<&str>) -> bool {
    confirm(value, data, field, param) || same(value, data, &format!("{}_confirmation", field))
}

fn list(param: &str) -> impl Iterator<Item = &str> {
    param.split(',').map(str::trim)
}

/// Loose membership in a comma-separated list.
pub(crate) fn in_list(value: &Value, param: &str) -> bool {
    list(param).any(|item| value.loose_eq(&Value::from(item)))
}

pub(crate) fn not_in_list(value: &Value, param: &str) -> bool {
    !in_list(value, param)
}

/// The value (an address) appears verbatim in the list.
pub(crate) fn allow_ip(value: &Value, param: &str) -> bool {
    value
        .as_str()
        .map_or(false, |addr| list(param).any(|item| item == addr.trim()))
}

pub(crate) fn deny_ip(value: &Value, param: &str) -> bool {
    !allow_ip(value, param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Value {
        Value::from(json!({
            "password": "secret123",
            "password_confirm": "secret123",
            "min_age": 18,
            "role": "admin",
            "code": "42"
        }))
    }

    #[test]
    fn ordering_against_fields_and_literals() {
        let data = data();
        assert!(gt(&Value::Int(20), &data, "min_age"));
        assert!(!gt(&Value::Int(18), &data, "min_age"));
        assert!(egt(&Value::Int(18), &data, "min_age"));
        assert!(lt(&Value::from("5"), &data, "10"));
        assert!(elt(&Value::Int(10), &data, "10"));
        assert!(!gt(&Value::Int(20), &data, "missing"));
    }

    #[test]
    fn equality_family() {
        let data = data();
        assert!(!eq(&Value::Int(42), &data, "code"));
        assert!(eq(&Value::Int(42), &data, "42"));
        assert!(eq(&Value::from("admin"), &data, "admin"));
        assert!(same(&Value::from("secret123"), &data, "password"));
        assert!(!same(&Value::Int(42), &data, "code"));
        assert!(different(&Value::from("user"), &data, "role"));
        assert!(!different(&Value::from("admin"), &data, "role"));
    }

    #[test]
    fn confirmation_fields() {
        let data = data();
        let pw = Value::from("secret123");
        assert!(confirm(&pw, &data, "password", None));
        assert!(confirm(&pw, &data, "password_confirm", None));
        assert!(confirmed(&pw, &data, "password_confirm", Some("password")));
        assert!(!confirm(&Value::from("other"), &data, "password", None));

        let laravel = Value::from(json!({"email": "a@b.co", "email_confirmation": "a@b.co"}));
        assert!(confirmed(&Value::from("a@b.co"), &laravel, "email", None));
    }

    #[test]
    fn list_membership() {
        assert!(in_list(&Value::from("b"), "a,b,c"));
        assert!(in_list(&Value::Int(2), "1, 2, 3"));
        assert!(!in_list(&Value::from("d"), "a,b,c"));
        assert!(not_in_list(&Value::from("d"), "a,b,c"));
    }

    #[test]
    fn ip_lists() {
        assert!(allow_ip(&Value::from("10.0.0.1"), "10.0.0.1,10.0.0.2"));
        assert!(!allow_ip(&Value::from("10.0.0.3"), "10.0.0.1,10.0.0.2"));
        assert!(deny_ip(&Value::from("10.0.0.3"), "10.0.0.1"));
    }
}
