//! Pattern and format rules: email, URL, IP and MAC addresses, the named
//! character-class patterns and user-supplied regular expressions.

use crate::error::RuleSyntaxError;
use crate::value::Value;
use regex::Regex;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{OnceLock, PoisonError, RwLock};

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static MAC_REGEX: OnceLock<Regex> = OnceLock::new();
static PATTERN_CACHE: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // RFC 5322 simplified, with a dotted domain
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
        ).unwrap()
    })
}

fn mac_regex() -> &'static Regex {
    MAC_REGEX.get_or_init(|| {
        Regex::new(
            r"^(?:(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}|(?:[0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2}|[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4})$",
        )
        .unwrap()
    })
}

/// Built-in named patterns. `regex:alpha` and a bare `alpha` both use them.
pub(crate) fn named_pattern(name: &str) -> Option<&'static str> {
    let pattern = match name {
        "alpha" => r"^[A-Za-z]+$",
        "alphaNum" => r"^[A-Za-z0-9]+$",
        "alphaDash" => r"^[A-Za-z0-9\-_]+$",
        "chs" => r"^[\x{4e00}-\x{9fa5}]+$",
        "chsAlpha" => r"^[\x{4e00}-\x{9fa5}a-zA-Z]+$",
        "chsAlphaNum" => r"^[\x{4e00}-\x{9fa5}a-zA-Z0-9]+$",
        "chsDash" => r"^[\x{4e00}-\x{9fa5}a-zA-Z0-9_\-]+$",
        "mobile" => r"^1[3-9][0-9]\d{8}$",
        "idCard" => {
            r"(^[1-9]\d{5}(18|19|([23]\d))\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{3}[0-9Xx]$)|(^[1-9]\d{5}\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{2}$)"
        }
        "zip" => r"^\d{6}$",
        _ => return None,
    };
    Some(pattern)
}

/// Turn a rule parameter into a Rust pattern.
///
/// `/body/flags` is unwrapped with `i`, `m`, `s`, `x` and `U` mapped to
/// inline flags (`u` is implied). A named pattern resolves to its
/// definition. Anything else is matched against the whole value.
fn translate(param: &str) -> String {
    if let Some(pattern) = named_pattern(param) {
        return pattern.to_string();
    }
    if let Some(rest) = param.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            let (body, flags) = (&rest[..end], &rest[end + 1..]);
            if flags.chars().all(|c| "imsxuU".contains(c)) {
                let inline: String = flags.chars().filter(|c| *c != 'u').collect();
                return if inline.is_empty() {
                    body.to_string()
                } else {
                    format!("(?{}){}", inline, body)
                };
            }
        }
    }
    format!("^(?:{})$", param)
}

/// Compile (and cache) the pattern named by a rule parameter.
pub(crate) fn compile_pattern(param: &str) -> Result<Regex, RuleSyntaxError> {
    let cache = PATTERN_CACHE.get_or_init(Default::default);
    if let Some(regex) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(param)
    {
        return Ok(regex.clone());
    }

    let regex = Regex::new(&translate(param)).map_err(|e| RuleSyntaxError::InvalidRegex {
        pattern: param.to_string(),
        reason: e.to_string(),
    })?;
    cache
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(param.to_string(), regex.clone());
    Ok(regex)
}

/// Match a scalar's text form; containers, files and null never match.
pub(crate) fn matches(value: &Value, param: &str) -> Result<bool, RuleSyntaxError> {
    let regex = compile_pattern(param)?;
    Ok(match value {
        Value::Null => false,
        scalar => scalar.to_text().map_or(false, |text| regex.is_match(&text)),
    })
}

fn text(value: &Value) -> Option<&str> {
    value.as_str()
}

pub(crate) fn email(value: &Value) -> bool {
    text(value).map_or(false, |s| email_regex().is_match(s))
}

/// Absolute URL with a host.
pub(crate) fn url(value: &Value) -> bool {
    text(value)
        .and_then(|s| url::Url::parse(s).ok())
        .map_or(false, |url| url.has_host())
}

pub(crate) fn ipv4(value: &Value) -> bool {
    text(value).map_or(false, |s| s.parse::<Ipv4Addr>().is_ok())
}

pub(crate) fn ipv6(value: &Value) -> bool {
    text(value).map_or(false, |s| s.parse::<Ipv6Addr>().is_ok())
}

/// `ip` accepts either family; `ip:ipv4` / `ip:ipv6` restrict it.
pub(crate) fn ip(value: &Value, param: Option<&str>) -> bool {
    match param {
        Some("ipv4") => ipv4(value),
        Some("ipv6") => ipv6(value),
        _ => ipv4(value) || ipv6(value),
    }
}

pub(crate) fn mac_addr(value: &Value) -> bool {
    text(value).map_or(false, |s| mac_regex().is_match(s))
}

pub(crate) fn json(value: &Value) -> bool {
    text(value).map_or(false, |s| {
        serde_json::from_str::<serde_json::Value>(s).is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn email_format() {
        assert!(email(&s("test@example.com")));
        assert!(email(&s("test.user@domain.co.uk")));
        assert!(!email(&s("invalid-email")));
        assert!(!email(&s("@example.com")));
        assert!(!email(&s("user@")));
        assert!(!email(&Value::Int(5)));
    }

    #[test]
    fn url_format() {
        assert!(url(&s("https://example.com")));
        assert!(url(&s("http://localhost:8080/path?q=1")));
        assert!(!url(&s("not-a-url")));
        assert!(!url(&s("ftp://")));
    }

    #[test]
    fn ip_families() {
        assert!(ip(&s("192.168.1.1"), None));
        assert!(ip(&s("::1"), None));
        assert!(!ip(&s("256.256.256.256"), None));
        assert!(!ip(&s("::1"), Some("ipv4")));
        assert!(ipv6(&s("2001:db8::1")));
    }

    #[test]
    fn mac_format() {
        assert!(mac_addr(&s("00:1A:2B:3C:4D:5E")));
        assert!(mac_addr(&s("00-1a-2b-3c-4d-5e")));
        assert!(mac_addr(&s("001a.2b3c.4d5e")));
        assert!(!mac_addr(&s("00:1A:2B:3C:4D")));
        assert!(!mac_addr(&s("00:1A-2B:3C:4D:5E")));
    }

    #[test]
    fn named_patterns() {
        assert!(matches(&s("abcXYZ"), "alpha").unwrap());
        assert!(!matches(&s("abc123"), "alpha").unwrap());
        assert!(matches(&s("abc_1-2"), "alphaDash").unwrap());
        assert!(matches(&s("中文"), "chs").unwrap());
        assert!(matches(&s("13812345678"), "mobile").unwrap());
        assert!(!matches(&s("12345"), "zip").unwrap());
    }

    #[test]
    fn delimited_and_bare_patterns() {
        assert!(matches(&s("ABC"), "/^abc$/i").unwrap());
        assert!(matches(&s("x123y"), r"/\d+/").unwrap());
        assert!(matches(&s("123"), r"\d+").unwrap());
        assert!(!matches(&s("x123"), r"\d+").unwrap());
        assert!(matches(&Value::Int(42), r"\d+").unwrap());
        assert!(!matches(&Value::Array(vec![]), r"\d*").unwrap());
    }

    #[test]
    fn invalid_pattern() {
        assert!(matches!(
            compile_pattern("/(abc/"),
            Err(RuleSyntaxError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn json_text() {
        assert!(json(&s(r#"{"a": 1}"#)));
        assert!(!json(&s("{a: 1}")));
    }
}
