//! Date rules and the permissive date parser behind them.

use crate::path::get_value;
use crate::value::{is_numeric_str, Value};
use chrono::format::{parse, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{DateTime, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%Y%m%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

fn relative_regex() -> &'static Regex {
    static RELATIVE: OnceLock<Regex> = OnceLock::new();
    RELATIVE.get_or_init(|| {
        Regex::new(
            r"^([+-]?\d+)\s*(sec|second|min|minute|hour|day|week|fortnight|month|year)s?(\s+ago)?$",
        )
        .unwrap()
    })
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn from_timestamp(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&Local).naive_local())
}

fn relative(text: &str) -> Option<NaiveDateTime> {
    let caps = relative_regex().captures(text)?;
    let mut amount: i64 = caps[1].parse().ok()?;
    if caps.get(3).is_some() {
        amount = amount.checked_neg()?;
    }
    let base = now();
    let delta = match &caps[2] {
        "sec" | "second" => Duration::try_seconds(amount),
        "min" | "minute" => Duration::try_minutes(amount),
        "hour" => Duration::try_hours(amount),
        "day" => Duration::try_days(amount),
        "week" => Duration::try_weeks(amount),
        "fortnight" => Duration::try_weeks(amount.checked_mul(2)?),
        unit => {
            let months = if unit == "year" {
                amount.checked_mul(12)?
            } else {
                amount
            };
            let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            return if months >= 0 {
                base.checked_add_months(count)
            } else {
                base.checked_sub_months(count)
            };
        }
    };
    base.checked_add_signed(delta?)
}

/// Parse the date forms accepted by the date rules: keywords (`now`,
/// `today`, `tomorrow`, `yesterday`), relative offsets (`+1 day`,
/// `2 weeks ago`), `@<unix seconds>`, RFC 3339 / RFC 2822 and the common
/// numeric and textual layouts. Naive times are local.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let lower = text.to_ascii_lowercase();
    let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0);
    match lower.as_str() {
        "now" => return Some(now()),
        "today" | "midnight" => return midnight(now().date()),
        "tomorrow" => return now().date().succ_opt().and_then(midnight),
        "yesterday" => return now().date().pred_opt().and_then(midnight),
        _ => {}
    }
    if let Some(ts) = lower.strip_prefix('@') {
        return ts.parse().ok().and_then(from_timestamp);
    }
    if let Some(dt) = relative(&lower) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(midnight)
        })
        .or_else(|| {
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
                .map(|t| now().date().and_time(t))
        })
}

fn value_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// Resolve a comparison bound: a non-blank field of that name wins,
/// otherwise the parameter is parsed as a date.
fn bound(data: &Value, param: &str) -> Option<NaiveDateTime> {
    if !is_numeric_str(param) {
        if let Some(field) = get_value(data, param).filter(|v| !v.is_blank()) {
            return value_date(&field);
        }
    }
    parse_date(param)
}

fn compare(
    value: &Value,
    data: &Value,
    param: &str,
    accept: impl Fn(NaiveDateTime, NaiveDateTime) -> bool,
) -> bool {
    match (value_date(value), bound(data, param)) {
        (Some(left), Some(right)) => accept(left, right),
        _ => false,
    }
}

pub(crate) fn date(value: &Value) -> bool {
    value_date(value).is_some()
}

pub(crate) fn after(value: &Value, data: &Value, param: &str) -> bool {
    compare(value, data, param, |a, b| a > b)
}

pub(crate) fn after_or_equal(value: &Value, data: &Value, param: &str) -> bool {
    compare(value, data, param, |a, b| a >= b)
}

pub(crate) fn before(value: &Value, data: &Value, param: &str) -> bool {
    compare(value, data, param, |a, b| a < b)
}

pub(crate) fn before_or_equal(value: &Value, data: &Value, param: &str) -> bool {
    compare(value, data, param, |a, b| a <= b)
}

/// Now falls inside `start,end`. Bounds are dates or unix timestamps.
pub(crate) fn expire(param: &str) -> bool {
    let point = |raw: &str| {
        let raw = raw.trim();
        if is_numeric_str(raw) {
            raw.parse::<i64>().ok().and_then(from_timestamp)
        } else {
            parse_date(raw)
        }
    };
    let Some((start, end)) = param.split_once(',') else {
        return false;
    };
    let current = now();
    match (point(start), point(end)) {
        (Some(start), Some(end)) => current >= start && current <= end,
        _ => false,
    }
}

/// Translate a letter-style date format (`Y-m-d H:i:s`) into strftime items.
fn translate_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        let item = match c {
            'd' | 'j' => "%d",
            'D' => "%a",
            'l' => "%A",
            'm' | 'n' => "%m",
            'M' => "%b",
            'F' => "%B",
            'Y' => "%Y",
            'y' => "%y",
            'H' | 'G' => "%H",
            'h' | 'g' => "%I",
            'i' => "%M",
            's' => "%S",
            'A' | 'a' => "%p",
            'U' => "%s",
            'u' => "%6f",
            'v' => "%3f",
            'O' => "%z",
            'P' => "%:z",
            '%' => "%%",
            '\\' => {
                if let Some(escaped) = chars.next() {
                    if escaped == '%' {
                        out.push_str("%%");
                    } else {
                        out.push(escaped);
                    }
                }
                continue;
            }
            other => {
                out.push(other);
                continue;
            }
        };
        out.push_str(item);
    }
    out
}

/// The whole value matches the format and the fields it sets form a real
/// date and time.
pub(crate) fn date_format(value: &Value, param: &str) -> bool {
    let Some(text) = value.as_str() else {
        return false;
    };
    let format = translate_format(param);
    let mut parsed = Parsed::new();
    if parse(&mut parsed, text, StrftimeItems::new(&format)).is_err() {
        return false;
    }
    let consistent = |kind: Option<ParseErrorKind>| {
        !matches!(
            kind,
            Some(ParseErrorKind::OutOfRange | ParseErrorKind::Impossible)
        )
    };
    consistent(parsed.to_naive_date().err().map(|e| e.kind()))
        && consistent(parsed.to_naive_time().err().map(|e| e.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn parses_common_layouts() {
        assert!(parse_date("2024-01-15").is_some());
        assert!(parse_date("2024-01-15 10:30:00").is_some());
        assert!(parse_date("2024/01/15").is_some());
        assert!(parse_date("15-01-2024").is_some());
        assert!(parse_date("2024-01-15T10:30:00+02:00").is_some());
        assert!(parse_date("15 January 2024").is_some());
        assert!(parse_date("@1700000000").is_some());
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("2024-13-45").is_none());
    }

    #[test]
    fn keywords_and_offsets() {
        let today = parse_date("today").unwrap();
        let tomorrow = parse_date("tomorrow").unwrap();
        assert!(tomorrow > today);
        assert!(parse_date("+1 day").unwrap() > parse_date("now").unwrap() - Duration::seconds(1));
        assert!(parse_date("2 weeks ago").unwrap() < today);
        assert!(parse_date("-1 year").unwrap() < today);
    }

    #[test]
    fn huge_offsets_are_not_dates() {
        assert!(parse_date("9999999999999999 days").is_none());
        assert!(parse_date("9223372036854775807 fortnights").is_none());
        assert!(parse_date("9223372036854775807 years").is_none());
        assert!(parse_date("-9223372036854775808 seconds ago").is_none());
        assert!(!date(&s("9999999999999999 days")));
    }

    #[test]
    fn date_rule() {
        assert!(date(&s("2024-01-15")));
        assert!(!date(&s("invalid")));
        assert!(!date(&Value::Int(20240115)));
    }

    #[test]
    fn comparisons() {
        let data = Value::from(json!({"start_date": "2024-01-01"}));
        assert!(after(&s("2024-06-01"), &data, "2024-01-01"));
        assert!(!after(&s("2024-01-01"), &data, "2024-01-01"));
        assert!(after_or_equal(&s("2024-01-01"), &data, "2024-01-01"));
        assert!(before(&s("2023-12-31"), &data, "2024-01-01"));
        assert!(before_or_equal(&s("2024-01-01"), &data, "2024-01-01"));
        assert!(after(&s("2024-02-01"), &data, "start_date"));
        assert!(!after(&s("2023-02-01"), &data, "start_date"));
        assert!(!after(&s("garbage"), &data, "2024-01-01"));
    }

    #[test]
    fn expiry_window() {
        assert!(expire("yesterday,tomorrow"));
        assert!(!expire("2000-01-01,2000-12-31"));
        assert!(expire("0,4102444800"));
    }

    #[test]
    fn explicit_formats() {
        assert!(date_format(&s("2024-01-15"), "Y-m-d"));
        assert!(!date_format(&s("01/15/2024"), "Y-m-d"));
        assert!(!date_format(&s("2024-02-30"), "Y-m-d"));
        assert!(!date_format(&s("2024-01-15 extra"), "Y-m-d"));
        assert!(date_format(&s("2024-01-15 10:30:45"), "Y-m-d H:i:s"));
        assert!(date_format(&s("10:30"), "H:i"));
        assert!(!date_format(&s("25:30"), "H:i"));
        assert!(date_format(&s("15.01.2024"), "d.m.Y"));
    }
}
