//! Message catalogs and template rendering.
//!
//! Templates use `:attribute` (the field title), `:rule` (the raw rule
//! parameter) and `:1`, `:2`, `:3` (the comma-separated parts of a
//! parameter that contains a comma).

use crate::registry::RuleRegistry;
use crate::rule::RuleToken;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of the built-in messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en", alias = "en_US", alias = "en-US")]
    En,
    #[serde(rename = "zh_CN", alias = "zh-CN", alias = "zh")]
    ZhCn,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhCn => "zh_CN",
        }
    }

    fn fallback(self) -> &'static str {
        match self {
            Locale::En => ":attribute does not satisfy the rule",
            Locale::ZhCn => ":attribute规则不符",
        }
    }

    /// Message for a list of nested rule sets applied to a non-list value.
    pub(crate) fn nested_message(self) -> &'static str {
        match self {
            Locale::En => ":attribute must be a list of objects",
            Locale::ZhCn => ":attribute必须为二维数组",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "en" | "en_US" | "en-US" => Ok(Locale::En),
            "zh_CN" | "zh-CN" | "zh" => Ok(Locale::ZhCn),
            other => Err(format!("unsupported locale `{}`", other)),
        }
    }
}

/// Built-in template for a rule, by canonical name.
pub fn default_message(locale: Locale, rule: &str) -> Option<&'static str> {
    match locale {
        Locale::En => english(rule),
        Locale::ZhCn => chinese(rule),
    }
}

fn english(rule: &str) -> Option<&'static str> {
    let msg = match rule {
        "required" | "must" => ":attribute is required",
        "numeric" => ":attribute must be a number",
        "integer" => ":attribute must be an integer",
        "float" => ":attribute must be a float",
        "boolean" => ":attribute must be a boolean",
        "string" => ":attribute must be a string",
        "array" => ":attribute must be an array",
        "accepted" => ":attribute must be yes, on or 1",
        "email" => ":attribute must be a valid email address",
        "url" => ":attribute must be a valid URL",
        "ip" => ":attribute must be a valid IP address",
        "ipv4" => ":attribute must be a valid IPv4 address",
        "ipv6" => ":attribute must be a valid IPv6 address",
        "macAddr" => ":attribute must be a valid MAC address",
        "json" => ":attribute must be a valid JSON string",
        "date" => ":attribute is not a valid date",
        "dateFormat" => ":attribute must match the date format :rule",
        "file" => ":attribute is not a valid uploaded file",
        "image" => ":attribute is not a valid image",
        "fileSize" => ":attribute exceeds the allowed file size",
        "fileExt" => ":attribute has a disallowed file extension",
        "fileMime" => ":attribute has a disallowed file type",
        "alpha" => ":attribute may only contain letters",
        "alphaNum" => ":attribute may only contain letters and numbers",
        "alphaDash" => ":attribute may only contain letters, numbers, dashes and underscores",
        "chs" => ":attribute may only contain Chinese characters",
        "chsAlpha" => ":attribute may only contain Chinese characters and letters",
        "chsAlphaNum" => ":attribute may only contain Chinese characters, letters and numbers",
        "chsDash" => {
            ":attribute may only contain Chinese characters, letters, numbers, dashes and underscores"
        }
        "mobile" => ":attribute must be a valid mobile number",
        "idCard" => ":attribute must be a valid ID card number",
        "zip" => ":attribute must be a valid postal code",
        "regex" => ":attribute has an invalid format",
        "in" => ":attribute must be one of :rule",
        "notIn" => ":attribute must not be one of :rule",
        "between" => ":attribute must be between :1 and :2",
        "notBetween" => ":attribute must not be between :1 and :2",
        "length" | "size" => ":attribute length must be :rule",
        "max" => ":attribute may not be longer than :rule",
        "min" => ":attribute must be at least :rule long",
        "after" => ":attribute must be a date after :rule",
        "afterOrEqual" => ":attribute must be a date after or equal to :rule",
        "before" => ":attribute must be a date before :rule",
        "beforeOrEqual" => ":attribute must be a date before or equal to :rule",
        "expire" => "outside the validity period :rule",
        "allowIp" => "access from this IP address is not allowed",
        "denyIp" => "access from this IP address is denied",
        "confirm" | "confirmed" => ":attribute confirmation does not match",
        "same" => ":attribute must match :rule",
        "different" => ":attribute must differ from :rule",
        "gt" => ":attribute must be greater than :rule",
        "egt" => ":attribute must be greater than or equal to :rule",
        "lt" => ":attribute must be less than :rule",
        "elt" => ":attribute must be less than or equal to :rule",
        "eq" => ":attribute must be equal to :rule",
        _ => return None,
    };
    Some(msg)
}

fn chinese(rule: &str) -> Option<&'static str> {
    let msg = match rule {
        "required" | "must" => ":attribute不能为空",
        "numeric" => ":attribute必须是数字",
        "integer" => ":attribute必须是整数",
        "float" => ":attribute必须是浮点数",
        "boolean" => ":attribute必须是布尔值",
        "string" => ":attribute必须是字符串",
        "array" => ":attribute必须是数组",
        "accepted" => ":attribute必须是yes、on或者1",
        "email" => ":attribute格式不符",
        "url" => ":attribute不是有效的URL地址",
        "ip" | "ipv4" | "ipv6" => ":attribute不是有效的IP地址",
        "macAddr" => ":attribute不是有效的MAC地址",
        "json" => ":attribute不是有效的JSON字符串",
        "date" => ":attribute格式不符合",
        "dateFormat" => ":attribute必须使用日期格式 :rule",
        "file" => ":attribute不是有效的上传文件",
        "image" => ":attribute不是有效的图像文件",
        "fileSize" => "上传文件大小不符",
        "fileExt" => "上传文件后缀不符",
        "fileMime" => "上传文件类型不符",
        "alpha" => ":attribute只能是字母",
        "alphaNum" => ":attribute只能是字母和数字",
        "alphaDash" => ":attribute只能是字母、数字和下划线_及破折号-",
        "chs" => ":attribute只能是汉字",
        "chsAlpha" => ":attribute只能是汉字、字母",
        "chsAlphaNum" => ":attribute只能是汉字、字母和数字",
        "chsDash" => ":attribute只能是汉字、字母、数字和下划线_及破折号-",
        "mobile" => ":attribute手机号格式不正确",
        "idCard" => ":attribute身份证格式不正确",
        "zip" => ":attribute邮政编码格式不正确",
        "regex" => ":attribute不符合指定规则",
        "in" => ":attribute必须在 :rule 范围内",
        "notIn" => ":attribute不能在 :rule 范围内",
        "between" => ":attribute只能在 :1 - :2 之间",
        "notBetween" => ":attribute不能在 :1 - :2 之间",
        "length" | "size" => ":attribute长度不符合要求 :rule",
        "max" => ":attribute长度不能超过 :rule",
        "min" => ":attribute长度不能小于 :rule",
        "after" => ":attribute日期不能小于 :rule",
        "afterOrEqual" => ":attribute日期不能小于 :rule",
        "before" => ":attribute日期不能超过 :rule",
        "beforeOrEqual" => ":attribute日期不能超过 :rule",
        "expire" => "不在有效期内 :rule",
        "allowIp" => "不允许的IP访问",
        "denyIp" => "禁止的IP访问",
        "confirm" | "confirmed" => ":attribute和确认字段不一致",
        "same" => ":attribute必须和 :rule 相同",
        "different" => ":attribute和比较字段 :rule 不能相同",
        "gt" => ":attribute必须大于 :rule",
        "egt" => ":attribute必须大于等于 :rule",
        "lt" => ":attribute必须小于 :rule",
        "elt" => ":attribute必须小于等于 :rule",
        "eq" => ":attribute必须等于 :rule",
        _ => return None,
    };
    Some(msg)
}

/// Fill a template. Templates without a `:` are returned untouched.
pub fn render(template: &str, title: &str, param: Option<&str>) -> String {
    if !template.contains(':') {
        return template.to_string();
    }
    let raw = param.unwrap_or_default();
    let parts: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else {
        Vec::new()
    };
    let part = |i: usize| parts.get(i).copied().unwrap_or_default();

    template
        .replace(":attribute", title)
        .replace(":rule", raw)
        .replace(":1", part(0))
        .replace(":2", part(1))
        .replace(":3", part(2))
}

/// Picks the template for a failed rule and renders it.
pub(crate) struct MessageResolver<'a> {
    pub messages: &'a IndexMap<String, String>,
    pub registry: &'a RuleRegistry,
    pub locale: Locale,
}

impl MessageResolver<'_> {
    /// Template lookup order: session `field.rule`, session `field`,
    /// session `rule`, registry message, locale catalog, the locale's
    /// `required` message for any `require*` rule, then a generic fallback.
    /// `fields` lists the keys to try for the field (expanded path first,
    /// then the wildcard pattern it came from).
    pub fn template(&self, fields: &[&str], token: &RuleToken) -> String {
        let names = [token.name(), token.kind().name()];
        for field in fields {
            for name in names {
                if let Some(msg) = self.messages.get(&format!("{}.{}", field, name)) {
                    return msg.clone();
                }
            }
        }
        for field in fields {
            if let Some(msg) = self.messages.get(*field) {
                return msg.clone();
            }
        }
        for name in names {
            if let Some(msg) = self.messages.get(name) {
                return msg.clone();
            }
        }
        for name in names {
            if let Some(msg) = self.registry.type_msg(name) {
                return msg;
            }
        }
        if let Some(msg) = default_message(self.locale, token.kind().name()) {
            return msg.to_string();
        }
        if token.name().starts_with("require") {
            if let Some(msg) = default_message(self.locale, "required") {
                return msg.to_string();
            }
        }
        self.locale.fallback().to_string()
    }

    pub fn resolve(&self, fields: &[&str], title: &str, token: &RuleToken) -> String {
        render(&self.template(fields, token), title, token.param())
    }
}
