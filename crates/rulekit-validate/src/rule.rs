//! Rule tokens: the typed form of `name:param` segments, plus the
//! tokenizer that turns `required|string|max:20` into them.

use crate::error::RuleSyntaxError;
use crate::predicates::format::compile_pattern;
use crate::rules::RuleMap;
use crate::value::{is_numeric_str, Value};
use std::fmt;
use std::sync::Arc;

/// Result of evaluating one rule.
///
/// `FailedWith` carries a message that replaces the templated one; custom
/// rules use it to report their own errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Passed,
    Failed,
    FailedWith(String),
}

impl RuleOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, RuleOutcome::Passed)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            RuleOutcome::FailedWith(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<bool> for RuleOutcome {
    fn from(passed: bool) -> Self {
        if passed {
            RuleOutcome::Passed
        } else {
            RuleOutcome::Failed
        }
    }
}

impl From<String> for RuleOutcome {
    fn from(message: String) -> Self {
        RuleOutcome::FailedWith(message)
    }
}

impl From<&str> for RuleOutcome {
    fn from(message: &str) -> Self {
        RuleOutcome::FailedWith(message.to_string())
    }
}

impl From<Result<(), String>> for RuleOutcome {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => RuleOutcome::Passed,
            Err(message) => RuleOutcome::FailedWith(message),
        }
    }
}

/// Field-level closure: receives the field value and the whole data tree.
pub type ClosureRule = Arc<dyn Fn(&Value, &Value) -> RuleOutcome + Send + Sync>;

/// Condition deciding whether `requireCallback` makes a field required.
pub type Condition = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Every rule the engine knows. Names outside this set parse as
/// [`RuleKind::Custom`] and are resolved at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Required,
    Must,
    Nullable,
    Sometimes,
    Default,
    String,
    Integer,
    Numeric,
    Boolean,
    Array,
    Float,
    Accepted,
    Min,
    Max,
    Length,
    Size,
    Between,
    NotBetween,
    Email,
    Url,
    Ip,
    Ipv4,
    Ipv6,
    MacAddr,
    Alpha,
    AlphaNum,
    AlphaDash,
    Chs,
    ChsAlpha,
    ChsAlphaNum,
    ChsDash,
    Mobile,
    IdCard,
    Zip,
    Regex,
    Json,
    Date,
    DateFormat,
    After,
    Before,
    AfterOrEqual,
    BeforeOrEqual,
    Expire,
    Gt,
    Egt,
    Lt,
    Elt,
    Eq,
    Same,
    Confirm,
    Confirmed,
    Different,
    RequireIf,
    RequireWith,
    RequireWithout,
    RequireCallback,
    File,
    Image,
    FileExt,
    FileMime,
    FileSize,
    In,
    NotIn,
    AllowIp,
    DenyIp,
    Closure,
    Custom(String),
}

impl RuleKind {
    /// Resolve a rule name. Symbols and snake_case spellings are accepted.
    pub fn from_name(name: &str) -> Self {
        let name = canonical_name(name);
        match name.as_str() {
            "required" | "require" => RuleKind::Required,
            "must" => RuleKind::Must,
            "nullable" => RuleKind::Nullable,
            "sometimes" => RuleKind::Sometimes,
            "default" => RuleKind::Default,
            "string" => RuleKind::String,
            "integer" | "int" => RuleKind::Integer,
            "numeric" | "number" => RuleKind::Numeric,
            "boolean" | "bool" => RuleKind::Boolean,
            "array" => RuleKind::Array,
            "float" => RuleKind::Float,
            "accepted" => RuleKind::Accepted,
            "min" => RuleKind::Min,
            "max" => RuleKind::Max,
            "length" => RuleKind::Length,
            "size" => RuleKind::Size,
            "between" => RuleKind::Between,
            "notBetween" => RuleKind::NotBetween,
            "email" => RuleKind::Email,
            "url" => RuleKind::Url,
            "ip" => RuleKind::Ip,
            "ipv4" => RuleKind::Ipv4,
            "ipv6" => RuleKind::Ipv6,
            "macAddr" => RuleKind::MacAddr,
            "alpha" => RuleKind::Alpha,
            "alphaNum" => RuleKind::AlphaNum,
            "alphaDash" => RuleKind::AlphaDash,
            "chs" => RuleKind::Chs,
            "chsAlpha" => RuleKind::ChsAlpha,
            "chsAlphaNum" => RuleKind::ChsAlphaNum,
            "chsDash" => RuleKind::ChsDash,
            "mobile" => RuleKind::Mobile,
            "idCard" => RuleKind::IdCard,
            "zip" => RuleKind::Zip,
            "regex" => RuleKind::Regex,
            "json" => RuleKind::Json,
            "date" => RuleKind::Date,
            "dateFormat" => RuleKind::DateFormat,
            "after" => RuleKind::After,
            "before" => RuleKind::Before,
            "afterOrEqual" => RuleKind::AfterOrEqual,
            "beforeOrEqual" => RuleKind::BeforeOrEqual,
            "expire" => RuleKind::Expire,
            "gt" => RuleKind::Gt,
            "egt" => RuleKind::Egt,
            "lt" => RuleKind::Lt,
            "elt" => RuleKind::Elt,
            "eq" => RuleKind::Eq,
            "same" => RuleKind::Same,
            "confirm" => RuleKind::Confirm,
            "confirmed" => RuleKind::Confirmed,
            "different" => RuleKind::Different,
            "requireIf" | "requiredIf" => RuleKind::RequireIf,
            "requireWith" | "requiredWith" => RuleKind::RequireWith,
            "requireWithout" | "requiredWithout" => RuleKind::RequireWithout,
            "requireCallback" | "requiredCallback" => RuleKind::RequireCallback,
            "file" => RuleKind::File,
            "image" => RuleKind::Image,
            "fileExt" => RuleKind::FileExt,
            "fileMime" => RuleKind::FileMime,
            "fileSize" => RuleKind::FileSize,
            "in" => RuleKind::In,
            "notIn" => RuleKind::NotIn,
            "allowIp" => RuleKind::AllowIp,
            "denyIp" => RuleKind::DenyIp,
            _ => RuleKind::Custom(name),
        }
    }

    /// Canonical name, used as the message-catalog key.
    pub fn name(&self) -> &str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Must => "must",
            RuleKind::Nullable => "nullable",
            RuleKind::Sometimes => "sometimes",
            RuleKind::Default => "default",
            RuleKind::String => "string",
            RuleKind::Integer => "integer",
            RuleKind::Numeric => "numeric",
            RuleKind::Boolean => "boolean",
            RuleKind::Array => "array",
            RuleKind::Float => "float",
            RuleKind::Accepted => "accepted",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::Length => "length",
            RuleKind::Size => "size",
            RuleKind::Between => "between",
            RuleKind::NotBetween => "notBetween",
            RuleKind::Email => "email",
            RuleKind::Url => "url",
            RuleKind::Ip => "ip",
            RuleKind::Ipv4 => "ipv4",
            RuleKind::Ipv6 => "ipv6",
            RuleKind::MacAddr => "macAddr",
            RuleKind::Alpha => "alpha",
            RuleKind::AlphaNum => "alphaNum",
            RuleKind::AlphaDash => "alphaDash",
            RuleKind::Chs => "chs",
            RuleKind::ChsAlpha => "chsAlpha",
            RuleKind::ChsAlphaNum => "chsAlphaNum",
            RuleKind::ChsDash => "chsDash",
            RuleKind::Mobile => "mobile",
            RuleKind::IdCard => "idCard",
            RuleKind::Zip => "zip",
            RuleKind::Regex => "regex",
            RuleKind::Json => "json",
            RuleKind::Date => "date",
            RuleKind::DateFormat => "dateFormat",
            RuleKind::After => "after",
            RuleKind::Before => "before",
            RuleKind::AfterOrEqual => "afterOrEqual",
            RuleKind::BeforeOrEqual => "beforeOrEqual",
            RuleKind::Expire => "expire",
            RuleKind::Gt => "gt",
            RuleKind::Egt => "egt",
            RuleKind::Lt => "lt",
            RuleKind::Elt => "elt",
            RuleKind::Eq => "eq",
            RuleKind::Same => "same",
            RuleKind::Confirm => "confirm",
            RuleKind::Confirmed => "confirmed",
            RuleKind::Different => "different",
            RuleKind::RequireIf => "requireIf",
            RuleKind::RequireWith => "requireWith",
            RuleKind::RequireWithout => "requireWithout",
            RuleKind::RequireCallback => "requireCallback",
            RuleKind::File => "file",
            RuleKind::Image => "image",
            RuleKind::FileExt => "fileExt",
            RuleKind::FileMime => "fileMime",
            RuleKind::FileSize => "fileSize",
            RuleKind::In => "in",
            RuleKind::NotIn => "notIn",
            RuleKind::AllowIp => "allowIp",
            RuleKind::DenyIp => "denyIp",
            RuleKind::Closure => "closure",
            RuleKind::Custom(name) => name,
        }
    }

    /// Rules that make a field required only when a condition holds.
    pub fn is_conditional(&self) -> bool {
        matches!(
            self,
            RuleKind::RequireIf
                | RuleKind::RequireWith
                | RuleKind::RequireWithout
                | RuleKind::RequireCallback
        )
    }

    /// Rules that steer evaluation instead of testing the value.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            RuleKind::Nullable | RuleKind::Sometimes | RuleKind::Default
        )
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map symbol aliases and snake/kebab-case identifiers to camelCase names.
/// Anything that is not identifier-like (a bare pattern, say) is kept as is.
pub(crate) fn canonical_name(name: &str) -> String {
    match name {
        ">" => return "gt".to_string(),
        ">=" => return "egt".to_string(),
        "<" => return "lt".to_string(),
        "<=" => return "elt".to_string(),
        "=" => return "eq".to_string(),
        _ => {}
    }
    let identifier = name.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !identifier {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, c) in name.chars().enumerate() {
        if c == '_' || c == '-' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else if i == 0 {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Clone)]
enum TokenCallback {
    Check(ClosureRule),
    Condition(Condition),
}

/// One parsed rule: a kind, its raw parameter and, for programmatic rules,
/// a callback.
#[derive(Clone)]
pub struct RuleToken {
    name: String,
    kind: RuleKind,
    param: Option<String>,
    callback: Option<TokenCallback>,
}

impl RuleToken {
    /// Parse a single `name` or `name:param` segment.
    pub fn parse(segment: &str) -> Result<Self, RuleSyntaxError> {
        let segment = segment.trim();
        let (name, param) = match segment.find(':') {
            Some(0) => return Err(RuleSyntaxError::EmptyName(segment.to_string())),
            Some(pos) => (&segment[..pos], Some(&segment[pos + 1..])),
            None => (segment, None),
        };
        let name = canonical_name(name.trim());
        if name.is_empty() {
            return Err(RuleSyntaxError::EmptyName(segment.to_string()));
        }
        let kind = RuleKind::from_name(&name);
        let param = param.filter(|p| !p.is_empty()).map(str::to_string);
        check_param(&kind, param.as_deref())?;
        Ok(Self {
            name,
            kind,
            param,
            callback: None,
        })
    }

    /// Build a token from a known kind and parameter.
    pub fn new(kind: RuleKind, param: Option<&str>) -> Result<Self, RuleSyntaxError> {
        check_param(&kind, param)?;
        Ok(Self {
            name: kind.name().to_string(),
            kind,
            param: param.map(str::to_string),
            callback: None,
        })
    }

    /// A closure token, evaluated in chain order like any other rule.
    pub fn closure<F, R>(check: F) -> Self
    where
        F: Fn(&Value, &Value) -> R + Send + Sync + 'static,
        R: Into<RuleOutcome>,
    {
        Self {
            name: RuleKind::Closure.name().to_string(),
            kind: RuleKind::Closure,
            param: None,
            callback: Some(TokenCallback::Check(Arc::new(
                move |value: &Value, data: &Value| -> RuleOutcome { check(value, data).into() },
            ))),
        }
    }

    /// A `requireCallback` token with an inline condition.
    pub fn require_callback<F>(condition: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: RuleKind::RequireCallback.name().to_string(),
            kind: RuleKind::RequireCallback,
            param: None,
            callback: Some(TokenCallback::Condition(Arc::new(condition))),
        }
    }

    /// Name as written (after alias and case normalization).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    pub(crate) fn check_callback(&self) -> Option<&ClosureRule> {
        match &self.callback {
            Some(TokenCallback::Check(f)) => Some(f),
            _ => None,
        }
    }

    pub(crate) fn condition_callback(&self) -> Option<&Condition> {
        match &self.callback {
            Some(TokenCallback::Condition(f)) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Debug for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleToken")
            .field("name", &self.name)
            .field("param", &self.param)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(param) => write!(f, "{}:{}", self.name, param),
            None => f.write_str(&self.name),
        }
    }
}

/// Split a rule string on `|` and parse each segment. Empty segments are
/// ignored.
pub fn tokenize(spec: &str) -> Result<Vec<RuleToken>, RuleSyntaxError> {
    spec.split('|')
        .filter(|segment| !segment.trim().is_empty())
        .map(RuleToken::parse)
        .collect()
}

/// Parse a byte size such as `2048`, `10kb` or `2M`.
pub(crate) fn parse_byte_size(text: &str) -> Option<u64> {
    let text = text.trim().to_ascii_lowercase();
    let digits_end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(digits_end);
    let number: f64 = number.parse().ok()?;
    let factor = match unit.trim().trim_end_matches('b') {
        "" => 1.0,
        "k" => 1024.0,
        "m" => 1024.0 * 1024.0,
        "g" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((number * factor) as u64)
}

fn numeric_bounds(rule: &str, param: &str) -> Result<(), RuleSyntaxError> {
    let parts: Vec<_> = param.split(',').map(str::trim).collect();
    if parts.len() > 2 || parts.iter().any(|p| !is_numeric_str(p)) {
        return Err(RuleSyntaxError::invalid_param(
            rule,
            param,
            "expected a number or a `min,max` pair",
        ));
    }
    Ok(())
}

/// Reject rule definitions whose parameters can never be satisfied.
fn check_param(kind: &RuleKind, param: Option<&str>) -> Result<(), RuleSyntaxError> {
    let rule = kind.name();
    let needs_param = matches!(
        kind,
        RuleKind::Default
            | RuleKind::Min
            | RuleKind::Max
            | RuleKind::Length
            | RuleKind::Size
            | RuleKind::Between
            | RuleKind::NotBetween
            | RuleKind::Regex
            | RuleKind::DateFormat
            | RuleKind::After
            | RuleKind::Before
            | RuleKind::AfterOrEqual
            | RuleKind::BeforeOrEqual
            | RuleKind::Expire
            | RuleKind::Gt
            | RuleKind::Egt
            | RuleKind::Lt
            | RuleKind::Elt
            | RuleKind::Eq
            | RuleKind::Same
            | RuleKind::Different
            | RuleKind::RequireIf
            | RuleKind::RequireWith
            | RuleKind::RequireWithout
            | RuleKind::FileExt
            | RuleKind::FileMime
            | RuleKind::FileSize
            | RuleKind::In
            | RuleKind::NotIn
            | RuleKind::AllowIp
            | RuleKind::DenyIp
    );
    let Some(param) = param else {
        return if needs_param {
            Err(RuleSyntaxError::MissingParam {
                rule: rule.to_string(),
            })
        } else {
            Ok(())
        };
    };

    match kind {
        RuleKind::Min | RuleKind::Max if !is_numeric_str(param) => Err(
            RuleSyntaxError::invalid_param(rule, param, "expected a number"),
        ),
        RuleKind::Length | RuleKind::Size => numeric_bounds(rule, param),
        RuleKind::FileSize if parse_byte_size(param).is_none() => Err(
            RuleSyntaxError::invalid_param(rule, param, "expected a byte size"),
        ),
        RuleKind::RequireIf | RuleKind::Expire if !param.contains(',') => Err(
            RuleSyntaxError::invalid_param(rule, param, "expected two comma-separated values"),
        ),
        RuleKind::Image => {
            let parts: Vec<_> = param.split(',').map(str::trim).collect();
            let dims_ok = parts.len() >= 2
                && parts.len() <= 3
                && parts[..2].iter().all(|p| p.parse::<u32>().is_ok());
            if dims_ok {
                Ok(())
            } else {
                Err(RuleSyntaxError::invalid_param(
                    rule,
                    param,
                    "expected `width,height[,type]`",
                ))
            }
        }
        RuleKind::Ip if !matches!(param, "ipv4" | "ipv6") => Err(
            RuleSyntaxError::invalid_param(rule, param, "expected `ipv4` or `ipv6`"),
        ),
        RuleKind::Regex => compile_pattern(param).map(|_| ()),
        _ => Ok(()),
    }
}

/// The rules attached to one field.
#[derive(Clone)]
pub enum FieldRules {
    /// Ordered token chain.
    Chain(Vec<RuleToken>),
    /// A single closure receiving the value and the whole data tree.
    Closure(ClosureRule),
    /// A rule map applied to every element of an array of objects.
    Nested(RuleMap),
}

impl FieldRules {
    /// Parse a `|`-separated rule string.
    pub fn parse(spec: &str) -> Result<Self, RuleSyntaxError> {
        tokenize(spec).map(FieldRules::Chain)
    }

    /// Parse a list of already separated rule strings. Elements are not
    /// split on `|`, so a pattern may contain one.
    pub fn from_list<I, S>(items: I) -> Result<Self, RuleSyntaxError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .filter(|s| !s.as_ref().trim().is_empty())
            .map(|s| RuleToken::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldRules::Chain)
    }

    pub fn from_tokens(tokens: Vec<RuleToken>) -> Self {
        FieldRules::Chain(tokens)
    }

    pub fn closure<F, R>(check: F) -> Self
    where
        F: Fn(&Value, &Value) -> R + Send + Sync + 'static,
        R: Into<RuleOutcome>,
    {
        FieldRules::Closure(Arc::new(move |value: &Value, data: &Value| -> RuleOutcome {
            check(value, data).into()
        }))
    }

    pub fn nested(rules: RuleMap) -> Self {
        FieldRules::Nested(rules)
    }

    /// Tokens of a chain; empty for closures and nested sets.
    pub fn tokens(&self) -> &[RuleToken] {
        match self {
            FieldRules::Chain(tokens) => tokens,
            _ => &[],
        }
    }

    pub fn has(&self, kind: &RuleKind) -> bool {
        self.tokens().iter().any(|t| t.kind() == kind)
    }

    /// Raw parameter of the first `default` token.
    pub fn default_param(&self) -> Option<&str> {
        self.tokens()
            .iter()
            .find(|t| *t.kind() == RuleKind::Default)
            .and_then(RuleToken::param)
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRules::Chain(tokens) => f.debug_tuple("Chain").field(tokens).finish(),
            FieldRules::Closure(_) => f.write_str("Closure(..)"),
            FieldRules::Nested(map) => f.debug_tuple("Nested").field(map).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_chain() {
        let tokens = tokenize("required|string|max:20").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(*tokens[0].kind(), RuleKind::Required);
        assert_eq!(*tokens[2].kind(), RuleKind::Max);
        assert_eq!(tokens[2].param(), Some("20"));
    }

    #[test]
    fn splits_on_first_colon_only() {
        let token = RuleToken::parse("dateFormat:H:i:s").unwrap();
        assert_eq!(*token.kind(), RuleKind::DateFormat);
        assert_eq!(token.param(), Some("H:i:s"));
    }

    #[test]
    fn symbol_aliases() {
        assert_eq!(*RuleToken::parse(">:5").unwrap().kind(), RuleKind::Gt);
        assert_eq!(*RuleToken::parse(">=:5").unwrap().kind(), RuleKind::Egt);
        assert_eq!(*RuleToken::parse("<:5").unwrap().kind(), RuleKind::Lt);
        assert_eq!(*RuleToken::parse("<=:5").unwrap().kind(), RuleKind::Elt);
        assert_eq!(*RuleToken::parse("=:5").unwrap().kind(), RuleKind::Eq);
    }

    #[test]
    fn snake_case_names() {
        assert_eq!(RuleKind::from_name("alpha_num"), RuleKind::AlphaNum);
        assert_eq!(RuleKind::from_name("not_in"), RuleKind::NotIn);
        assert_eq!(RuleKind::from_name("require_if"), RuleKind::RequireIf);
        assert_eq!(RuleKind::from_name("require"), RuleKind::Required);
        assert_eq!(
            RuleKind::from_name("is_even"),
            RuleKind::Custom("isEven".to_string())
        );
    }

    #[test]
    fn unknown_names_are_kept_for_later() {
        let token = RuleToken::parse(r"\d+").unwrap();
        assert_eq!(*token.kind(), RuleKind::Custom(r"\d+".to_string()));
    }

    #[test]
    fn empty_segments_are_skipped() {
        assert_eq!(tokenize("required||string|").unwrap().len(), 2);
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn malformed_definitions() {
        assert!(matches!(
            RuleToken::parse(":5"),
            Err(RuleSyntaxError::EmptyName(_))
        ));
        assert!(matches!(
            RuleToken::parse("max"),
            Err(RuleSyntaxError::MissingParam { .. })
        ));
        assert!(matches!(
            RuleToken::parse("min:abc"),
            Err(RuleSyntaxError::InvalidParam { .. })
        ));
        assert!(matches!(
            RuleToken::parse("regex:/(unclosed/"),
            Err(RuleSyntaxError::InvalidRegex { .. })
        ));
        assert!(matches!(
            RuleToken::parse("requireIf:type"),
            Err(RuleSyntaxError::InvalidParam { .. })
        ));
    }

    #[test]
    fn list_elements_are_not_split() {
        let rules = FieldRules::from_list(["required", "regex:/^(a|b)$/"]).unwrap();
        assert_eq!(rules.tokens().len(), 2);
        assert_eq!(rules.tokens()[1].param(), Some("/^(a|b)$/"));
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(parse_byte_size("2048"), Some(2048));
        assert_eq!(parse_byte_size("10kb"), Some(10 * 1024));
        assert_eq!(parse_byte_size("2M"), Some(2 * 1024 * 1024));
        assert_eq!(parse_byte_size("lots"), None);
    }

    #[test]
    fn outcome_conversions() {
        assert!(RuleOutcome::from(true).is_passed());
        assert_eq!(RuleOutcome::from(false), RuleOutcome::Failed);
        assert_eq!(
            RuleOutcome::from("must be even").message(),
            Some("must be even")
        );
    }
}
