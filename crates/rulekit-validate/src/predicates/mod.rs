//! Built-in rule predicates and the dispatcher that routes a token to them.
//!
//! Predicates are pure: they read the field value, the token parameter and
//! (for cross-field rules) the data tree, and answer pass or fail. Message
//! rendering happens in the evaluator.

pub(crate) mod compare;
pub(crate) mod conditional;
pub(crate) mod date;
pub(crate) mod files;
pub(crate) mod format;
pub(crate) mod size;
pub(crate) mod types;

use crate::error::RuleSyntaxError;
use crate::registry::RuleRegistry;
use crate::rule::{RuleKind, RuleOutcome, RuleToken};
use crate::value::Value;

/// What a predicate may look at besides the value itself.
pub(crate) struct RuleContext<'a> {
    /// Canonical dotted path of the field under test
    pub field: &'a str,
    /// The whole (defaults-applied) data tree
    pub data: &'a Value,
    pub registry: &'a RuleRegistry,
}

/// Evaluate one token against a value.
///
/// Modifier and conditional tokens pass here; the evaluator handles them
/// before the chain runs. Unknown names resolve to a registered custom
/// rule, then a named pattern, then the name itself read as a pattern.
pub(crate) fn dispatch(
    token: &RuleToken,
    value: &Value,
    ctx: &RuleContext<'_>,
) -> Result<RuleOutcome, RuleSyntaxError> {
    let param = token.param();
    let p = param.unwrap_or_default();
    let data = ctx.data;

    let passed = match token.kind() {
        RuleKind::Nullable | RuleKind::Sometimes | RuleKind::Default => true,
        RuleKind::RequireIf
        | RuleKind::RequireWith
        | RuleKind::RequireWithout
        | RuleKind::RequireCallback => true,

        RuleKind::Required | RuleKind::Must => types::required(value),
        RuleKind::Accepted => types::accepted(value),
        RuleKind::String => types::string(value),
        RuleKind::Integer => types::integer(value),
        RuleKind::Float => types::float(value),
        RuleKind::Numeric => types::numeric(value),
        RuleKind::Boolean => types::boolean(value),
        RuleKind::Array => types::array(value),

        RuleKind::Min => size::min(value, p),
        RuleKind::Max => size::max(value, p),
        RuleKind::Length | RuleKind::Size => size::length(value, p),
        RuleKind::Between => size::between(value, p),
        RuleKind::NotBetween => size::not_between(value, p),
        RuleKind::FileSize => size::file_size(value, p),

        RuleKind::Email => format::email(value),
        RuleKind::Url => format::url(value),
        RuleKind::Ip => format::ip(value, param),
        RuleKind::Ipv4 => format::ipv4(value),
        RuleKind::Ipv6 => format::ipv6(value),
        RuleKind::MacAddr => format::mac_addr(value),
        RuleKind::Json => format::json(value),
        RuleKind::Alpha
        | RuleKind::AlphaNum
        | RuleKind::AlphaDash
        | RuleKind::Chs
        | RuleKind::ChsAlpha
        | RuleKind::ChsAlphaNum
        | RuleKind::ChsDash
        | RuleKind::Mobile
        | RuleKind::IdCard
        | RuleKind::Zip => format::matches(value, token.kind().name())?,
        RuleKind::Regex => format::matches(value, p)?,

        RuleKind::Date => date::date(value),
        RuleKind::DateFormat => date::date_format(value, p),
        RuleKind::After => date::after(value, data, p),
        RuleKind::Before => date::before(value, data, p),
        RuleKind::AfterOrEqual => date::after_or_equal(value, data, p),
        RuleKind::BeforeOrEqual => date::before_or_equal(value, data, p),
        RuleKind::Expire => date::expire(p),

        RuleKind::Gt => compare::gt(value, data, p),
        RuleKind::Egt => compare::egt(value, data, p),
        RuleKind::Lt => compare::lt(value, data, p),
        RuleKind::Elt => compare::elt(value, data, p),
        RuleKind::Eq => compare::eq(value, data, p),
        RuleKind::Same => compare::same(value, data, p),
        RuleKind::Different => compare::different(value, data, p),
        RuleKind::Confirm => compare::confirm(value, data, ctx.field, param),
        RuleKind::Confirmed => compare::confirmed(value, data, ctx.field, param),
        RuleKind::In => compare::in_list(value, p),
        RuleKind::NotIn => compare::not_in_list(value, p),
        RuleKind::AllowIp => compare::allow_ip(value, p),
        RuleKind::DenyIp => compare::deny_ip(value, p),

        RuleKind::File => files::file(value),
        RuleKind::Image => files::image(value, param),
        RuleKind::FileExt => files::file_ext(value, p),
        RuleKind::FileMime => files::file_mime(value, p),

        RuleKind::Closure => {
            return Ok(match token.check_callback() {
                Some(check) => check(value, data),
                None => RuleOutcome::Passed,
            })
        }
        RuleKind::Custom(name) => return custom(name, param, value, ctx),
    };
    Ok(passed.into())
}

fn custom(
    name: &str,
    param: Option<&str>,
    value: &Value,
    ctx: &RuleContext<'_>,
) -> Result<RuleOutcome, RuleSyntaxError> {
    if let Some(rule) = ctx.registry.rule(name) {
        return Ok(rule.check(value, param, ctx.data, ctx.field));
    }
    tracing::trace!(rule = %name, "no custom rule registered, matching as pattern");
    format::matches(value, name).map(RuleOutcome::from)
}
