//! Conditional requirement: `requireIf`, `requireWith`, `requireWithout`
//! and `requireCallback` decide whether a field is required at all.

use super::RuleContext;
use crate::error::RuleSyntaxError;
use crate::path::get_value;
use crate::rule::{RuleKind, RuleToken};
use crate::value::{Value, NULL};

fn field_filled(data: &Value, field: &str) -> bool {
    get_value(data, field.trim()).map_or(false, |v| !v.is_empty_like())
}

/// Whether the token's condition holds, i.e. the field must be present.
pub(crate) fn condition(
    token: &RuleToken,
    value: &Value,
    ctx: &RuleContext<'_>,
) -> Result<bool, RuleSyntaxError> {
    let param = token.param().unwrap_or_default();
    let holds = match token.kind() {
        // requireIf:field,value[,value...]
        RuleKind::RequireIf => match param.split_once(',') {
            Some((field, expected)) => {
                let actual = get_value(ctx.data, field.trim());
                let actual = actual.as_deref().unwrap_or(&NULL);
                expected
                    .split(',')
                    .any(|candidate| actual.loose_eq(&Value::from(candidate.trim())))
            }
            None => false,
        },
        // requireWith:a[,b...] - any of them filled
        RuleKind::RequireWith => param.split(',').any(|f| field_filled(ctx.data, f)),
        // requireWithout:a[,b...] - any of them missing
        RuleKind::RequireWithout => param.split(',').any(|f| !field_filled(ctx.data, f)),
        RuleKind::RequireCallback => {
            let condition = match token.condition_callback() {
                Some(condition) => condition.clone(),
                None => ctx
                    .registry
                    .condition(param)
                    .ok_or_else(|| RuleSyntaxError::UnknownCondition(param.to_string()))?,
            };
            condition(value, ctx.data)
        }
        _ => false,
    };
    Ok(holds)
}
