//! Error types: rule-definition errors, per-check error state and the
//! exception raised by the request guard.

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A malformed rule definition. Raised when a rule string cannot be parsed
/// or names a pattern that does not compile; never for bad input data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSyntaxError {
    #[error("rule token `{0}` has no name")]
    EmptyName(String),

    #[error("rule `{rule}` requires a parameter")]
    MissingParam { rule: String },

    #[error("rule `{rule}` has an invalid parameter `{param}`: {reason}")]
    InvalidParam {
        rule: String,
        param: String,
        reason: String,
    },

    #[error("invalid regular expression `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("condition `{0}` is not registered")]
    UnknownCondition(String),
}

impl RuleSyntaxError {
    pub(crate) fn invalid_param(
        rule: impl Into<String>,
        param: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParam {
            rule: rule.into(),
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Canonical dotted path of the field
    pub field: String,
    /// Name of the rule that failed (`required`, `max`, `closure`, ...)
    pub code: String,
    /// Rendered message
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors recorded by the most recent check.
///
/// Fail-fast sessions record a single message; batch sessions record one
/// message per failed field, keyed by its dotted path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorState {
    #[default]
    None,
    Single(String),
    Batch(IndexMap<String, String>),
}

impl ErrorState {
    pub fn is_empty(&self) -> bool {
        match self {
            ErrorState::None => true,
            ErrorState::Single(_) => false,
            ErrorState::Batch(map) => map.is_empty(),
        }
    }

    /// Number of recorded messages.
    pub fn len(&self) -> usize {
        match self {
            ErrorState::None => 0,
            ErrorState::Single(_) => 1,
            ErrorState::Batch(map) => map.len(),
        }
    }

    /// The first recorded message.
    pub fn message(&self) -> Option<&str> {
        match self {
            ErrorState::None => None,
            ErrorState::Single(msg) => Some(msg),
            ErrorState::Batch(map) => map.values().next().map(String::as_str),
        }
    }

    /// Message recorded for a field (batch mode only).
    pub fn get(&self, field: &str) -> Option<&str> {
        match self {
            ErrorState::Batch(map) => map.get(field).map(String::as_str),
            _ => None,
        }
    }

    /// All messages in recording order.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            ErrorState::None => Vec::new(),
            ErrorState::Single(msg) => vec![msg.as_str()],
            ErrorState::Batch(map) => map.values().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorState::None => Ok(()),
            ErrorState::Single(msg) => f.write_str(msg),
            ErrorState::Batch(map) => {
                let joined: Vec<_> = map.values().map(String::as_str).collect();
                f.write_str(&joined.join("; "))
            }
        }
    }
}

/// Response body for a failed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
    fields: Vec<FieldError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

/// Raised by the request guard when validation fails. Carries HTTP status
/// 422 unless overridden.
///
/// Serializes to:
///
/// ```json
/// {
///   "error": {
///     "type": "validation_error",
///     "message": "The email must be a valid email address",
///     "fields": [{"field": "email", "code": "email", "message": "..."}]
///   }
/// }
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ValidateException {
    message: String,
    status: StatusCode,
    errors: ErrorState,
    fields: Vec<FieldError>,
}

impl ValidateException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::UNPROCESSABLE_ENTITY,
            errors: ErrorState::None,
            fields: Vec::new(),
        }
    }

    /// Build from the outcome of a failed check. The first message becomes
    /// the exception message.
    pub fn from_failures(errors: ErrorState, fields: Vec<FieldError>) -> Self {
        let message = errors
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| "Validation failed".to_string());
        Self {
            message,
            status: StatusCode::UNPROCESSABLE_ENTITY,
            errors,
            fields,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn errors(&self) -> &ErrorState {
        &self.errors
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }
}

impl Serialize for ValidateException {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ErrorWrapper {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                message: self.message.clone(),
                fields: self.fields.clone(),
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_state_accessors() {
        let mut map = IndexMap::new();
        map.insert("email".to_string(), "bad email".to_string());
        map.insert("age".to_string(), "too young".to_string());
        let state = ErrorState::Batch(map);

        assert_eq!(state.len(), 2);
        assert_eq!(state.message(), Some("bad email"));
        assert_eq!(state.get("age"), Some("too young"));
        assert_eq!(state.to_string(), "bad email; too young");
    }

    #[test]
    fn empty_state() {
        assert!(ErrorState::None.is_empty());
        assert!(ErrorState::Batch(IndexMap::new()).is_empty());
        assert_eq!(serde_json::to_value(ErrorState::None).unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn exception_body() {
        let exception = ValidateException::from_failures(
            ErrorState::Single("email is invalid".into()),
            vec![FieldError::new("email", "email", "email is invalid")],
        );

        assert_eq!(exception.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(exception.to_string(), "email is invalid");

        let json = serde_json::to_value(&exception).unwrap();
        assert_eq!(json["error"]["type"], "validation_error");
        assert_eq!(json["error"]["message"], "email is invalid");
        assert_eq!(json["error"]["fields"][0]["code"], "email");
    }

    #[test]
    fn syntax_error_display() {
        let err = RuleSyntaxError::MissingParam { rule: "max".into() };
        assert_eq!(err.to_string(), "rule `max` requires a parameter");
    }
}
