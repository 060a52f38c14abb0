//! Request guard: validate the parameters of an HTTP request.
//!
//! The guard merges query and body parameters (body wins), runs a
//! [`Validator`] over them and turns a failed check into a
//! [`ValidateException`] carrying status 422.
//!
//! # Example
//!
//! ```rust,ignore
//! use rulekit::prelude::*;
//!
//! let validator = Validator::new(RuleMap::from([
//!     ("email", "required|email"),
//!     ("page", "default:1|integer|egt:1"),
//! ]));
//! let mut guard = RequestGuard::new(validator).filter();
//!
//! match guard.check_request(&request) {
//!     Ok(params) => { /* params holds only `email` and `page` */ }
//!     Err(err) => return (err.status(), serde_json::to_string(&err)?),
//! }
//! ```

use http::{header::CONTENT_TYPE, Request, StatusCode};
use rulekit_validate::{lookup, normalize_path, set_value, FieldKey, ValidateException, Validator, Value};

/// What to do with request parameters that no rule mentions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownParams {
    /// Pass them through.
    #[default]
    Allow,
    /// Fail the request (`params <name> invalid`).
    Reject,
    /// Drop them from the returned data.
    Strip,
}

/// Validates request parameters with a [`Validator`].
#[derive(Debug, Clone)]
pub struct RequestGuard {
    validator: Validator,
    unknown: UnknownParams,
}

impl RequestGuard {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            unknown: UnknownParams::Allow,
        }
    }

    /// Reject requests carrying parameters no rule mentions.
    pub fn security(mut self) -> Self {
        self.unknown = UnknownParams::Reject;
        self
    }

    /// Strip parameters no rule mentions from the accepted data.
    pub fn filter(mut self) -> Self {
        self.unknown = UnknownParams::Strip;
        self
    }

    pub fn unknown_params(&self) -> UnknownParams {
        self.unknown
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validate already-decoded query and body parameters. Returns the
    /// accepted data with defaults applied.
    pub fn check(&mut self, query: &Value, body: &Value) -> Result<Value, ValidateException> {
        let mut merged = merge(query, body)?;

        if self.unknown != UnknownParams::Allow {
            let declared = self.declared_fields();
            if let Value::Object(map) = &mut merged {
                match self.unknown {
                    UnknownParams::Reject => {
                        if let Some(key) = map.keys().find(|k| !declared.contains(k)) {
                            tracing::debug!(param = %key, "undeclared request parameter");
                            return Err(ValidateException::new(format!("params {} invalid", key)));
                        }
                    }
                    UnknownParams::Strip => map.retain(|k, _| declared.contains(k)),
                    UnknownParams::Allow => {}
                }
            }
        }

        if !self.validator.check(&merged) {
            let err = self
                .validator
                .exception()
                .unwrap_or_else(|| ValidateException::new(self.validator.error().to_string()));
            tracing::debug!(error = %err, "request parameters rejected");
            return Err(err);
        }

        Ok(self.validator.data().cloned().unwrap_or(merged))
    }

    /// Decode the query string and body of `request`, then [`check`](Self::check) them.
    ///
    /// JSON and `application/x-www-form-urlencoded` bodies are decoded;
    /// other content types contribute no parameters. A malformed JSON body
    /// fails with status 400.
    pub fn check_request<B: AsRef<[u8]>>(
        &mut self,
        request: &Request<B>,
    ) -> Result<Value, ValidateException> {
        let query = request
            .uri()
            .query()
            .map(|q| parse_form(q.as_bytes()))
            .unwrap_or_default();
        let body = decode_body(request)?;
        self.check(&query, &body)
    }

    /// Top-level parameter names the active rules mention.
    fn declared_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for key in self.validator.active_rules().keys() {
            let key = FieldKey::parse(key);
            let top = key.path().split('.').next().unwrap_or_default().to_string();
            if !fields.contains(&top) {
                fields.push(top);
            }
        }
        fields
    }
}

fn merge(query: &Value, body: &Value) -> Result<Value, ValidateException> {
    let mut merged = match query {
        Value::Object(map) => map.clone(),
        _ => Default::default(),
    };
    match body {
        Value::Object(map) => {
            merged.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Value::Null => {}
        other => {
            return Err(ValidateException::new(format!(
                "request body must be an object, got {}",
                other.kind_name()
            ))
            .with_status(StatusCode::BAD_REQUEST));
        }
    }
    Ok(Value::Object(merged))
}

fn decode_body<B: AsRef<[u8]>>(request: &Request<B>) -> Result<Value, ValidateException> {
    let bytes = request.body().as_ref();
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") || content_type.ends_with("+json") {
        serde_json::from_slice::<serde_json::Value>(bytes)
            .map(Value::from)
            .map_err(|e| {
                ValidateException::new(format!("malformed JSON body: {}", e))
                    .with_status(StatusCode::BAD_REQUEST)
            })
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        Ok(parse_form(bytes))
    } else {
        tracing::trace!(content_type = %content_type, "body not decoded");
        Ok(Value::Null)
    }
}

/// Decode `application/x-www-form-urlencoded` text. Bracketed keys nest
/// (`user[name]=kit`) and a trailing `[]` collects a list (`tag[]=a&tag[]=b`).
pub fn parse_form(input: &[u8]) -> Value {
    let mut out = Value::Object(Default::default());
    for (key, value) in url::form_urlencoded::parse(input) {
        let value = Value::from(value.into_owned());
        match key.strip_suffix("[]") {
            Some(base) => {
                let path = normalize_path(base);
                let mut items = match lookup(&out, &path) {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                };
                items.push(value);
                set_value(&mut out, &path, Value::Array(items));
            }
            None => {
                set_value(&mut out, &normalize_path(&key), value);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_decoding() {
        let form = parse_form(b"name=kit&user%5Bage%5D=7&tag[]=a&tag[]=b&q=a+b");
        assert_eq!(form.child("name"), Some(&Value::from("kit")));
        assert_eq!(
            form.child("user").and_then(|u| u.child("age")),
            Some(&Value::from("7"))
        );
        assert_eq!(form.child("tag"), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(form.child("q"), Some(&Value::from("a b")));
    }

    #[test]
    fn body_wins_over_query() {
        let query = Value::object([("page", "1"), ("sort", "name")]);
        let body = Value::object([("page", "2")]);
        let merged = merge(&query, &body).unwrap();
        assert_eq!(merged.child("page"), Some(&Value::from("2")));
        assert_eq!(merged.child("sort"), Some(&Value::from("name")));
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = merge(&Value::Null, &Value::from(vec![1])).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
