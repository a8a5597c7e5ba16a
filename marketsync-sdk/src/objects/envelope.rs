//! The `{success, data, message, errors}` response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response wrapper used by every backend endpoint.
///
/// Parsing is lenient: an empty body is an empty envelope, and anything that
/// is not a JSON object is reported as malformed but still yields an empty
/// envelope. A missing or non-boolean `success` counts as failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Value>,
}

/// The body could not be read as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response body is not a JSON object")]
pub struct MalformedBody;

impl Envelope {
    /// Parse a response body, reporting bodies that are not JSON objects.
    pub fn parse(body: &[u8]) -> Result<Self, MalformedBody> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body).map_err(|_| MalformedBody)?;
        let Value::Object(mut fields) = value else {
            return Err(MalformedBody);
        };

        Ok(Self {
            success: fields.get("success").and_then(Value::as_bool),
            data: fields.remove("data").filter(|v| !v.is_null()),
            message: fields
                .get("message")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            errors: match fields.remove("errors") {
                Some(Value::Array(errors)) => errors,
                _ => Vec::new(),
            },
        })
    }

    /// Parse a response body, treating anything unreadable as empty.
    pub fn parse_lenient(body: &[u8]) -> Self {
        Self::parse(body).unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }

    /// Message of the first entry in `errors`.
    ///
    /// Entries are either plain strings or objects carrying `msg` or
    /// `message`.
    pub fn first_error_message(&self) -> Option<String> {
        let first = self.errors.first()?;
        let text = match first {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) => obj
                .get("msg")
                .or_else(|| obj.get("message"))
                .and_then(Value::as_str),
            _ => None,
        }?;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Classified failure of a request that did get an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiFailure {
    /// Every host that answered said 404.
    #[error("route not found on any backend host ({url})")]
    RouteNotFound { url: String, message: Option<String> },

    /// The backend reported a field-level validation problem.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// Non-2xx, or 2xx without `success: true`.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The body was not JSON, or `data` did not match the expected schema.
    #[error("backend sent an unreadable response (status {status})")]
    MalformedResponse { status: u16 },
}

impl ApiFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiFailure::RouteNotFound { .. } => Some(404),
            ApiFailure::Validation { status, .. }
            | ApiFailure::Server { status, .. }
            | ApiFailure::MalformedResponse { status } => Some(*status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_envelope() {
        let env = Envelope::parse(
            br#"{"success":true,"data":{"balance":10},"message":" ok ","errors":[]}"#,
        )
        .unwrap();
        assert!(env.is_success());
        assert_eq!(env.data, Some(json!({"balance": 10})));
        assert_eq!(env.message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_empty_body_is_empty_envelope() {
        assert_eq!(Envelope::parse(b"").unwrap(), Envelope::default());
        assert_eq!(Envelope::parse(b"  \n").unwrap(), Envelope::default());
    }

    #[test]
    fn test_non_json_is_malformed_but_lenient() {
        assert_eq!(Envelope::parse(b"<html>502</html>"), Err(MalformedBody));
        assert_eq!(Envelope::parse(b"[1,2]"), Err(MalformedBody));
        let env = Envelope::parse_lenient(b"<html>502</html>");
        assert!(!env.is_success());
    }

    #[test]
    fn test_missing_or_odd_success_is_failure() {
        assert!(!Envelope::parse(br#"{"data":1}"#).unwrap().is_success());
        assert!(!Envelope::parse(br#"{"success":"true"}"#).unwrap().is_success());
    }

    #[test]
    fn test_first_error_message_shapes() {
        let env = Envelope::parse(br#"{"errors":[{"msg":"Amount required"},"x"]}"#).unwrap();
        assert_eq!(env.first_error_message().as_deref(), Some("Amount required"));

        let env = Envelope::parse(br#"{"errors":["plain"]}"#).unwrap();
        assert_eq!(env.first_error_message().as_deref(), Some("plain"));

        let env = Envelope::parse(br#"{"errors":[{"message":"m"}]}"#).unwrap();
        assert_eq!(env.first_error_message().as_deref(), Some("m"));

        let env = Envelope::parse(br#"{"errors":[42]}"#).unwrap();
        assert_eq!(env.first_error_message(), None);
    }
}
