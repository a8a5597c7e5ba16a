//! Final responses and their classification.
//!
//! The requester hands back a [`Response`] for any HTTP answer, whatever the
//! status. Turning it into a typed value or an [`ApiFailure`] happens here,
//! once, for every endpoint.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::objects::envelope::{ApiFailure, Envelope};

/// The HTTP answer of the candidate that ended the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    url: String,
    body: Bytes,
}

impl Response {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// The candidate URL that produced this response.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Lenient envelope; unreadable bodies become an empty envelope.
    pub fn envelope(&self) -> Envelope {
        Envelope::parse_lenient(&self.body)
    }

    /// Envelope `data` of a successful response, or the classified failure.
    ///
    /// Success needs both a 2xx status and `success: true`. For failures the
    /// first `errors` entry wins over `message`.
    pub fn into_data(self) -> Result<Value, ApiFailure> {
        let envelope = match Envelope::parse(&self.body) {
            Ok(envelope) => envelope,
            Err(_) if self.status == 404 => {
                return Err(ApiFailure::RouteNotFound {
                    url: self.url,
                    message: None,
                });
            }
            Err(_) => return Err(ApiFailure::MalformedResponse { status: self.status }),
        };

        if self.is_success_status() && envelope.is_success() {
            return Ok(envelope.data.unwrap_or(Value::Null));
        }

        if self.status == 404 {
            return Err(ApiFailure::RouteNotFound {
                url: self.url,
                message: envelope.message,
            });
        }

        if let Some(message) = envelope.first_error_message() {
            return Err(ApiFailure::Validation {
                status: self.status,
                message,
            });
        }

        let message = envelope
            .message
            .unwrap_or_else(|| format!("request failed with status {}", self.status));
        Err(ApiFailure::Server {
            status: self.status,
            message,
        })
    }

    /// Decode the envelope `data` into the endpoint's schema type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiFailure> {
        let status = self.status;
        let data = self.into_data()?;
        serde_json::from_value(data).map_err(|e| {
            tracing::warn!(status, error = %e, "response data did not match schema");
            ApiFailure::MalformedResponse { status }
        })
    }

    /// Message shown for a failed read of `resource`: the server's
    /// `message`, then the first validation error, then a generic line.
    pub fn fetch_error_message(&self, resource: &str) -> String {
        let envelope = self.envelope();
        envelope
            .message
            .clone()
            .or_else(|| envelope.first_error_message())
            .unwrap_or_else(|| format!("{resource} failed ({})", self.status))
    }
}
