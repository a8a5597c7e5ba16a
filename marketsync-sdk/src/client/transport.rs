//! The network seam under the requester.
//!
//! A [`Transport`] performs exactly one HTTP exchange with one candidate URL.
//! It never retries and never looks at the status code; deciding what a
//! status means is the requester's job.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use url::Url;

use crate::request::{Headers, Method};
use crate::response::Response;

/// One attempt against one candidate URL.
#[derive(Debug, Clone, Copy)]
pub struct Attempt<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a Headers,
    pub body: Option<&'a Bytes>,
}

/// Connection-level failure: no HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("cannot reach {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("no answer from {url} within {timeout_ms} ms")]
    TimedOut { url: String, timeout_ms: u128 },
}

impl TransportError {
    pub fn url(&self) -> &str {
        match self {
            TransportError::Unreachable { url, .. } | TransportError::TimedOut { url, .. } => url,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, attempt: Attempt<'_>) -> Result<Response, TransportError>;
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
    relative_origin: Option<Url>,
}

impl ReqwestTransport {
    pub fn new(http: Client, relative_origin: Option<Url>) -> Self {
        Self {
            http,
            relative_origin,
        }
    }

    /// Absolute candidates pass through; relative ones are joined onto the
    /// configured origin.
    fn absolute_url(&self, candidate: &str) -> Result<Url, TransportError> {
        let unreachable = |reason: String| TransportError::Unreachable {
            url: candidate.to_string(),
            reason,
        };
        match Url::parse(candidate) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.relative_origin {
                Some(origin) => origin.join(candidate).map_err(|e| unreachable(e.to_string())),
                None => Err(unreachable("relative path with no origin configured".into())),
            },
            Err(e) => Err(unreachable(e.to_string())),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, attempt: Attempt<'_>) -> Result<Response, TransportError> {
        let url = self.absolute_url(attempt.url)?;
        let unreachable = |e: reqwest::Error| TransportError::Unreachable {
            url: attempt.url.to_string(),
            reason: e.to_string(),
        };

        let mut request = self.http.request(attempt.method.into(), url);
        for (name, value) in attempt.headers.iter() {
            request = request.header(name, value);
        }
        if let Some(body) = attempt.body {
            request = request.body(body.clone());
        }

        let resp = request.send().await.map_err(unreachable)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(unreachable)?;

        Ok(Response::new(status, attempt.url, body))
    }
}

/// Transport that never reaches anything. Used by tests that only build
/// descriptors.
#[cfg(test)]
pub(crate) struct NeverTransport;

#[cfg(test)]
#[async_trait]
impl Transport for NeverTransport {
    async fn execute(&self, attempt: Attempt<'_>) -> Result<Response, TransportError> {
        Err(TransportError::Unreachable {
            url: attempt.url.to_string(),
            reason: "offline".into(),
        })
    }
}
