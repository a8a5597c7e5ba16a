//! The resilient requester.
//!
//! Walks the candidate URLs for a logical path strictly in order:
//!
//! * connection failure or timeout: try the next candidate, or give up with
//!   [`SendError::Unreachable`] if it was the last one;
//! * HTTP 404 from a candidate that is not the last: that host does not know
//!   the route, try the next one;
//! * anything else, or any answer from the last candidate: final.
//!
//! If the walk runs out after at least one host answered 404, that 404 is
//! returned rather than a connectivity error, so a route missing everywhere
//! stays distinguishable from a backend that is down.
//!
//! A 500, 401 or 422 means the right host has a real problem and is returned
//! immediately instead of being masked by other hosts. Headers (including
//! the idempotency key) are built once before the walk, so every candidate
//! sees the same request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::transport::{Attempt, ReqwestTransport, Transport, TransportError};
use super::ClientError;
use crate::cancel::Cancellation;
use crate::config::{ClientConfig, DEFAULT_ATTEMPT_TIMEOUT};
use crate::endpoint::EndpointResolver;
use crate::idempotency::IdempotencyTagger;
use crate::request::RequestDescriptor;
use crate::response::Response;

/// Exceptional outcomes of [`ResilientRequester::send`]. Ordinary HTTP
/// failures are not errors here; they come back as a [`Response`].
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// No candidate produced an HTTP response.
    #[error("backend not reachable ({} host(s) tried)", failures.len())]
    Unreachable { failures: Vec<TransportError> },

    /// The caller's cancellation signal fired.
    #[error("request cancelled")]
    Cancelled,
}

/// Sends requests through the candidate list of an [`EndpointResolver`].
///
/// Cheap to clone; the transport is shared.
#[derive(Clone)]
pub struct ResilientRequester {
    resolver: EndpointResolver,
    transport: Arc<dyn Transport>,
    attempt_timeout: Duration,
}

impl std::fmt::Debug for ResilientRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientRequester")
            .field("resolver", &self.resolver)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish_non_exhaustive()
    }
}

impl ResilientRequester {
    /// Build a requester over `reqwest` from the client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        let transport = ReqwestTransport::new(http, config.relative_origin.clone());
        Ok(Self::with_transport(
            EndpointResolver::new(config.endpoints.clone()),
            Arc::new(transport),
        )
        .with_attempt_timeout(config.attempt_timeout))
    }

    /// Use a custom transport (tests, instrumentation, other HTTP stacks).
    pub fn with_transport(resolver: EndpointResolver, transport: Arc<dyn Transport>) -> Self {
        Self {
            resolver,
            transport,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Send `descriptor`, returning the first final response.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<Response, SendError> {
        let candidates = self.resolver.resolve(descriptor.path());
        let headers = IdempotencyTagger::tag(descriptor);
        let last = candidates.len().saturating_sub(1);
        let mut failures = Vec::new();
        let mut not_found = None;

        for (index, url) in candidates.iter().enumerate() {
            let attempt = Attempt {
                method: descriptor.method(),
                url,
                headers: &headers,
                body: descriptor.body(),
            };

            let outcome =
                match tokio::time::timeout(self.attempt_timeout, self.transport.execute(attempt))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(TransportError::TimedOut {
                        url: url.clone(),
                        timeout_ms: self.attempt_timeout.as_millis(),
                    }),
                };

            match outcome {
                Err(e) => {
                    warn!(
                        method = %descriptor.method(),
                        url = %url,
                        error = %e,
                        "Candidate unreachable"
                    );
                    failures.push(e);
                }
                Ok(resp) if resp.status() == 404 && index < last => {
                    debug!(
                        method = %descriptor.method(),
                        url = %url,
                        "Candidate does not know this route, trying next"
                    );
                    not_found = Some(resp);
                }
                Ok(resp) => {
                    debug!(
                        method = %descriptor.method(),
                        url = %url,
                        status = resp.status(),
                        attempt = index + 1,
                        "Final response"
                    );
                    return Ok(resp);
                }
            }
        }

        if let Some(resp) = not_found {
            warn!(
                method = %descriptor.method(),
                url = %resp.url(),
                unreachable = failures.len(),
                "No host knows this route"
            );
            return Ok(resp);
        }
        Err(SendError::Unreachable { failures })
    }

    /// Like [`send`](Self::send), but stop waiting as soon as `cancel` fires.
    pub async fn send_cancellable(
        &self,
        descriptor: &RequestDescriptor,
        cancel: &Cancellation,
    ) -> Result<Response, SendError> {
        if cancel.is_cancelled() {
            return Err(SendError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SendError::Cancelled),
            result = self.send(descriptor) => result,
        }
    }
}
