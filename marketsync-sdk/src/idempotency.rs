//! Idempotency keys for mutating requests.
//!
//! One token is generated per logical user action and reused for every
//! candidate URL the requester tries, so the backend can deduplicate a
//! POST that reached two hosts. Tokens are UUIDv7: a millisecond timestamp
//! followed by random bits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::{Headers, RequestDescriptor};

/// Header carrying the idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Opaque unique token identifying one logical mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyToken(String);

impl IdempotencyToken {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdempotencyToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for IdempotencyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attaches idempotency headers before dispatch.
pub struct IdempotencyTagger;

impl IdempotencyTagger {
    /// Build the headers to send for `descriptor`.
    ///
    /// Mutating descriptors end up with exactly one idempotency header,
    /// carrying the descriptor's own token. Read descriptors never carry one,
    /// even if a caller set it by hand.
    pub fn tag(descriptor: &RequestDescriptor) -> Headers {
        let mut headers = descriptor.headers().clone();
        headers.remove(IDEMPOTENCY_KEY_HEADER);
        if let Some(token) = descriptor.idempotency_token() {
            headers.insert(IDEMPOTENCY_KEY_HEADER, token.as_str());
        }
        headers
    }
}
