//! Concurrent reads with per-slice failure.
//!
//! A screen's data is a set of independent resources (balance, saved
//! methods, ...). [`ConcurrentFetchAggregator::load_all`] starts every read at
//! once, waits for all of them, and reports each one separately, so one
//! failing widget never blanks the rest of the screen.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use futures_util::future::join_all;
use marketsync_sdk::client::ResilientRequester;
use marketsync_sdk::request::RequestDescriptor;
use marketsync_sdk::response::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of one read: exactly one of `value` / `error` is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchSlot {
    pub value: Option<Value>,
    pub error: Option<String>,
}

impl FetchSlot {
    pub fn loaded(value: Value) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    /// Decode the loaded value into its schema type.
    ///
    /// A schema mismatch becomes this slot's error; it does not affect any
    /// other slot.
    pub fn decode<T: DeserializeOwned>(&self, resource: &str) -> Result<T, String> {
        match (&self.value, &self.error) {
            (_, Some(error)) => Err(error.clone()),
            (Some(value), None) => serde_json::from_value(value.clone()).map_err(|e| {
                warn!(resource, error = %e, "Loaded data did not match schema");
                format!("{resource} sent unreadable data")
            }),
            (None, None) => Err(format!("{resource} was not loaded")),
        }
    }
}

/// Issues independent reads concurrently.
#[derive(Debug, Clone)]
pub struct ConcurrentFetchAggregator {
    requester: ResilientRequester,
}

impl ConcurrentFetchAggregator {
    pub fn new(requester: ResilientRequester) -> Self {
        Self { requester }
    }

    /// Run every request concurrently and collect one slot per key.
    ///
    /// Never fails as a whole. Completion order is unspecified; the map is
    /// keyed, not ordered. The key's `Display` names the resource in
    /// generic error messages.
    pub async fn load_all<K>(&self, requests: Vec<(K, RequestDescriptor)>) -> HashMap<K, FetchSlot>
    where
        K: Eq + Hash + Display,
    {
        let fetches = requests.into_iter().map(|(key, descriptor)| async move {
            let slot = self.fetch_one(&key.to_string(), &descriptor).await;
            (key, slot)
        });
        join_all(fetches).await.into_iter().collect()
    }

    async fn fetch_one(&self, resource: &str, descriptor: &RequestDescriptor) -> FetchSlot {
        match self.requester.send(descriptor).await {
            Ok(resp) => classify(resource, resp),
            Err(e) => {
                warn!(resource, error = %e, "Fetch failed");
                FetchSlot::failed(e.to_string())
            }
        }
    }
}

fn classify(resource: &str, resp: Response) -> FetchSlot {
    let envelope = resp.envelope();
    if resp.is_success_status() && envelope.is_success() {
        debug!(resource, status = resp.status(), "Fetch succeeded");
        return FetchSlot::loaded(envelope.data.unwrap_or(Value::Null));
    }
    let message = resp.fetch_error_message(resource);
    warn!(resource, status = resp.status(), error = %message, "Fetch returned failure");
    FetchSlot::failed(message)
}
