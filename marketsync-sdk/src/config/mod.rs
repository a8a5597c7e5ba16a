//! Configuration types for the request layer.
//!
//! These types hold already-validated values and are built once at startup,
//! then shared by reference. Reading them from a file is handled by the
//! binary crate.

mod endpoints;

pub use endpoints::{DEFAULT_FALLBACK_BASES, EndpointConfig};

use std::time::Duration;
use url::Url;

/// Upper bound for a single network attempt against one candidate URL.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Everything the resilient requester needs to know about the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Where the backend may live.
    pub endpoints: EndpointConfig,
    /// Bound applied to every individual attempt. An attempt that exceeds it
    /// is treated as a connection failure.
    pub attempt_timeout: Duration,
    /// Origin that bare relative candidates are resolved against. Without
    /// one, relative candidates cannot be reached.
    pub relative_origin: Option<Url>,
}

impl ClientConfig {
    /// Create a config with the given endpoints and default timeouts.
    pub fn new(endpoints: EndpointConfig) -> Self {
        Self {
            endpoints,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            relative_origin: None,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_relative_origin(mut self, origin: Url) -> Self {
        self.relative_origin = Some(origin);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(EndpointConfig::default())
    }
}
