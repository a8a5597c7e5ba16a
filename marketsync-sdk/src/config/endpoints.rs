//! Endpoint configuration.

/// Deployment-local hosts tried after the configured primary base.
pub const DEFAULT_FALLBACK_BASES: &[&str] = &["http://localhost:5000", "http://127.0.0.1:5000"];

/// Base URLs for the backend, in the order they should be tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// The configured base URL (usually from the environment). Blank values
    /// count as absent.
    pub primary: Option<String>,
    /// Known fallback bases, tried in this order after the primary.
    pub fallbacks: Vec<String>,
    /// Whether the bare relative path is appended as the final candidate.
    pub relative_fallback: bool,
}

impl EndpointConfig {
    /// Create a config with the given primary base and the default fallbacks.
    pub fn new(primary: Option<String>) -> Self {
        Self {
            primary,
            fallbacks: DEFAULT_FALLBACK_BASES
                .iter()
                .map(|base| base.to_string())
                .collect(),
            relative_fallback: true,
        }
    }

    /// Replace the fallback bases.
    pub fn with_fallbacks<I, S>(mut self, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallbacks = fallbacks.into_iter().map(Into::into).collect();
        self
    }

    /// Stop appending the bare relative path when at least one base exists.
    pub fn without_relative_fallback(mut self) -> Self {
        self.relative_fallback = false;
        self
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new(None)
    }
}
