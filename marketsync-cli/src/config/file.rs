//! TOML file configuration structures.
//!
//! These structs map directly to the `marketsync.toml` file format. Every
//! section and key is optional.

use marketsync_sdk::config::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_FALLBACK_BASES};
use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Where the backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Primary base URL (e.g. "https://api.example.com").
    #[serde(default)]
    pub primary: Option<String>,
    /// Bases tried after the primary, in order.
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<String>,
    /// Also try the bare path last.
    #[serde(default = "default_relative_fallback")]
    pub relative_fallback: bool,
    /// Origin the bare path is resolved against.
    #[serde(default)]
    pub relative_origin: Option<Url>,
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
}

fn default_fallbacks() -> Vec<String> {
    DEFAULT_FALLBACK_BASES.iter().map(|s| s.to_string()).collect()
}

fn default_relative_fallback() -> bool {
    true
}

fn default_attempt_timeout_secs() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT.as_secs()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            primary: None,
            fallbacks: default_fallbacks(),
            relative_fallback: default_relative_fallback(),
            relative_origin: None,
            attempt_timeout_secs: default_attempt_timeout_secs(),
        }
    }
}

/// Session seed for the token store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[backend]
primary = "https://api.example.com"
fallbacks = ["http://localhost:5000"]
relative_fallback = false
relative_origin = "https://app.example.com"
attempt_timeout_secs = 5

[session]
token = "abc"
user_id = "u1"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.primary.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.backend.fallbacks, vec!["http://localhost:5000"]);
        assert!(!config.backend.relative_fallback);
        assert_eq!(
            config.backend.relative_origin.unwrap().as_str(),
            "https://app.example.com/"
        );
        assert_eq!(config.backend.attempt_timeout_secs, 5);
        assert_eq!(config.session.token.as_deref(), Some("abc"));
        assert_eq!(config.session.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.backend.primary.is_none());
        assert_eq!(
            config.backend.fallbacks,
            vec!["http://localhost:5000", "http://127.0.0.1:5000"]
        );
        assert!(config.backend.relative_fallback);
        assert_eq!(config.backend.attempt_timeout_secs, 15);
        assert!(config.session.token.is_none());
    }

    #[test]
    fn test_partial_backend_section() {
        let config: FileConfig = toml::from_str("[backend]\nprimary = \"http://h\"\n").unwrap();
        assert_eq!(config.backend.fallbacks.len(), 2);
        assert!(config.backend.relative_fallback);
    }
}
